mod client;
pub mod decode;

pub use client::{ApiClient, VerificationTarget};
