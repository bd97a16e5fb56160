pub mod tasks;
pub mod verification;

pub use tasks::{ExpiredEventsTask, TaskStatus};
pub use verification::{QueueState, VerificationQueue};
