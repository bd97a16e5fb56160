pub mod admin;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod datetime;
pub mod error;
pub mod events;
pub mod fetch;
pub mod notices;
pub mod profiles;
pub mod state;
pub mod transport;

#[cfg(test)]
mod test_util;
