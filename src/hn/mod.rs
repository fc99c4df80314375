pub mod client;
pub mod types;

pub use client::{API_URL, HnClient};
pub use types::Job;
