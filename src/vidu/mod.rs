pub mod client;
pub mod error;
pub mod types;

pub use client::{VideoGenerator, ViduClient};
pub use error::ViduError;
pub use types::{RemoteJobHandle, RemoteStatus, StatusResponse, SubmitResponse};
