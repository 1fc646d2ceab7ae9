//! Response envelope types

pub mod response;

pub use response::{ApiResponse, HealthResponse};
