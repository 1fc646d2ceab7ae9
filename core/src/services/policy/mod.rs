//! Per-surface admission rules applied after a successful OTP verification

mod service;


pub use service::{AccessScope, SurfacePolicy};
