//! Session store: one session per successful login

mod service;

pub use service::SessionService;
