//! Authentication orchestrator
//!
//! Composes the challenge store, surface policy, session store and token service
//! into the public login flows: initiate, resend, verify, refresh and logout.

mod service;


pub use service::{AuthResult, AuthService, AuthenticatedIdentity};
