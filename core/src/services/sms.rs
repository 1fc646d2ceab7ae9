//! Out-of-band code delivery.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Trait for SMS dispatch of one-time codes
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `code` to `phone` (E.164). Returns a provider message id.
    async fn send_otp(&self, phone: &str, code: &str) -> Result<String, String>;
}

/// Sender that records every message instead of delivering it
#[derive(Default)]
pub struct RecordingSmsSender {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingSmsSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Most recent code sent to `phone`
    pub fn last_code_for(&self, phone: &str) -> Option<String> {
        self.sent
            .lock()
            .ok()?
            .iter()
            .rev()
            .find(|(to, _)| to == phone)
            .map(|(_, code)| code.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SmsSender for RecordingSmsSender {
    async fn send_otp(&self, phone: &str, code: &str) -> Result<String, String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("SMS provider unavailable".to_string());
        }
        let mut sent = self.sent.lock().map_err(|e| e.to_string())?;
        sent.push((phone.to_string(), code.to_string()));
        Ok(format!("recorded-{}", sent.len()))
    }
}
