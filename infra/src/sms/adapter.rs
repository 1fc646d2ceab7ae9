//! Bridges an infrastructure `SmsService` to the core `SmsSender` trait.

use async_trait::async_trait;

use salon_core::services::SmsSender;

use super::sms_service::SmsService;

/// Adapter that implements the core `SmsSender` for any provider
pub struct SmsSenderAdapter {
    inner: Box<dyn SmsService>,
}

impl SmsSenderAdapter {
    pub fn new(inner: Box<dyn SmsService>) -> Self {
        Self { inner }
    }

    pub fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}

#[async_trait]
impl SmsSender for SmsSenderAdapter {
    async fn send_otp(&self, phone: &str, code: &str) -> Result<String, String> {
        self.inner
            .send_verification_code(phone, code)
            .await
            .map_err(|e| e.to_string())
    }
}
