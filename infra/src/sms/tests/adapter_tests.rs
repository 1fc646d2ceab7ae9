//! Unit tests for the core SmsSender adapter

use salon_core::services::SmsSender;

use crate::sms::{verification_message, MockSmsService, SmsSenderAdapter};

#[tokio::test]
async fn test_adapter_delivers_through_provider() {
    let mock = MockSmsService::with_options(false, false);
    let adapter = SmsSenderAdapter::new(Box::new(mock.clone()));

    let message_id = adapter.send_otp("+15550001234", "042917").await.unwrap();

    assert!(message_id.starts_with("mock_"));
    assert_eq!(mock.get_message_count(), 1);
    assert_eq!(adapter.provider_name(), "Mock");
}

#[tokio::test]
async fn test_adapter_maps_provider_failure_to_string() {
    let mock = MockSmsService::with_options(false, true);
    let adapter = SmsSenderAdapter::new(Box::new(mock));

    let err = adapter.send_otp("+15550001234", "042917").await.unwrap_err();
    assert!(err.contains("Simulated"));
}

#[test]
fn test_verification_message_contains_code() {
    assert!(verification_message("042917").contains("042917"));
}
