//! Unit tests for mock SMS service

use crate::sms::{MockSmsService, SmsService};
use crate::InfrastructureError;

#[tokio::test]
async fn test_mock_sms_send_success() {
    let service = MockSmsService::with_options(false, false);
    let result = service.send_sms("+15550001234", "Test message").await;

    let message_id = result.unwrap();
    assert!(message_id.starts_with("mock_"));
    assert_eq!(service.get_message_count(), 1);
}

#[tokio::test]
async fn test_mock_sms_invalid_phone() {
    let service = MockSmsService::new();
    let result = service.send_sms("15550001234", "Test message").await;

    match result {
        Err(InfrastructureError::Sms(msg)) => {
            assert!(msg.contains("Invalid phone number"));
            assert!(!msg.contains("15550001234"));
        }
        other => panic!("Expected Sms error, got {:?}", other),
    }
    assert_eq!(service.get_message_count(), 0);
}

#[tokio::test]
async fn test_mock_sms_simulate_failure() {
    let service = MockSmsService::new();
    service.set_simulate_failure(true);

    let result = service.send_sms("+15550001234", "Test message").await;
    assert!(result.is_err());
    assert!(!service.is_available().await);

    service.set_simulate_failure(false);
    assert!(service.is_available().await);
}

#[tokio::test]
async fn test_mock_sms_verification_code() {
    let service = MockSmsService::with_options(false, false);
    let result = service.send_verification_code("+15550001234", "123456").await;

    assert!(result.is_ok());
    assert_eq!(service.get_message_count(), 1);
}

#[tokio::test]
async fn test_mock_sms_counter() {
    let service = MockSmsService::with_options(false, false);

    for i in 1..=3 {
        let _ = service.send_sms("+15550001234", &format!("Message {}", i)).await;
        assert_eq!(service.get_message_count(), i);
    }

    service.reset_counter();
    assert_eq!(service.get_message_count(), 0);
}
