//! Unit tests for SMS module

mod adapter_tests;
mod mock_sms_tests;
