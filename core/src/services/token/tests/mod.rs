mod cleanup_tests;
mod service_tests;
