//! Tests for the audit service.

mod service_tests;
