//! Tests for the mailer module.
