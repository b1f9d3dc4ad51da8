//! Tests for the step-up services.


mod gate_tests;
mod lockout_tests;
mod service_tests;
