//! Request and response DTOs.

pub mod process;
pub mod stepup;
