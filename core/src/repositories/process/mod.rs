//! Process (case record) repository module.
//!
//! The case-management domain itself lives outside this service; this is
//! the narrow seam the step-up gate protects.

mod r#trait;
pub use r#trait::{ProcessPatch, ProcessRepository};

mod mock;
pub use mock::MockProcessRepository;
