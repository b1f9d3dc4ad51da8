//! Session block repository module.

mod r#trait;
pub use r#trait::SessionBlockRepository;

mod mock;
pub use mock::MockSessionBlockRepository;
