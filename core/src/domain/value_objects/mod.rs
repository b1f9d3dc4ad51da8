//! Value objects shared across the domain.

pub mod action;
pub mod principal;
pub mod request_context;
pub mod stepup_key;

pub use action::ProtectedAction;
pub use principal::Principal;
pub use request_context::RequestContext;
pub use stepup_key::StepUpKey;
