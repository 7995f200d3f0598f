//! Shared types for the account workflow.

pub mod errors;
pub mod outcomes;

pub use errors::{AccountField, WorkflowError, WorkflowResult};
pub use outcomes::{locations, DashboardView, Level, Notification, Outcome};
