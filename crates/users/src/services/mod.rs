//! Workflow services and the collaborator contracts they depend on.

pub mod collaborators;
#[cfg(test)]
pub(crate) mod mock_collaborators;
pub mod workflow;

pub use collaborators::{AccountStore, CredentialService, SessionManager};
pub use workflow::AccountWorkflow;
