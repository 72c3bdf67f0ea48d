//! GitHub API integration via octocrab.
//!
//! - [`OctocrabClient`]: client wrapper carrying credentials and retry settings
//! - [`GitHubApiError`]: error type with transient/permanent classification
//! - Interpreter implementation for [`crate::effects::GitHubInterpreter`]
//! - [`hooks`]: pull request webhook registration

pub mod client;
pub mod error;
pub mod hooks;
pub mod interpreter;

pub use client::OctocrabClient;
pub use error::GitHubApiError;
pub use hooks::{HookOutcome, HookRegistrationReport, register_hooks};
pub use interpreter::interpret_github_effect;
