//! Jenkins integration: inbound build notifications and the outbound build
//! trigger client.

pub mod client;
pub mod error;
pub mod notification;

pub use client::{JenkinsClient, job_path};
pub use error::JenkinsError;
pub use notification::{BuildEvent, BuildPhase, BuildStatus, NormalizeError, normalize};
