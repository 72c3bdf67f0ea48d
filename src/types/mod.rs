//! Core domain types shared by both sides of the bridge.

pub mod ids;

pub use ids::{BuildNumber, InvalidRepoName, PrNumber, RepoName, Sha};
