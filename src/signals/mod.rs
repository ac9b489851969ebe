//! Signal extractors: maintenance, popularity, size and security

pub mod maintenance;
pub mod popularity;
pub mod security;
pub mod size;

pub use security::{NoKnownVulnerabilities, SecurityAnalyzer};
