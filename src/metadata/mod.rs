//! Metadata fetchers for the npm registry and download counts API

pub mod client;
pub mod downloads;
pub mod registry;

pub use client::NpmClient;
pub use registry::{Packument, VersionManifest};
