//! Core build-configuration layer for Clarity mobile tools
//!
//! This crate provides the declarative surface that governs a Clarity
//! Android build:
//!
//! - **Manifest**: TOML schema and loading for plugins, application
//!   identity, signing, profiles, capabilities, and dependencies
//! - **Capabilities**: a closed set of optional platform features
//!   (auth, per-script text recognition, multi-window, desugaring,
//!   multidex) mapped to the Maven coordinates that back them
//! - **Registry**: a read-only validated view with profile resolution
//! - **Error handling**: structured errors with codes, context, and
//!   recovery suggestions
//!
//! # Example
//!
//! ```rust,no_run
//! use clarity_core::manifest::ManifestFile;
//! use clarity_core::registry::BuildRegistry;
//!
//! let file = ManifestFile::load(None).expect("manifest");
//! let registry = BuildRegistry::from_manifest(file.manifest).expect("valid manifest");
//!
//! let release = registry.resolve("release").expect("release profile");
//! assert!(release.minify);
//! for capability in registry.capabilities() {
//!     println!("{}", capability.name());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capability;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::capability::{CapabilityEntry, CapabilityKind, Coordinate, Script};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::manifest::{Manifest, ManifestFile};
    pub use crate::registry::{BuildProfile, BuildRegistry};
    pub use crate::validation::{ValidationResult, Validator};
}
