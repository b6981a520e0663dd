//! Build manifest loading and schema definitions
//!
//! The declarative surface consumed by the build tool.

mod loader;
mod schema;

pub use loader::ManifestFile;
pub use schema::*;
