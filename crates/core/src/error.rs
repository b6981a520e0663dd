//! Error handling for manifest parsing and validation
//!
//! This module provides structured error types with:
//! - Detailed error context
//! - Recovery suggestions
//! - Error codes for programmatic handling
//! - Serializable error reports
//!
//! Every configuration failure is fatal: a build either proceeds with a
//! fully validated manifest or aborts with a reported cause.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    /// Unclassified error
    Unknown = 1000,
    /// Internal invariant failure
    Internal = 1001,

    // IO errors (2xxx)
    /// Generic I/O failure
    IoError = 2000,
    /// File does not exist
    FileNotFound = 2001,
    /// File exists but is not readable/writable
    PermissionDenied = 2002,

    // Manifest errors (3xxx)
    /// Generic manifest failure
    ManifestError = 3000,
    /// No manifest file could be located
    ManifestNotFound = 3001,
    /// Manifest exists but is not valid TOML / does not match the schema
    ManifestParseError = 3002,
    /// A manifest field holds a value outside its allowed domain
    InvalidManifestValue = 3003,

    // Profile errors (4xxx)
    /// Generic build-profile failure
    ProfileError = 4000,
    /// Requested profile id has no matching declaration
    UnknownProfile = 4001,

    // Capability errors (5xxx)
    /// Generic capability failure
    CapabilityError = 5000,
    /// Two capability entries share the same name
    DuplicateCapability = 5001,
    /// Capability kind or script variant is not in the known set
    UnknownCapability = 5002,

    // Signing errors (6xxx)
    /// Generic signing failure
    SigningError = 6000,
    /// Profile references a signing config that is not declared
    MissingSigningCredential = 6001,

    // Dependency errors (7xxx)
    /// Generic dependency failure
    DependencyError = 7000,
    /// No declared dependency satisfies a capability's version requirement,
    /// or two declarations pin conflicting versions of one coordinate
    UnresolvableDependency = 7001,
    /// Dependency coordinate is not of the form group:artifact:version
    InvalidCoordinate = 7002,

    // Validation errors (8xxx)
    /// Generic validation failure
    ValidationError = 8000,
    /// Two manifest settings contradict each other
    ConstraintViolation = 8001,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Manifest",
            4 => "Profile",
            5 => "Capability",
            6 => "Signing",
            7 => "Dependency",
            8 => "Validation",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    // Convenience constructors

    /// Generic I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    /// Generic manifest error
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ManifestError, message)
    }

    /// No manifest file found at the given path
    pub fn manifest_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ManifestNotFound,
            format!("Build manifest not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .clarity-build.toml file or use --manifest to specify a path")
    }

    /// A manifest field holds an out-of-domain value
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidManifestValue, message)
    }

    /// Requested profile id is not declared
    pub fn unknown_profile(profile_id: &str, declared: &[String]) -> Self {
        Self::new(
            ErrorCode::UnknownProfile,
            format!("Unknown build profile: {}", profile_id),
        )
        .with_context(if declared.is_empty() {
            "No profiles are declared in the manifest".to_string()
        } else {
            format!("Declared profiles: {}", declared.join(", "))
        })
        .with_suggestion("Add a [profiles.<id>] table to the manifest or pick a declared profile")
    }

    /// Two capability entries share a name
    pub fn duplicate_capability(name: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateCapability,
            format!("Capability declared more than once: {}", name),
        )
        .with_suggestion("Remove the duplicate [[capabilities]] entry")
    }

    /// Capability kind/script is not in the known set
    pub fn unknown_capability(name: &str) -> Self {
        Self::new(
            ErrorCode::UnknownCapability,
            format!("Unknown capability: {}", name),
        )
        .with_suggestion(
            "Known kinds: auth, text-recognition (with script), multi-window, \
             core-library-desugaring, multidex",
        )
    }

    /// Profile names a signing config that does not exist
    pub fn missing_signing_credential(profile_id: &str, reference: &str) -> Self {
        Self::new(
            ErrorCode::MissingSigningCredential,
            format!(
                "Profile '{}' references undeclared signing config '{}'",
                profile_id, reference
            ),
        )
        .with_suggestion(format!("Declare a [signing.{}] table in the manifest", reference))
    }

    /// Version requirement cannot be satisfied by the declared dependencies
    pub fn unresolvable_dependency(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnresolvableDependency, message)
    }

    /// Malformed dependency coordinate string
    pub fn invalid_coordinate(raw: &str) -> Self {
        Self::new(
            ErrorCode::InvalidCoordinate,
            format!("Invalid dependency coordinate: {}", raw),
        )
        .with_suggestion("Coordinates must be of the form group:artifact:version")
    }

    /// Generic validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Two manifest settings contradict each other
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConstraintViolation, message)
    }
}

/// Serializable error report for logging and `--json` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code
    pub code: ErrorCode,
    /// Formatted code, e.g. `E4001`
    pub code_str: String,
    /// Category name, e.g. `Profile`
    pub category: String,
    /// Human-readable message
    pub message: String,
    /// Additional context, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Recovery suggestion, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Stringified source error, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    /// Command completed
    pub const SUCCESS: i32 = 0;
    /// Unspecified failure
    pub const FAILURE: i32 = 1;
    /// Manifest failed validation
    pub const VALIDATION_ERROR: i32 = 2;
    /// Manifest missing or unparseable
    pub const MANIFEST_ERROR: i32 = 3;
    /// Requested profile is not declared
    pub const UNKNOWN_PROFILE: i32 = 4;
}

/// Map an error to the CLI exit code for its category
pub fn exit_code_for(error: &Error) -> i32 {
    match error.code.code() / 1000 {
        3 => exit_codes::MANIFEST_ERROR,
        4 => exit_codes::UNKNOWN_PROFILE,
        5..=8 => exit_codes::VALIDATION_ERROR,
        _ => exit_codes::FAILURE,
    }
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ManifestParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::ManifestParseError, format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<semver::Error> for Error {
    fn from(err: semver::Error) -> Self {
        Error::new(ErrorCode::InvalidCoordinate, format!("Version parse error: {}", err))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Attach a recovery suggestion to the error, if any
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}
