//! Manifest field validation
//!
//! Field-level checks for the build manifest: identifier formats, SDK
//! level ordering, version domains. Cross-entity checks (signing
//! references, capability resolution) live in the registry.
//!
//! # Example
//!
//! ```rust,ignore
//! use clarity_core::validation::validate_application;
//!
//! let result = validate_application(&manifest.application, &manifest.compile_options);
//! if !result.is_valid() {
//!     for error in result.errors() {
//!         eprintln!("Validation error: {}", error);
//!     }
//! }
//! ```

use crate::error::{Error, ErrorCode, Result};
use crate::manifest::{ApplicationConfig, CompileOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Reverse-DNS Android application id
static APPLICATION_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*(\.[a-z][a-z0-9_]*)+$").unwrap());

/// Pinned NDK version, e.g. 27.0.12077973
static NDK_VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+$").unwrap());

/// Java levels the Android toolchain accepts as source/target
const SUPPORTED_JAVA_VERSIONS: [u8; 4] = [8, 11, 17, 21];

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Convert to Result type
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
            Err(Error::new(
                ErrorCode::InvalidManifestValue,
                format!("Manifest validation failed: {}", messages.join("; ")),
            ))
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate against a precompiled regex
    pub fn pattern(mut self, field: &str, value: &str, re: &Regex, description: &str) -> Self {
        if !re.is_match(value) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must match {}", description),
                code: "PATTERN".to_string(),
                expected: Some(description.to_string()),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate a numeric range
    pub fn range<T: PartialOrd + std::fmt::Display>(
        mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if value < min || value > max {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be between {} and {}", min, max),
                code: "RANGE".to_string(),
                expected: Some(format!("{} - {}", min, max)),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Add a custom validation
    pub fn custom<F>(mut self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(message) = f() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message,
                code: "CUSTOM".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result.add_warning(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
                code: "WARNING".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Validate application identity, SDK levels, and compile options
pub fn validate_application(
    app: &ApplicationConfig,
    compile: &CompileOptions,
) -> ValidationResult {
    let mut validator = Validator::new()
        .required("application.id", &app.id)
        .pattern(
            "application.id",
            &app.id,
            &APPLICATION_ID_RE,
            "reverse-DNS application id (e.g. com.clarity.app)",
        )
        .range("application.version_code", app.version_code, 1, u32::MAX)
        .required("application.version_name", &app.version_name)
        .custom("application.min_sdk", || {
            (app.min_sdk > app.target_sdk).then(|| {
                format!(
                    "min_sdk ({}) must not exceed target_sdk ({})",
                    app.min_sdk, app.target_sdk
                )
            })
        })
        .custom("application.target_sdk", || {
            (app.target_sdk > app.compile_sdk).then(|| {
                format!(
                    "target_sdk ({}) must not exceed compile_sdk ({})",
                    app.target_sdk, app.compile_sdk
                )
            })
        })
        .custom("compile_options.java_version", || {
            (!SUPPORTED_JAVA_VERSIONS.contains(&compile.java_version)).then(|| {
                format!(
                    "Java {} is not a supported level (supported: 8, 11, 17, 21)",
                    compile.java_version
                )
            })
        })
        .warn_if(
            "application.multidex",
            app.multidex && app.min_sdk >= 21,
            "multidex is implicit at min_sdk 21+",
        );

    if let Some(ref namespace) = app.namespace {
        validator = validator.pattern(
            "application.namespace",
            namespace,
            &APPLICATION_ID_RE,
            "reverse-DNS namespace",
        );
    }

    if let Some(ref ndk) = app.ndk_version {
        validator = validator.pattern(
            "application.ndk_version",
            ndk,
            &NDK_VERSION_RE,
            "pinned NDK version (major.minor.build)",
        );
    }

    validator.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_validation() {
        let result = Validator::new().required("name", "").validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "REQUIRED");
    }

    #[test]
    fn test_pattern_validation() {
        let result = Validator::new()
            .pattern("id", "Not.An.Id", &APPLICATION_ID_RE, "application id")
            .validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "PATTERN");
    }

    #[test]
    fn test_range_validation() {
        let result = Validator::new().range("count", 150, 1, 100).validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "RANGE");
    }

    #[test]
    fn test_warning_does_not_fail() {
        let result = Validator::new()
            .warn_if("field", true, "advisory only")
            .validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_default_application_is_valid() {
        let result =
            validate_application(&ApplicationConfig::default(), &CompileOptions::default());
        assert!(result.is_valid());
    }

    #[test]
    fn test_application_id_format() {
        let app = ApplicationConfig {
            id: "Clarity".to_string(),
            ..Default::default()
        };
        let result = validate_application(&app, &CompileOptions::default());
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].field, "application.id");
    }

    #[test]
    fn test_sdk_ordering() {
        let app = ApplicationConfig {
            min_sdk: 34,
            target_sdk: 23,
            ..Default::default()
        };
        let result = validate_application(&app, &CompileOptions::default());
        assert!(!result.is_valid());
        assert!(result.errors()[0].message.contains("min_sdk"));
    }

    #[test]
    fn test_unsupported_java_version() {
        let compile = CompileOptions {
            java_version: 12,
            core_library_desugaring: false,
        };
        let result = validate_application(&ApplicationConfig::default(), &compile);
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].field, "compile_options.java_version");
    }

    #[test]
    fn test_bad_ndk_version() {
        let app = ApplicationConfig {
            ndk_version: Some("27".to_string()),
            ..Default::default()
        };
        let result = validate_application(&app, &CompileOptions::default());
        assert!(!result.is_valid());
    }

    #[test]
    fn test_multidex_warning() {
        let app = ApplicationConfig {
            multidex: true,
            min_sdk: 23,
            ..Default::default()
        };
        let result = validate_application(&app, &CompileOptions::default());
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_to_result_carries_messages() {
        let err = Validator::new()
            .required("application.id", "")
            .validate()
            .to_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidManifestValue);
        assert!(err.message.contains("application.id"));
    }
}
