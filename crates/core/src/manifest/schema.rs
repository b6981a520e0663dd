//! Build manifest schema definitions
//!
//! Raw declarative surface of a Clarity Android build: plugins,
//! application identity, compile options, signing configs, build
//! profiles, capabilities, and dependency coordinates. Values here are
//! exactly what the TOML said; cross-field checks live in the registry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root build manifest schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    /// Build plugin ids, in application order
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Application identity and SDK levels
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Java compilation options
    #[serde(default)]
    pub compile_options: CompileOptions,

    /// Lint policy
    #[serde(default)]
    pub lint: LintConfig,

    /// Signing configs, keyed by name
    #[serde(default)]
    pub signing: HashMap<String, SigningConfig>,

    /// Build profiles, keyed by id
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,

    /// Capability declarations, in declaration order
    #[serde(default)]
    pub capabilities: Vec<CapabilityDecl>,

    /// Dependency coordinates, `group:artifact:version`
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Application identity and SDK configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application id (reverse-DNS)
    #[serde(default = "default_application_id")]
    pub id: String,

    /// Code namespace; defaults to the application id when omitted
    #[serde(default)]
    pub namespace: Option<String>,

    /// Monotonic version code
    #[serde(default = "default_version_code")]
    pub version_code: u32,

    /// Human-readable version name
    #[serde(default = "default_version_name")]
    pub version_name: String,

    /// Minimum supported SDK level
    #[serde(default = "default_min_sdk")]
    pub min_sdk: u8,

    /// SDK level the app targets
    #[serde(default = "default_target_sdk")]
    pub target_sdk: u8,

    /// SDK level the app compiles against
    #[serde(default = "default_compile_sdk")]
    pub compile_sdk: u8,

    /// Pinned NDK version, if native code is built
    #[serde(default)]
    pub ndk_version: Option<String>,

    /// Enable legacy multidex packaging
    #[serde(default)]
    pub multidex: bool,
}

impl ApplicationConfig {
    /// Effective namespace: explicit value or the application id
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(&self.id)
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            id: default_application_id(),
            namespace: None,
            version_code: default_version_code(),
            version_name: default_version_name(),
            min_sdk: default_min_sdk(),
            target_sdk: default_target_sdk(),
            compile_sdk: default_compile_sdk(),
            ndk_version: None,
            multidex: false,
        }
    }
}

fn default_application_id() -> String {
    "com.clarity.app".to_string()
}

fn default_version_code() -> u32 {
    1
}

fn default_version_name() -> String {
    "1.0.0".to_string()
}

fn default_min_sdk() -> u8 {
    23
}

fn default_target_sdk() -> u8 {
    34
}

fn default_compile_sdk() -> u8 {
    35
}

/// Java compilation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Java source/target level
    #[serde(default = "default_java_version")]
    pub java_version: u8,

    /// Enable core library desugaring
    #[serde(default)]
    pub core_library_desugaring: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            java_version: default_java_version(),
            core_library_desugaring: false,
        }
    }
}

fn default_java_version() -> u8 {
    17
}

/// Lint policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintConfig {
    /// Check ids to disable
    #[serde(default)]
    pub disabled_checks: Vec<String>,

    /// Run lint as part of release builds
    #[serde(default = "default_true")]
    pub check_release_builds: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            disabled_checks: Vec::new(),
            check_release_builds: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A named signing config.
///
/// Only credential *references* live here; passwords are pulled from the
/// named environment variables at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Keystore file path
    pub keystore: String,

    /// Key alias within the keystore
    pub key_alias: String,

    /// Environment variable holding the store password
    #[serde(default)]
    pub store_password_env: Option<String>,

    /// Environment variable holding the key password
    #[serde(default)]
    pub key_password_env: Option<String>,
}

/// Per-profile build policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    /// Name of the signing config to sign with; unsigned when omitted
    #[serde(default)]
    pub signing: Option<String>,

    /// Enable code minification
    #[serde(default)]
    pub minify: bool,

    /// Strip unused resources (requires minify)
    #[serde(default)]
    pub shrink_resources: bool,

    /// Proguard rule files applied when minifying
    #[serde(default)]
    pub proguard_files: Vec<String>,
}

/// A raw capability declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDecl {
    /// Capability kind identifier
    pub kind: String,

    /// Script variant (text-recognition only)
    #[serde(default)]
    pub script: Option<String>,

    /// Whether the capability is active
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Version requirement for the backing dependencies (defaults to any)
    #[serde(default)]
    pub version: Option<String>,
}
