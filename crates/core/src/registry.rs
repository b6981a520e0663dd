//! Capability configuration registry
//!
//! The read-only, validated view of a build manifest: which optional
//! capabilities are requested, which build-profile policy applies, and
//! which dependency coordinates back them. Constructed once from a
//! parsed manifest and immutable thereafter; all failures are fatal at
//! construction, there is no partial-success mode.

use crate::capability::{CapabilityEntry, CapabilityKind, Coordinate};
use crate::error::{Error, Result};
use crate::manifest::{ApplicationConfig, LintConfig, Manifest, SigningConfig};
use crate::validation;
use semver::VersionReq;
use std::collections::{HashMap, HashSet};

/// A resolved build profile: policy plus its signing config, if any
#[derive(Debug, Clone, PartialEq)]
pub struct BuildProfile {
    /// Profile id, e.g. `debug` or `release`
    pub id: String,
    /// Signing config the artifact is signed with; unsigned when `None`
    pub signing: Option<SigningConfig>,
    /// Code minification enabled
    pub minify: bool,
    /// Unused-resource stripping enabled
    pub shrink_resources: bool,
    /// Proguard rule files applied when minifying
    pub proguard_files: Vec<String>,
}

/// Read-only registry over a validated build manifest
#[derive(Debug, Clone)]
pub struct BuildRegistry {
    application: ApplicationConfig,
    lint: LintConfig,
    plugins: Vec<String>,
    profiles: HashMap<String, BuildProfile>,
    capabilities: Vec<CapabilityEntry>,
    dependencies: Vec<Coordinate>,
}

impl BuildRegistry {
    /// Validate a manifest and build the registry from it
    pub fn from_manifest(manifest: Manifest) -> Result<Self> {
        let parts = check(&manifest)?;

        let registry = Self {
            application: manifest.application,
            lint: manifest.lint,
            plugins: manifest.plugins,
            profiles: parts.profiles,
            capabilities: parts.capabilities,
            dependencies: parts.dependencies,
        };

        tracing::debug!(
            profiles = registry.profiles.len(),
            capabilities = registry.capabilities.len(),
            dependencies = registry.dependencies.len(),
            "build registry constructed"
        );

        Ok(registry)
    }

    /// Resolve a build profile by id.
    ///
    /// Idempotent: repeated calls with the same id yield identical values.
    pub fn resolve(&self, profile_id: &str) -> Result<&BuildProfile> {
        self.profiles
            .get(profile_id)
            .ok_or_else(|| Error::unknown_profile(profile_id, &self.profile_ids()))
    }

    /// Capability entries in declaration order.
    ///
    /// The sequence is finite, restartable, and stable across calls.
    pub fn capabilities(&self) -> &[CapabilityEntry] {
        &self.capabilities
    }

    /// Enabled capability entries in declaration order
    pub fn enabled_capabilities(&self) -> impl Iterator<Item = &CapabilityEntry> {
        self.capabilities.iter().filter(|c| c.enabled)
    }

    /// Declared dependency coordinates, deduplicated, in declaration order
    pub fn dependencies(&self) -> &[Coordinate] {
        &self.dependencies
    }

    /// Build plugin ids in application order
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    /// Application identity and SDK levels
    pub fn application(&self) -> &ApplicationConfig {
        &self.application
    }

    /// Lint policy
    pub fn lint(&self) -> &LintConfig {
        &self.lint
    }

    /// Declared profile ids, sorted
    pub fn profile_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.profiles.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Pinned version of the dependency backing the given (group, artifact),
    /// if one is declared
    pub fn pinned_version(&self, group: &str, artifact: &str) -> Option<&semver::Version> {
        self.dependencies
            .iter()
            .find(|c| c.provides(group, artifact))
            .map(|c| &c.version)
    }
}

/// Validate a manifest without building a registry.
///
/// Runs the full check sequence and reports the first failure. Checks
/// are deterministic, so validation is idempotent.
pub fn validate(manifest: &Manifest) -> Result<()> {
    check(manifest).map(|_| ())
}

/// Intermediate validated parts, produced once per manifest
struct ValidatedParts {
    profiles: HashMap<String, BuildProfile>,
    capabilities: Vec<CapabilityEntry>,
    dependencies: Vec<Coordinate>,
}

fn check(manifest: &Manifest) -> Result<ValidatedParts> {
    let field_result =
        validation::validate_application(&manifest.application, &manifest.compile_options);
    for warning in field_result.warnings() {
        tracing::warn!(field = %warning.field, "{}", warning.message);
    }
    field_result.to_result()?;

    check_plugins(&manifest.plugins)?;

    let capabilities = check_capabilities(manifest)?;
    let profiles = check_profiles(manifest)?;
    let dependencies = check_dependencies(&manifest.dependencies)?;

    resolve_capability_dependencies(&capabilities, &dependencies)?;

    Ok(ValidatedParts {
        profiles,
        capabilities,
        dependencies,
    })
}

fn check_plugins(plugins: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for plugin in plugins {
        if !seen.insert(plugin.as_str()) {
            return Err(Error::validation(format!("Plugin declared more than once: {}", plugin))
                .with_suggestion("Remove the duplicate plugins entry"));
        }
    }
    Ok(())
}

fn check_capabilities(manifest: &Manifest) -> Result<Vec<CapabilityEntry>> {
    let mut entries = Vec::with_capacity(manifest.capabilities.len());
    let mut seen = HashSet::new();

    for decl in &manifest.capabilities {
        let kind = CapabilityKind::parse(&decl.kind, decl.script.as_deref())?;

        let requirement = match &decl.version {
            Some(raw) => VersionReq::parse(raw).map_err(|e| {
                Error::invalid_value(format!(
                    "Capability '{}' has invalid version requirement '{}'",
                    kind.name(),
                    raw
                ))
                .with_source(e)
            })?,
            None => VersionReq::STAR,
        };

        if !seen.insert(kind) {
            return Err(Error::duplicate_capability(&kind.name()));
        }

        entries.push(CapabilityEntry {
            kind,
            enabled: decl.enabled,
            requirement,
        });
    }

    // Desugaring is declared twice in a full manifest: as a compile option
    // and as the capability that carries the desugar_jdk_libs dependency.
    // The two must agree.
    if manifest.compile_options.core_library_desugaring {
        let declared = entries
            .iter()
            .any(|e| e.kind == CapabilityKind::CoreLibraryDesugaring && e.enabled);
        if !declared {
            return Err(Error::constraint(
                "compile_options.core_library_desugaring is on but no enabled \
                 core-library-desugaring capability is declared",
            )
            .with_suggestion("Add an enabled [[capabilities]] entry with kind = \"core-library-desugaring\""));
        }
    }

    Ok(entries)
}

fn check_profiles(manifest: &Manifest) -> Result<HashMap<String, BuildProfile>> {
    let mut profiles = HashMap::with_capacity(manifest.profiles.len());

    for (id, config) in &manifest.profiles {
        if config.shrink_resources && !config.minify {
            return Err(Error::constraint(format!(
                "Profile '{}' enables shrink_resources without minify",
                id
            ))
            .with_suggestion("Resource shrinking requires minification; enable minify or disable shrink_resources"));
        }

        let signing = match &config.signing {
            Some(reference) => Some(
                manifest
                    .signing
                    .get(reference)
                    .cloned()
                    .ok_or_else(|| Error::missing_signing_credential(id, reference))?,
            ),
            None => None,
        };

        profiles.insert(
            id.clone(),
            BuildProfile {
                id: id.clone(),
                signing,
                minify: config.minify,
                shrink_resources: config.shrink_resources,
                proguard_files: config.proguard_files.clone(),
            },
        );
    }

    Ok(profiles)
}

fn check_dependencies(raw: &[String]) -> Result<Vec<Coordinate>> {
    let mut coordinates: Vec<Coordinate> = Vec::with_capacity(raw.len());

    for entry in raw {
        let coordinate: Coordinate = entry.parse()?;

        if let Some(existing) = coordinates
            .iter()
            .find(|c| c.provides(&coordinate.group, &coordinate.artifact))
        {
            if existing.version == coordinate.version {
                // Exact duplicate, keep the first declaration.
                continue;
            }
            return Err(Error::unresolvable_dependency(format!(
                "Conflicting versions pinned for {}:{}: {} and {}",
                coordinate.group, coordinate.artifact, existing.version, coordinate.version
            ))
            .with_suggestion("Pin a single version per coordinate"));
        }

        coordinates.push(coordinate);
    }

    Ok(coordinates)
}

fn resolve_capability_dependencies(
    capabilities: &[CapabilityEntry],
    dependencies: &[Coordinate],
) -> Result<()> {
    for entry in capabilities.iter().filter(|e| e.enabled) {
        for (group, artifact) in entry.kind.required_artifacts() {
            let coordinate = dependencies
                .iter()
                .find(|c| c.provides(group, artifact))
                .ok_or_else(|| {
                    Error::unresolvable_dependency(format!(
                        "Capability '{}' requires {}:{} but no such dependency is declared",
                        entry.name(),
                        group,
                        artifact
                    ))
                    .with_suggestion(format!(
                        "Add \"{}:{}:<version>\" to the dependencies list",
                        group, artifact
                    ))
                })?;

            if !entry.requirement.matches(&coordinate.version) {
                return Err(Error::unresolvable_dependency(format!(
                    "Capability '{}' requires {}:{} matching '{}', but {} is pinned",
                    entry.name(),
                    group,
                    artifact,
                    entry.requirement,
                    coordinate.version
                ))
                .with_suggestion("Align the pinned dependency version with the capability requirement"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Script;
    use crate::error::ErrorCode;

    fn manifest(toml: &str) -> Manifest {
        toml::from_str(toml).expect("test manifest must parse")
    }

    /// Manifest mirroring the full Clarity app declaration surface
    fn full_manifest() -> Manifest {
        manifest(
            r#"
            plugins = [
                "com.android.application",
                "com.google.gms.google-services",
                "kotlin-android",
            ]
            dependencies = [
                "com.android.tools:desugar_jdk_libs:2.1.5",
                "com.google.firebase:firebase-auth-ktx:22.3.1",
                "androidx.multidex:multidex:2.0.1",
                "androidx.window:window:1.0.0",
                "androidx.window:window-java:1.0.0",
                "com.google.mlkit:text-recognition:16.0.0",
                "com.google.mlkit:text-recognition-chinese:16.0.0",
                "com.google.mlkit:text-recognition-devanagari:16.0.0",
                "com.google.mlkit:text-recognition-japanese:16.0.0",
                "com.google.mlkit:text-recognition-korean:16.0.0",
            ]

            [application]
            id = "com.clarity.app"
            version_code = 42
            version_name = "1.4.0"
            multidex = true

            [compile_options]
            java_version = 17
            core_library_desugaring = true

            [signing.debug]
            keystore = "debug.keystore"
            key_alias = "androiddebugkey"

            [profiles.debug]
            signing = "debug"

            [profiles.release]
            signing = "debug"
            minify = true
            shrink_resources = true
            proguard_files = ["proguard-android-optimize.txt", "proguard-rules.pro"]

            [[capabilities]]
            kind = "core-library-desugaring"
            version = "^2"

            [[capabilities]]
            kind = "auth"
            version = "^22"

            [[capabilities]]
            kind = "multidex"

            [[capabilities]]
            kind = "multi-window"
            version = "^1"

            [[capabilities]]
            kind = "text-recognition"
            version = "^16"

            [[capabilities]]
            kind = "text-recognition"
            script = "chinese"
            version = "^16"

            [[capabilities]]
            kind = "text-recognition"
            script = "devanagari"
            version = "^16"

            [[capabilities]]
            kind = "text-recognition"
            script = "japanese"
            version = "^16"

            [[capabilities]]
            kind = "text-recognition"
            script = "korean"
            version = "^16"
            "#,
        )
    }

    #[test]
    fn test_full_manifest_validates() {
        let registry = BuildRegistry::from_manifest(full_manifest()).unwrap();
        assert_eq!(registry.capabilities().len(), 9);
        assert_eq!(registry.dependencies().len(), 10);
        assert_eq!(registry.profile_ids(), vec!["debug", "release"]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let registry = BuildRegistry::from_manifest(full_manifest()).unwrap();
        let first = registry.resolve("release").unwrap().clone();
        let second = registry.resolve("release").unwrap().clone();
        assert_eq!(first, second);
        assert!(first.minify);
        assert!(first.shrink_resources);
        assert_eq!(first.proguard_files.len(), 2);
        assert!(first.signing.is_some());
    }

    #[test]
    fn test_capabilities_declaration_order_is_stable() {
        let registry = BuildRegistry::from_manifest(full_manifest()).unwrap();
        let first: Vec<String> = registry.capabilities().iter().map(|c| c.name()).collect();
        let second: Vec<String> = registry.capabilities().iter().map(|c| c.name()).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "core-library-desugaring");
        assert_eq!(first[1], "auth");
        assert_eq!(first[8], "text-recognition-korean");
    }

    #[test]
    fn test_minimal_manifest_resolves_debug() {
        let registry = BuildRegistry::from_manifest(manifest(
            r#"
            [profiles.debug]
            "#,
        ))
        .unwrap();

        let profile = registry.resolve("debug").unwrap();
        assert_eq!(profile.id, "debug");
        assert!(profile.signing.is_none());
        assert!(!profile.minify);
        assert!(registry.capabilities().is_empty());
    }

    #[test]
    fn test_resolve_unknown_profile() {
        let registry = BuildRegistry::from_manifest(manifest(
            r#"
            [profiles.debug]
            "#,
        ))
        .unwrap();

        let err = registry.resolve("staging").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownProfile);
    }

    #[test]
    fn test_duplicate_capability_rejected() {
        let err = validate(&manifest(
            r#"
            dependencies = ["com.google.firebase:firebase-auth-ktx:22.3.1"]

            [[capabilities]]
            kind = "auth"

            [[capabilities]]
            kind = "auth"
            enabled = false
            "#,
        ))
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::DuplicateCapability);
    }

    #[test]
    fn test_missing_signing_credential_rejected() {
        let err = validate(&manifest(
            r#"
            [profiles.release]
            signing = "release"
            minify = true
            "#,
        ))
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::MissingSigningCredential);
    }

    #[test]
    fn test_unknown_capability_rejected() {
        let err = validate(&manifest(
            r#"
            [[capabilities]]
            kind = "bluetooth"
            "#,
        ))
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::UnknownCapability);
    }

    #[test]
    fn test_unknown_script_rejected() {
        let err = validate(&manifest(
            r#"
            [[capabilities]]
            kind = "text-recognition"
            script = "cyrillic"
            "#,
        ))
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::UnknownCapability);
    }

    #[test]
    fn test_shrink_without_minify_rejected() {
        let err = validate(&manifest(
            r#"
            [profiles.release]
            shrink_resources = true
            "#,
        ))
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ConstraintViolation);
    }

    #[test]
    fn test_conflicting_pins_rejected() {
        let err = validate(&manifest(
            r#"
            dependencies = [
                "androidx.window:window:1.0.0",
                "androidx.window:window:1.2.0",
            ]
            "#,
        ))
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::UnresolvableDependency);
    }

    #[test]
    fn test_exact_duplicate_pin_is_deduplicated() {
        let registry = BuildRegistry::from_manifest(manifest(
            r#"
            dependencies = [
                "androidx.window:window:1.0.0",
                "androidx.window:window:1.0.0",
            ]
            "#,
        ))
        .unwrap();

        assert_eq!(registry.dependencies().len(), 1);
    }

    #[test]
    fn test_capability_without_backing_dependency_rejected() {
        let err = validate(&manifest(
            r#"
            [[capabilities]]
            kind = "auth"
            "#,
        ))
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::UnresolvableDependency);
    }

    #[test]
    fn test_capability_requirement_mismatch_rejected() {
        let err = validate(&manifest(
            r#"
            dependencies = ["com.google.mlkit:text-recognition-korean:16.0.0"]

            [[capabilities]]
            kind = "text-recognition"
            script = "korean"
            version = "^17"
            "#,
        ))
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::UnresolvableDependency);
    }

    #[test]
    fn test_disabled_capability_skips_resolution() {
        let registry = BuildRegistry::from_manifest(manifest(
            r#"
            [[capabilities]]
            kind = "auth"
            enabled = false
            "#,
        ))
        .unwrap();

        assert_eq!(registry.capabilities().len(), 1);
        assert_eq!(registry.enabled_capabilities().count(), 0);
    }

    #[test]
    fn test_desugaring_option_requires_capability() {
        let err = validate(&manifest(
            r#"
            [compile_options]
            core_library_desugaring = true
            "#,
        ))
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ConstraintViolation);
    }

    #[test]
    fn test_duplicate_plugin_rejected() {
        let err = validate(&manifest(
            r#"
            plugins = ["kotlin-android", "kotlin-android"]
            "#,
        ))
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_pinned_version_lookup() {
        let registry = BuildRegistry::from_manifest(full_manifest()).unwrap();
        let version = registry
            .pinned_version("com.google.mlkit", "text-recognition-korean")
            .unwrap();
        assert_eq!(version, &semver::Version::new(16, 0, 0));
        assert!(registry.pinned_version("com.google.mlkit", "entity-extraction").is_none());
        let latin = registry.capabilities().iter().find(|c| {
            c.kind == CapabilityKind::TextRecognition(Script::Latin)
        });
        assert!(latin.is_some());
    }
}
