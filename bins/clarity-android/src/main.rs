//! Clarity Android CLI
//!
//! Loads, validates, and inspects the Clarity Android build manifest.

use anyhow::Result;
use clap::{Parser, Subcommand};
use clarity_cli::output::{self, Status};
use clarity_core::error::{exit_code_for, exit_codes};
use clarity_core::manifest::ManifestFile;
use clarity_core::registry::{self, BuildRegistry};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "clarity-android")]
#[command(about = "Build manifest tools for Clarity Android")]
#[command(version)]
struct Cli {
    /// Manifest file path
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the build manifest
    Validate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a build profile and print its policy
    Resolve {
        /// Profile id (e.g. debug, release)
        profile: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List declared capabilities in declaration order
    Capabilities {
        /// Only show enabled capabilities
        #[arg(long)]
        enabled_only: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List declared dependency coordinates
    Dependencies {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose the manifest and profile setup
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter build manifest
    Init {
        /// Target path
        #[arg(long, default_value = ".clarity-build.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    init_tracing(cli.verbose)?;

    let manifest_path = cli.manifest.as_deref().and_then(|p| p.to_str());

    let exit_code = match cli.command {
        Commands::Validate { json } => run_validate(manifest_path, json, cli.quiet),
        Commands::Resolve { profile, json } => run_resolve(manifest_path, &profile, json),
        Commands::Capabilities { enabled_only, json } => {
            run_capabilities(manifest_path, enabled_only, json)
        }
        Commands::Dependencies { json } => run_dependencies(manifest_path, json),
        Commands::Doctor { json } => run_doctor(manifest_path, json),
        Commands::Init { path, force } => run_init(&path, force),
    };

    std::process::exit(exit_code);
}

fn init_tracing(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact());

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    Ok(())
}

/// Load the manifest and build the validated registry
fn load_registry(manifest_path: Option<&str>) -> clarity_core::Result<(BuildRegistry, Option<String>)> {
    let file = ManifestFile::load(manifest_path)?;
    let path = file.path.clone();
    let registry = BuildRegistry::from_manifest(file.manifest)?;
    Ok((registry, path))
}

fn run_validate(manifest_path: Option<&str>, json: bool, quiet: bool) -> i32 {
    let file = match ManifestFile::load(manifest_path) {
        Ok(file) => file,
        Err(e) => return report_failure(&e, json),
    };

    if let Err(e) = registry::validate(&file.manifest) {
        return report_failure(&e, json);
    }

    if json {
        let report = serde_json::json!({
            "valid": true,
            "manifest": file.path,
            "profiles": file.manifest.profiles.len(),
            "capabilities": file.manifest.capabilities.len(),
            "dependencies": file.manifest.dependencies.len(),
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else if !quiet {
        match file.path {
            Some(ref path) => Status::success(&format!("{} is valid", path)),
            None => Status::success("Built-in defaults are valid"),
        }
        Status::info(&format!(
            "{}, {}, {}",
            output::format_count(file.manifest.profiles.len(), "profile", "profiles"),
            output::format_count(file.manifest.capabilities.len(), "capability", "capabilities"),
            output::format_count(file.manifest.dependencies.len(), "dependency", "dependencies"),
        ));
    }

    exit_codes::SUCCESS
}

fn run_resolve(manifest_path: Option<&str>, profile_id: &str, json: bool) -> i32 {
    let (registry, _) = match load_registry(manifest_path) {
        Ok(loaded) => loaded,
        Err(e) => return report_failure(&e, json),
    };

    let profile = match registry.resolve(profile_id) {
        Ok(profile) => profile,
        Err(e) => return report_failure(&e, json),
    };

    if json {
        let value = serde_json::json!({
            "id": &profile.id,
            "minify": profile.minify,
            "shrink_resources": profile.shrink_resources,
            "proguard_files": &profile.proguard_files,
            "signing": &profile.signing,
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        return exit_codes::SUCCESS;
    }

    Status::header(&format!("Profile: {}", profile.id));
    output::key_value("minify", output::format_flag(profile.minify));
    output::key_value("shrink resources", output::format_flag(profile.shrink_resources));
    match profile.signing {
        Some(ref signing) => {
            output::key_value("signing keystore", &signing.keystore);
            output::key_value("signing key alias", &signing.key_alias);
        }
        None => output::key_value("signing", "none (unsigned build)"),
    }
    if !profile.proguard_files.is_empty() {
        output::key_value("proguard files", &profile.proguard_files.join(", "));
    }

    exit_codes::SUCCESS
}

fn run_capabilities(manifest_path: Option<&str>, enabled_only: bool, json: bool) -> i32 {
    let (registry, _) = match load_registry(manifest_path) {
        Ok(loaded) => loaded,
        Err(e) => return report_failure(&e, json),
    };

    let entries: Vec<_> = registry
        .capabilities()
        .iter()
        .filter(|c| !enabled_only || c.enabled)
        .collect();

    if json {
        let values: Vec<_> = entries
            .iter()
            .map(|entry| {
                let artifacts: Vec<_> = entry
                    .kind
                    .required_artifacts()
                    .iter()
                    .map(|(group, artifact)| {
                        serde_json::json!({
                            "group": group,
                            "artifact": artifact,
                            "version": registry
                                .pinned_version(group, artifact)
                                .map(|v| v.to_string()),
                        })
                    })
                    .collect();
                serde_json::json!({
                    "name": entry.name(),
                    "enabled": entry.enabled,
                    "requirement": entry.requirement.to_string(),
                    "artifacts": artifacts,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "capabilities": values }))
                .unwrap_or_default()
        );
        return exit_codes::SUCCESS;
    }

    if entries.is_empty() {
        Status::info("No capabilities declared");
        return exit_codes::SUCCESS;
    }

    Status::header(&format!(
        "{} declared",
        output::format_count(entries.len(), "capability", "capabilities")
    ));
    for entry in entries {
        let versions: Vec<String> = entry
            .kind
            .required_artifacts()
            .iter()
            .map(|(group, artifact)| match registry.pinned_version(group, artifact) {
                Some(version) => format!("{}:{}:{}", group, artifact, version),
                None => format!("{}:{} (unpinned)", group, artifact),
            })
            .collect();
        let state = if entry.enabled { "" } else { " (disabled)" };
        println!("  {}{}", entry.name(), state);
        for version in versions {
            println!("    {}", version);
        }
    }

    exit_codes::SUCCESS
}

fn run_dependencies(manifest_path: Option<&str>, json: bool) -> i32 {
    let (registry, _) = match load_registry(manifest_path) {
        Ok(loaded) => loaded,
        Err(e) => return report_failure(&e, json),
    };

    if json {
        let values: Vec<_> = registry
            .dependencies()
            .iter()
            .map(|c| {
                serde_json::json!({
                    "group": &c.group,
                    "artifact": &c.artifact,
                    "version": c.version.to_string(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "dependencies": values }))
                .unwrap_or_default()
        );
        return exit_codes::SUCCESS;
    }

    if registry.dependencies().is_empty() {
        Status::info("No dependencies declared");
        return exit_codes::SUCCESS;
    }

    for coordinate in registry.dependencies() {
        println!("{}", coordinate);
    }

    exit_codes::SUCCESS
}

fn run_doctor(manifest_path: Option<&str>, json: bool) -> i32 {
    let mut checks: Vec<(String, bool, String)> = Vec::new();

    let file = match ManifestFile::load(manifest_path) {
        Ok(file) => {
            let detail = file
                .path
                .clone()
                .unwrap_or_else(|| "built-in defaults".to_string());
            checks.push(("manifest".to_string(), true, detail));
            Some(file)
        }
        Err(e) => {
            checks.push(("manifest".to_string(), false, e.message.clone()));
            None
        }
    };

    let registry = file.and_then(|file| match BuildRegistry::from_manifest(file.manifest) {
        Ok(registry) => {
            checks.push(("validation".to_string(), true, "manifest is valid".to_string()));
            Some(registry)
        }
        Err(e) => {
            checks.push(("validation".to_string(), false, e.message.clone()));
            None
        }
    });

    if let Some(ref registry) = registry {
        for id in registry.profile_ids() {
            match registry.resolve(&id) {
                Ok(profile) => {
                    let signing = match profile.signing {
                        Some(ref s) => format!("signed with {}", s.key_alias),
                        None => "unsigned".to_string(),
                    };
                    checks.push((format!("profile:{}", id), true, signing));
                }
                Err(e) => checks.push((format!("profile:{}", id), false, e.message.clone())),
            }
        }

        let unresolved = registry
            .enabled_capabilities()
            .flat_map(|c| c.kind.required_artifacts().iter())
            .filter(|(group, artifact)| registry.pinned_version(group, artifact).is_none())
            .count();
        checks.push((
            "capabilities".to_string(),
            unresolved == 0,
            format!(
                "{} declared",
                output::format_count(registry.capabilities().len(), "capability", "capabilities")
            ),
        ));
    }

    let healthy = checks.iter().all(|(_, ok, _)| *ok);

    if json {
        let values: Vec<_> = checks
            .iter()
            .map(|(name, ok, detail)| {
                serde_json::json!({ "check": name, "ok": ok, "detail": detail })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(
                &serde_json::json!({ "healthy": healthy, "checks": values })
            )
            .unwrap_or_default()
        );
    } else {
        Status::header("Manifest Check");
        for (name, ok, detail) in &checks {
            if *ok {
                Status::success(&format!("{}: {}", name, detail));
            } else {
                Status::error(&format!("{}: {}", name, detail));
            }
        }
    }

    if healthy {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_ERROR
    }
}

fn run_init(path: &std::path::Path, force: bool) -> i32 {
    if path.exists() && !force {
        Status::error(&format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
        return exit_codes::FAILURE;
    }

    if let Err(e) = std::fs::write(path, STARTER_MANIFEST) {
        Status::error(&format!("Failed to write {}: {}", path.display(), e));
        return exit_codes::FAILURE;
    }

    Status::success(&format!("Wrote {}", path.display()));
    Status::info("Edit the signing and profile sections, then run: clarity-android validate");
    exit_codes::SUCCESS
}

fn report_failure(error: &clarity_core::Error, json: bool) -> i32 {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&error.to_report()).unwrap_or_default()
        );
    } else {
        output::print_error(error);
    }
    exit_code_for(error)
}

/// Starter manifest mirroring the Clarity app's declaration surface
const STARTER_MANIFEST: &str = r#"plugins = [
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
version_code = 1
version_name = "1.0.0"
min_sdk = 23
target_sdk = 34
compile_sdk = 35
ndk_version = "27.0.12077973"
multidex = true

[compile_options]
java_version = 17
core_library_desugaring = true

[lint]
disabled_checks = ["InvalidPackage"]
check_release_builds = false

[signing.debug]
keystore = "debug.keystore"
key_alias = "androiddebugkey"

[profiles.debug]
signing = "debug"

[profiles.release]
signing = "debug"
minify = false
shrink_resources = false
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
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use clarity_core::manifest::Manifest;

    #[test]
    fn test_starter_manifest_is_valid() {
        let manifest: Manifest = toml::from_str(STARTER_MANIFEST).unwrap();
        clarity_core::registry::validate(&manifest).unwrap();
    }
}
