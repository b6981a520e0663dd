//! Build manifest loading

use super::schema::Manifest;
use crate::error::{Error, Result};
use std::path::Path;

/// A manifest together with the path it was loaded from
#[derive(Debug, Clone)]
pub struct ManifestFile {
    /// Parsed manifest contents
    pub manifest: Manifest,
    /// Source path; `None` when defaults were used
    pub path: Option<String>,
}

impl ManifestFile {
    /// Load a manifest from an explicit path or a standard location.
    ///
    /// With an explicit path the file must exist. Without one, standard
    /// locations are probed and defaults are used when nothing is found.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(p) = path {
            if !Path::new(p).exists() {
                return Err(Error::manifest_not_found(p));
            }
            tracing::debug!(path = p, "loading build manifest");
            return Ok(Self {
                manifest: load_manifest_file(p)?,
                path: Some(p.to_string()),
            });
        }

        let manifest_path = find_manifest_file();
        let manifest = if let Some(ref p) = manifest_path {
            tracing::debug!(path = p.as_str(), "loading build manifest");
            load_manifest_file(p)?
        } else {
            tracing::debug!("no build manifest found, using defaults");
            Manifest::default()
        };

        Ok(Self {
            manifest,
            path: manifest_path,
        })
    }

    /// Defaults only, no file
    pub fn defaults() -> Self {
        Self {
            manifest: Manifest::default(),
            path: None,
        }
    }
}

/// Find a manifest file in standard locations
fn find_manifest_file() -> Option<String> {
    let candidates = [
        ".clarity-build.toml",
        "clarity-build.toml",
        "android/clarity-build.toml",
    ];

    for candidate in candidates {
        if Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
    }

    None
}

/// Load and parse a TOML manifest file
fn load_manifest_file(path: &str) -> Result<Manifest> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::manifest(format!("Failed to read manifest {}: {}", path, e)).with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::from(e).with_context(format!("While parsing manifest {}", path))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let file = ManifestFile::defaults();
        assert!(file.path.is_none());
        assert_eq!(file.manifest.application.min_sdk, 23);
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let err = ManifestFile::load(Some("/nonexistent/clarity-build.toml")).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ManifestNotFound);
    }

    #[test]
    fn test_load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            r#"
            [application]
            id = "com.clarity.app"
            version_code = 7

            [profiles.debug]
            "#
        )
        .unwrap();

        let file = ManifestFile::load(Some(tmp.path().to_str().unwrap())).unwrap();
        assert_eq!(file.manifest.application.version_code, 7);
        assert!(file.path.is_some());
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "application = not valid toml").unwrap();

        let err = ManifestFile::load(Some(tmp.path().to_str().unwrap())).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ManifestParseError);
    }
}
