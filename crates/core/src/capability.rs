//! Capability model for the Clarity Android build
//!
//! Capabilities are the optional platform features a build may enable:
//! authentication, ML Kit text recognition per script, multi-window
//! support, core library desugaring, and multidex. The set is closed:
//! unknown kinds are rejected at validation time rather than dispatched
//! by string at use time.

use crate::error::{Error, Result};
use semver::{Version, VersionReq};
use std::fmt;
use std::str::FromStr;

/// Text-recognition script variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    /// Latin script (the unsuffixed base recognition model)
    Latin,
    /// Chinese script
    Chinese,
    /// Devanagari script
    Devanagari,
    /// Japanese script
    Japanese,
    /// Korean script
    Korean,
}

impl Script {
    /// All supported scripts, in artifact order
    pub const ALL: [Script; 5] = [
        Script::Latin,
        Script::Chinese,
        Script::Devanagari,
        Script::Japanese,
        Script::Korean,
    ];

    /// Manifest identifier for this script
    pub fn as_str(&self) -> &'static str {
        match self {
            Script::Latin => "latin",
            Script::Chinese => "chinese",
            Script::Devanagari => "devanagari",
            Script::Japanese => "japanese",
            Script::Korean => "korean",
        }
    }

    /// ML Kit artifact name for this script's recognition model
    pub fn artifact(&self) -> &'static str {
        match self {
            Script::Latin => "text-recognition",
            Script::Chinese => "text-recognition-chinese",
            Script::Devanagari => "text-recognition-devanagari",
            Script::Japanese => "text-recognition-japanese",
            Script::Korean => "text-recognition-korean",
        }
    }
}

impl FromStr for Script {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "latin" => Ok(Script::Latin),
            "chinese" => Ok(Script::Chinese),
            "devanagari" => Ok(Script::Devanagari),
            "japanese" => Ok(Script::Japanese),
            "korean" => Ok(Script::Korean),
            other => Err(Error::unknown_capability(&format!("text-recognition-{}", other))),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of capability kinds a build may enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// Firebase authentication
    Auth,
    /// ML Kit text recognition for one script
    TextRecognition(Script),
    /// AndroidX multi-window support
    MultiWindow,
    /// Java core library desugaring
    CoreLibraryDesugaring,
    /// Legacy multidex support
    Multidex,
}

impl CapabilityKind {
    /// Parse a manifest (kind, script) pair into a capability kind.
    ///
    /// The script variant is only meaningful for `text-recognition`;
    /// when omitted there, the latin base model is assumed.
    pub fn parse(kind: &str, script: Option<&str>) -> Result<Self> {
        match kind {
            "text-recognition" => {
                let script = match script {
                    Some(s) => s.parse()?,
                    None => Script::Latin,
                };
                Ok(CapabilityKind::TextRecognition(script))
            }
            "auth" | "multi-window" | "core-library-desugaring" | "multidex" => {
                if let Some(s) = script {
                    return Err(Error::invalid_value(format!(
                        "Capability '{}' does not take a script variant (got '{}')",
                        kind, s
                    )));
                }
                Ok(match kind {
                    "auth" => CapabilityKind::Auth,
                    "multi-window" => CapabilityKind::MultiWindow,
                    "core-library-desugaring" => CapabilityKind::CoreLibraryDesugaring,
                    _ => CapabilityKind::Multidex,
                })
            }
            other => Err(Error::unknown_capability(other)),
        }
    }

    /// Unique manifest name for this kind (script variants included)
    pub fn name(&self) -> String {
        match self {
            CapabilityKind::Auth => "auth".to_string(),
            CapabilityKind::TextRecognition(script) => {
                format!("text-recognition-{}", script.as_str())
            }
            CapabilityKind::MultiWindow => "multi-window".to_string(),
            CapabilityKind::CoreLibraryDesugaring => "core-library-desugaring".to_string(),
            CapabilityKind::Multidex => "multidex".to_string(),
        }
    }

    /// Maven coordinates (group, artifact) this capability requires
    pub fn required_artifacts(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            CapabilityKind::Auth => &[("com.google.firebase", "firebase-auth-ktx")],
            CapabilityKind::TextRecognition(Script::Latin) => {
                &[("com.google.mlkit", "text-recognition")]
            }
            CapabilityKind::TextRecognition(Script::Chinese) => {
                &[("com.google.mlkit", "text-recognition-chinese")]
            }
            CapabilityKind::TextRecognition(Script::Devanagari) => {
                &[("com.google.mlkit", "text-recognition-devanagari")]
            }
            CapabilityKind::TextRecognition(Script::Japanese) => {
                &[("com.google.mlkit", "text-recognition-japanese")]
            }
            CapabilityKind::TextRecognition(Script::Korean) => {
                &[("com.google.mlkit", "text-recognition-korean")]
            }
            CapabilityKind::MultiWindow => &[
                ("androidx.window", "window"),
                ("androidx.window", "window-java"),
            ],
            CapabilityKind::CoreLibraryDesugaring => {
                &[("com.android.tools", "desugar_jdk_libs")]
            }
            CapabilityKind::Multidex => &[("androidx.multidex", "multidex")],
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A validated capability entry: kind, enablement, and version requirement
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityEntry {
    /// Which capability this entry declares
    pub kind: CapabilityKind,
    /// Whether the capability is active for this build
    pub enabled: bool,
    /// Version range the backing dependencies must satisfy
    pub requirement: VersionReq,
}

impl CapabilityEntry {
    /// Unique name of this entry within a manifest
    pub fn name(&self) -> String {
        self.kind.name()
    }
}

/// A Maven dependency coordinate with a pinned version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    /// Group id, e.g. `com.google.mlkit`
    pub group: String,
    /// Artifact id, e.g. `text-recognition-korean`
    pub artifact: String,
    /// Pinned version
    pub version: Version,
}

impl Coordinate {
    /// True when this coordinate provides the given (group, artifact) pair
    pub fn provides(&self, group: &str, artifact: &str) -> bool {
        self.group == group && self.artifact == artifact
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let (group, artifact, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(g), Some(a), Some(v), None) if !g.is_empty() && !a.is_empty() => (g, a, v),
            _ => return Err(Error::invalid_coordinate(s)),
        };

        let version = Version::parse(version)
            .map_err(|e| Error::invalid_coordinate(s).with_source(e))?;

        Ok(Coordinate {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version,
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_script_parse() {
        assert_eq!("chinese".parse::<Script>().unwrap(), Script::Chinese);
        assert_eq!("devanagari".parse::<Script>().unwrap(), Script::Devanagari);
        assert!("cyrillic".parse::<Script>().is_err());
    }

    #[test]
    fn test_kind_parse_text_recognition_defaults_to_latin() {
        let kind = CapabilityKind::parse("text-recognition", None).unwrap();
        assert_eq!(kind, CapabilityKind::TextRecognition(Script::Latin));
    }

    #[test]
    fn test_kind_parse_with_script() {
        let kind = CapabilityKind::parse("text-recognition", Some("korean")).unwrap();
        assert_eq!(kind, CapabilityKind::TextRecognition(Script::Korean));
        assert_eq!(kind.name(), "text-recognition-korean");
    }

    #[test]
    fn test_kind_rejects_stray_script() {
        let err = CapabilityKind::parse("auth", Some("latin")).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidManifestValue);
    }

    #[test]
    fn test_kind_rejects_unknown() {
        let err = CapabilityKind::parse("bluetooth", None).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::UnknownCapability);
    }

    #[test]
    fn test_required_artifacts() {
        assert_eq!(
            CapabilityKind::Auth.required_artifacts(),
            &[("com.google.firebase", "firebase-auth-ktx")]
        );
        assert_eq!(CapabilityKind::MultiWindow.required_artifacts().len(), 2);
        assert_eq!(
            CapabilityKind::TextRecognition(Script::Latin).required_artifacts(),
            &[("com.google.mlkit", "text-recognition")]
        );
    }

    #[test]
    fn test_coordinate_parse() {
        let coord: Coordinate = "com.google.mlkit:text-recognition-chinese:16.0.0"
            .parse()
            .unwrap();
        assert_eq!(coord.group, "com.google.mlkit");
        assert_eq!(coord.artifact, "text-recognition-chinese");
        assert_eq!(coord.version, Version::new(16, 0, 0));
        assert!(coord.provides("com.google.mlkit", "text-recognition-chinese"));
    }

    #[test]
    fn test_coordinate_parse_rejects_malformed() {
        assert!("androidx.window:window".parse::<Coordinate>().is_err());
        assert!("a:b:c:d".parse::<Coordinate>().is_err());
        assert!(":window:1.0.0".parse::<Coordinate>().is_err());
        assert!("androidx.window:window:not-a-version".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_coordinate_display_round_trip() {
        let raw = "androidx.multidex:multidex:2.0.1";
        let coord: Coordinate = raw.parse().unwrap();
        assert_eq!(coord.to_string(), raw);
    }

    proptest! {
        #[test]
        fn prop_coordinate_round_trips(
            group in "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}",
            artifact in "[a-z]{1,8}(-[a-z]{1,8}){0,2}",
            major in 0u64..100,
            minor in 0u64..100,
            patch in 0u64..100,
        ) {
            let raw = format!("{}:{}:{}.{}.{}", group, artifact, major, minor, patch);
            let coord: Coordinate = raw.parse().unwrap();
            prop_assert_eq!(coord.to_string(), raw);
            prop_assert_eq!(coord.version, Version::new(major, minor, patch));
        }
    }
}
