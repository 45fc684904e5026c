//! Dependency descriptors
//!
//! A dependency names an external artifact by identity, version, content
//! hash and retrieval location. Descriptors are plain values; everything
//! that touches disk lives in the layer, cache and launch modules.

use crate::layer::LayerMetadata;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A dependency version
///
/// Stored in its original string form, which is what equality (and therefore
/// cache reuse) is decided on. Ordering parses leniently as semver so that
/// `"1.0"` sorts like `1.0.0`, falling back to string order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse as semver, padding missing minor/patch components
    pub fn semver(&self) -> Option<semver::Version> {
        let raw = self.0.trim().trim_start_matches('v');
        if let Ok(v) = semver::Version::parse(raw) {
            return Some(v);
        }

        let split = raw.find(['-', '+']).unwrap_or(raw.len());
        let (core, suffix) = raw.split_at(split);
        let mut parts: Vec<&str> = core.split('.').collect();
        if parts.is_empty()
            || parts.len() > 3
            || !parts
                .iter()
                .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
        {
            return None;
        }
        while parts.len() < 3 {
            parts.push("0");
        }
        semver::Version::parse(&format!("{}{}", parts.join("."), suffix)).ok()
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.semver(), other.semver()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            _ => self.0.cmp(&other.0),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An external artifact a buildpack contributes to a layer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dependency {
    /// Stable short name, unique within a build
    pub id: String,

    /// Optional display name
    #[serde(default)]
    pub name: String,

    /// Version of the artifact
    pub version: Version,

    /// Hex-encoded SHA-256 of the artifact bytes
    pub sha256: String,

    /// Where the artifact is retrieved from
    pub uri: String,
}

impl Dependency {
    pub fn new(
        id: impl Into<String>,
        version: impl Into<Version>,
        sha256: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            version: version.into(),
            sha256: sha256.into(),
            uri: uri.into(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The final path segment of the URI, used as the artifact file name
    pub fn artifact_name(&self) -> &str {
        let uri = self.uri.split(['?', '#']).next().unwrap_or_default();
        let uri = uri.trim_end_matches('/');
        uri.rsplit('/').next().unwrap_or(uri)
    }

    /// Name used in log output: the display name if set, otherwise the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// The metadata record a layer holding this dependency should carry
    pub fn metadata(&self) -> LayerMetadata {
        LayerMetadata::from(self)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_name(), self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_name_from_uri() {
        let dep = Dependency::new("test-id", "1.0", "abc", "http://localhost/path/test-artifact-name");
        assert_eq!(dep.artifact_name(), "test-artifact-name");
    }

    #[test]
    fn artifact_name_strips_query_and_trailing_slash() {
        let dep = Dependency::new("jre", "11", "abc", "https://x/dl/jre-11.tar.gz?token=1#frag");
        assert_eq!(dep.artifact_name(), "jre-11.tar.gz");

        let dep = Dependency::new("jre", "11", "abc", "https://x/dl/jre/");
        assert_eq!(dep.artifact_name(), "jre");

        let dep = Dependency::new("jre", "11", "abc", "jre.tar.gz");
        assert_eq!(dep.artifact_name(), "jre.tar.gz");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let dep = Dependency::new("jre", "11.0.2", "abc", "http://x/jre.tar.gz");
        assert_eq!(dep.display_name(), "jre");
        assert_eq!(dep.to_string(), "jre 11.0.2");

        let dep = dep.with_name("OpenJDK JRE");
        assert_eq!(dep.display_name(), "OpenJDK JRE");
    }

    #[test]
    fn version_lenient_semver() {
        assert_eq!(
            Version::new("1.0").semver(),
            Some(semver::Version::new(1, 0, 0))
        );
        assert_eq!(
            Version::new("v11").semver(),
            Some(semver::Version::new(11, 0, 0))
        );
        assert!(Version::new("11.0-ea").semver().is_some());
        assert!(Version::new("latest").semver().is_none());
    }

    #[test]
    fn version_ordering() {
        assert!(Version::new("1.10") > Version::new("1.9"));
        assert!(Version::new("11.0.2") > Version::new("8.0.192"));
        // Same semver, different spelling: ordered but not equal
        assert_ne!(Version::new("1.0"), Version::new("1.0.0"));
        assert_ne!(
            Version::new("1.0").cmp(&Version::new("1.0.0")),
            Ordering::Equal
        );
    }
}
