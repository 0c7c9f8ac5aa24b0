use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::Prerelease;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("version string is empty")]
    Empty,
    #[error("invalid version segment {segment:?} in {input:?}")]
    InvalidSegment { input: String, segment: String },
    #[error("invalid pre-release suffix in {input:?}: {details}")]
    InvalidPrerelease { input: String, details: String },
}

/// A dotted-numeric application version such as `2.10.0` or `v1.4-beta.2`.
///
/// Segments compare numerically and missing trailing segments count as zero,
/// so `2.1` and `2.1.0` are equal. A release orders above any pre-release
/// with the same segments. Build metadata (`+...`) is ignored.
#[derive(Debug, Clone)]
pub struct AppVersion {
    raw: String,
    segments: Vec<u64>,
    pre: Prerelease,
}

impl AppVersion {
    /// Parse a version string.
    ///
    /// # Errors
    /// Returns an error when the string is empty, a segment is not an
    /// unsigned integer, or the pre-release suffix is malformed.
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let trimmed = input.trim();
        let unprefixed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        if unprefixed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let (core, pre) = split_core_and_prerelease(unprefixed);

        let segments = core
            .split('.')
            .map(|segment| {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionParseError::InvalidSegment {
                        input: input.to_string(),
                        segment: segment.to_string(),
                    });
                }
                segment
                    .parse::<u64>()
                    .map_err(|_| VersionParseError::InvalidSegment {
                        input: input.to_string(),
                        segment: segment.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match pre {
            Some("") => {
                return Err(VersionParseError::InvalidPrerelease {
                    input: input.to_string(),
                    details: "empty pre-release identifier".to_string(),
                });
            }
            Some(pre) => {
                Prerelease::new(pre).map_err(|error| VersionParseError::InvalidPrerelease {
                    input: input.to_string(),
                    details: error.to_string(),
                })?
            }
            None => Prerelease::EMPTY,
        };

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
            pre,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

fn split_core_and_prerelease(version: &str) -> (&str, Option<&str>) {
    let without_build = version.split_once('+').map_or(version, |(core, _)| core);
    match without_build.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (without_build, None),
    }
}

fn compare_segments(left: &[u64], right: &[u64]) -> Ordering {
    let len = left.len().max(right.len());
    (0..len)
        .map(|i| {
            let l = left.get(i).copied().unwrap_or(0);
            let r = right.get(i).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl Ord for AppVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_segments(&self.segments, &other.segments).then_with(|| {
            match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            }
        })
    }
}

impl PartialOrd for AppVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for AppVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AppVersion {}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for AppVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AppVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for AppVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Returns `true` when `latest` orders strictly above `current`.
///
/// An unparsable `current` never reports an update.
#[must_use]
pub fn is_newer_version(latest: &AppVersion, current: &str) -> bool {
    AppVersion::parse(current).is_ok_and(|current| *latest > current)
}
