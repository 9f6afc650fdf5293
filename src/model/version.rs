//! When a declaration is valid: one observed release or a range of them.

use crate::error::{Error, Result};
use crate::model::range::Range;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validity of a declaration.
///
/// Freshly scraped entities always carry a [`Version::Point`]; ranges only
/// come out of [`Version::extend`] or from loading a merged collection.
/// Serialises as its display text, so a point reads `1.2.3` and a range
/// `1.2.3 || >2.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Version {
    /// Observed in exactly this release.
    Point(semver::Version),
    /// Valid for every release the range accepts.
    Range(Range),
}

impl Version {
    pub fn point(major: u64, minor: u64, patch: u64) -> Self {
        Version::Point(semver::Version::new(major, minor, patch))
    }

    /// Parse stored version text: a point version if it is one, otherwise a
    /// range.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        match semver::Version::parse(trimmed) {
            Ok(point) => Ok(Version::Point(point)),
            Err(_) => Range::parse(trimmed).map(Version::Range),
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Version::Point(_))
    }

    /// Whether this version covers `release`.
    pub fn test(&self, release: &semver::Version) -> bool {
        match self {
            Version::Point(point) => point == release,
            Version::Range(range) => range.satisfies(release),
        }
    }

    /// Union of `self` and `other`, which describe the same declaration.
    ///
    /// When two ranges do not nest, their branches are OR-ed together. The
    /// result is correct but not necessarily the smallest way to write it.
    pub fn extend(&self, other: &Version) -> Version {
        let range = match (self, other) {
            (Version::Point(a), Version::Point(b)) => Range::exact(a).union(&Range::exact(b)),
            (Version::Range(range), Version::Point(point)) => {
                if range.satisfies(point) {
                    range.clone()
                } else {
                    range.union(&Range::exact(point))
                }
            }
            (Version::Point(point), Version::Range(range)) => {
                if range.satisfies(point) {
                    range.clone()
                } else {
                    Range::exact(point).union(range)
                }
            }
            (Version::Range(a), Version::Range(b)) => {
                if b.is_subset_of(a) {
                    a.clone()
                } else if a.is_subset_of(b) {
                    b.clone()
                } else {
                    a.union(b)
                }
            }
        };
        Version::Range(range)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Point(point) => write!(f, "{point}"),
            Version::Range(range) => write!(f, "{range}"),
        }
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Version::parse(&value)
    }
}

impl From<semver::Version> for Version {
    fn from(point: semver::Version) -> Self {
        Version::Point(point)
    }
}
