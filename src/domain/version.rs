use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<major>[0-9]+)\.(?P<minor>[0-9]+)\.(?P<micro>[0-9]+)(?P<pre>[-0-9a-zA-Z]+)?$")
            .expect("version grammar is a valid regex")
    })
}

/// A parsed `major.minor.micro[suffix]` version.
///
/// Equality is structural (the suffix takes part in it), while [`compare`]
/// only looks at the numeric triple. The suffix is an opaque run of
/// `[-0-9a-zA-Z]` characters following `micro` directly, e.g. `-dev`.
///
/// [`compare`]: VersionValue::compare
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionValue {
    pub major: u64,
    pub minor: u64,
    pub micro: u64,
    pub prerelease: Option<String>,
}

impl VersionValue {
    /// Create a release version without suffix
    pub fn new(major: u64, minor: u64, micro: u64) -> Self {
        VersionValue {
            major,
            minor,
            micro,
            prerelease: None,
        }
    }

    /// Parse a version, failing with a format error unless the whole string matches
    pub fn parse(text: &str) -> Result<Self> {
        let caps = version_regex()
            .captures(text)
            .ok_or_else(|| ReleaseError::format(text))?;

        let number = |name: &str| -> Result<u64> {
            caps[name]
                .parse::<u64>()
                .map_err(|_| ReleaseError::format(text))
        };

        Ok(VersionValue {
            major: number("major")?,
            minor: number("minor")?,
            micro: number("micro")?,
            prerelease: caps.name("pre").map(|m| m.as_str().to_string()),
        })
    }

    /// The numeric triple used for ordering
    pub fn release_tuple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.micro)
    }

    /// Order by `(major, minor, micro)`, ignoring any suffix
    pub fn compare(&self, other: &VersionValue) -> Ordering {
        self.release_tuple().cmp(&other.release_tuple())
    }

    /// True when both versions name the same release, whatever their suffixes
    pub fn same_release(&self, other: &VersionValue) -> bool {
        self.compare(other) == Ordering::Equal
    }

    /// Next micro version with the suffix dropped.
    ///
    /// Fails with a format error when `micro` is already `u64::MAX`.
    pub fn next_micro(&self) -> Result<Self> {
        let micro = self
            .micro
            .checked_add(1)
            .ok_or_else(|| ReleaseError::format(self.to_string()))?;
        Ok(VersionValue::new(self.major, self.minor, micro))
    }

    /// The version without its suffix
    pub fn release(&self) -> Self {
        VersionValue::new(self.major, self.minor, self.micro)
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }
}

impl FromStr for VersionValue {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        VersionValue::parse(s)
    }
}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "{}", pre)?;
        }
        Ok(())
    }
}
