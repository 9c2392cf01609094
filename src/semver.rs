// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ModfileError;

static SEMVER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<v>[vV])?",
        r"(?P<major>0|[1-9]\d*)\.(?P<minor>0|[1-9]\d*)\.(?P<patch>0|[1-9]\d*)",
        r"(?:-(?P<prerelease>(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
        r"(?:\+(?P<build>[0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    ))
    .expect("semver pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpLevel {
    Major,
    Minor,
    Patch,
}

/// A semantic version, remembering whether it was written with a leading `v`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: String,
    pub build: String,
    pub parsed_as_v: bool,
}

impl SemVer {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemVer {
            major,
            minor,
            patch,
            ..Default::default()
        }
    }

    /// Parse `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`, optionally prefixed with `v` or `V`.
    pub fn parse(input: &str) -> Result<SemVer, ModfileError> {
        let caps = SEMVER_RE.captures(input).ok_or_else(|| parse_error(input, None))?;

        let number = |group: &str| -> Result<u64, ModfileError> {
            caps[group]
                .parse::<u64>()
                .map_err(|_| parse_error(input, Some("Version component is too large")))
        };

        Ok(SemVer {
            major: number("major")?,
            minor: number("minor")?,
            patch: number("patch")?,
            prerelease: caps.name("prerelease").map_or_else(String::new, |m| m.as_str().to_string()),
            build: caps.name("build").map_or_else(String::new, |m| m.as_str().to_string()),
            parsed_as_v: caps.name("v").is_some(),
        })
    }

    /// Components saturate at `u64::MAX` instead of overflowing.
    pub fn bump_major(&self) -> SemVer {
        SemVer {
            major: self.major.saturating_add(1),
            minor: 0,
            patch: 0,
            prerelease: String::new(),
            build: String::new(),
            parsed_as_v: self.parsed_as_v,
        }
    }

    pub fn bump_minor(&self) -> SemVer {
        SemVer {
            minor: self.minor.saturating_add(1),
            patch: 0,
            prerelease: String::new(),
            build: String::new(),
            ..self.clone()
        }
    }

    pub fn bump_patch(&self) -> SemVer {
        SemVer {
            patch: self.patch.saturating_add(1),
            prerelease: String::new(),
            build: String::new(),
            ..self.clone()
        }
    }

    pub fn bump(&self, level: BumpLevel) -> SemVer {
        match level {
            BumpLevel::Major => self.bump_major(),
            BumpLevel::Minor => self.bump_minor(),
            BumpLevel::Patch => self.bump_patch(),
        }
    }

    /// Rendering without the leading `v`, whatever the input style was.
    pub fn to_plain_string(&self) -> String {
        let mut out = format!("{}.{}.{}", self.major, self.minor, self.patch);
        if !self.prerelease.is_empty() {
            out.push('-');
            out.push_str(&self.prerelease);
        }
        if !self.build.is_empty() {
            out.push('+');
            out.push_str(&self.build);
        }
        out
    }

    pub fn to_v_string(&self) -> String {
        format!("v{}", self.to_plain_string())
    }
}

/// Renders in the style the version was parsed with.
impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parsed_as_v {
            f.write_str(&self.to_v_string())
        } else {
            f.write_str(&self.to_plain_string())
        }
    }
}

impl FromStr for SemVer {
    type Err = ModfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemVer::parse(s)
    }
}

/// True when `input` parses as a [`SemVer`], component range included.
pub fn is_semver(input: &str) -> bool {
    SemVer::parse(input).is_ok()
}

fn parse_error(input: &str, hint: Option<&str>) -> ModfileError {
    ModfileError::SemVerParse {
        input: input.to_string(),
        hint: Some(hint.unwrap_or("Expected MAJOR.MINOR.PATCH, e.g. 1.4.0 or v1.4.0").to_string()),
        code: Some(501),
    }
}
