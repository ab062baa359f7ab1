use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// A four-part version number, `major.minor[.build[.revision]]`.
///
/// Omitted trailing components stay omitted when formatted again.
///
/// # Examples
///
/// ```
/// use sg_reflect::value::Version;
///
/// let v: Version = "1.2.3".parse().unwrap();
/// assert_eq!(v, Version::new(1, 2).with_build(3));
/// assert_eq!(v.to_string(), "1.2.3");
/// assert!(v < Version::new(1, 2).with_build(3).with_revision(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl Version {
    #[inline]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }

    #[inline]
    pub const fn with_build(mut self, build: u32) -> Self {
        self.build = Some(build);
        self
    }

    /// Sets the revision, and the build to `0` if it was omitted.
    #[inline]
    pub const fn with_revision(mut self, revision: u32) -> Self {
        if self.build.is_none() {
            self.build = Some(0);
        }
        self.revision = Some(revision);
        self
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
            if let Some(revision) = self.revision {
                write!(f, ".{revision}")?;
            }
        }
        Ok(())
    }
}

/// The error returned when parsing a [`Version`] fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid version string, expected `major.minor[.build[.revision]]`")]
pub struct ParseVersionError;

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<Option<u32>, ParseVersionError> {
            match parts.next() {
                Some(part) => part.parse().map(Some).map_err(|_| ParseVersionError),
                None => Ok(None),
            }
        };

        let major = next()?.ok_or(ParseVersionError)?;
        let minor = next()?.ok_or(ParseVersionError)?;
        let build = next()?;
        let revision = next()?;
        if next()?.is_some() {
            return Err(ParseVersionError);
        }
        Ok(Self {
            major,
            minor,
            build,
            revision,
        })
    }
}
