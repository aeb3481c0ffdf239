//! Blob addressing: container plus object name.

use std::fmt;
use std::str::FromStr;

/// Identifies one immutable object in a blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobLocator {
    container: String,
    name: String,
}

impl BlobLocator {
    pub fn new(container: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            name: name.into(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.name)
    }
}

/// Error returned when a `container/name` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid blob locator [{0}]: expected <container>/<name>")]
pub struct ParseLocatorError(String);

impl FromStr for BlobLocator {
    type Err = ParseLocatorError;

    /// Splits on the first `/`; the name may itself contain slashes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((container, name)) if !container.is_empty() && !name.is_empty() => {
                Ok(Self::new(container, name))
            }
            _ => Err(ParseLocatorError(s.to_string())),
        }
    }
}
