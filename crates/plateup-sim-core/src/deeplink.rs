//! Scheme-qualified deep-link identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// The link that brings the PlateUp app to its Focus tab.
pub const FOCUS: &str = "plateup://focus";

/// The link that opens the morning check-in flow.
pub const CHECKIN_MORNING: &str = "plateup://checkin/morning";

#[derive(Error, Debug)]
pub enum DeepLinkError {
    /// The string is not an absolute URL (usually a missing `scheme:`).
    #[error("invalid deep link {input:?}: {source}")]
    Parse {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// Leading or trailing whitespace or control characters, which the URL
    /// parser would silently strip but simctl would receive verbatim.
    #[error("deep link {0:?} has surrounding whitespace")]
    Padded(String),

    /// The scheme is present but nothing follows it.
    #[error("deep link {0:?} has no target after the scheme")]
    EmptyTarget(String),
}

/// A validated deep link such as `plateup://checkin/morning`.
///
/// The original text is kept as-is and is what gets handed to simctl; the URL
/// parse only gates what is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeepLink(String);

impl DeepLink {
    pub fn parse(input: &str) -> Result<Self, DeepLinkError> {
        let is_padding = |c: char| c.is_whitespace() || c.is_control();
        if input.starts_with(is_padding) || input.ends_with(is_padding) {
            return Err(DeepLinkError::Padded(input.to_string()));
        }

        let url = Url::parse(input).map_err(|source| DeepLinkError::Parse {
            input: input.to_string(),
            source,
        })?;

        let has_target = url.host_str().is_some_and(|h| !h.is_empty())
            || !url.path().trim_start_matches('/').is_empty();
        if !has_target {
            return Err(DeepLinkError::EmptyTarget(input.to_string()));
        }

        Ok(Self(input.to_string()))
    }

    /// The scheme, e.g. `plateup`.
    pub fn scheme(&self) -> &str {
        self.0.split_once(':').map(|(s, _)| s).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The default launch link, [`FOCUS`].
    pub fn focus() -> Self {
        Self(FOCUS.to_string())
    }

    /// The default navigation link, [`CHECKIN_MORNING`].
    pub fn checkin_morning() -> Self {
        Self(CHECKIN_MORNING.to_string())
    }
}

impl fmt::Display for DeepLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DeepLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for DeepLink {
    type Err = DeepLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DeepLink {
    type Error = DeepLinkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DeepLink> for String {
    fn from(link: DeepLink) -> Self {
        link.0
    }
}
