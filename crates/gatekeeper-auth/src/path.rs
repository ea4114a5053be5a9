//! Path exemption matching
//!
//! An exemption is either exact (`/api/v1/status/`) or a prefix ending in
//! `*` (`/api/v1/public/*`). Paths and exact exemptions are compared with a
//! trailing `/` appended when missing, so `/users` and `/users/` are the
//! same path.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// What to do when there is nothing to match against
///
/// Covers both an empty exemption list and an empty request path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnconfiguredPolicy {
    /// No authentication required
    #[default]
    Open,
    /// Authentication required
    Closed,
}

/// Decide whether `path` requires authentication
///
/// Uses [`UnconfiguredPolicy::Open`]: an absent path or an empty
/// exemption list means no authentication is required.
pub fn requires_auth<S: AsRef<str>>(path: Option<&str>, exemptions: &[S]) -> bool {
    requires_auth_with(path, exemptions, UnconfiguredPolicy::Open)
}

fn requires_auth_with<S: AsRef<str>>(
    path: Option<&str>,
    exemptions: &[S],
    unconfigured: UnconfiguredPolicy,
) -> bool {
    let path = match path {
        Some(p) if !p.is_empty() && !exemptions.is_empty() => p,
        _ => return unconfigured == UnconfiguredPolicy::Closed,
    };

    let path = with_trailing_slash(path);
    !exemptions
        .iter()
        .any(|exemption| is_exempt(&path, exemption.as_ref()))
}

fn is_exempt(path: &str, exemption: &str) -> bool {
    match exemption.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => path == with_trailing_slash(exemption),
    }
}

fn with_trailing_slash(path: &str) -> Cow<'_, str> {
    if path.ends_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("{}/", path))
    }
}

/// Exemption list plus its explicit unconfigured policy
#[derive(Debug, Clone, Default)]
pub struct PathPolicy {
    exemptions: Vec<String>,
    unconfigured: UnconfiguredPolicy,
}

impl PathPolicy {
    pub fn new(exemptions: Vec<String>) -> Self {
        Self {
            exemptions,
            unconfigured: UnconfiguredPolicy::Open,
        }
    }

    pub fn with_unconfigured(mut self, unconfigured: UnconfiguredPolicy) -> Self {
        self.unconfigured = unconfigured;
        self
    }

    pub fn exemptions(&self) -> &[String] {
        &self.exemptions
    }

    pub fn unconfigured(&self) -> UnconfiguredPolicy {
        self.unconfigured
    }

    pub fn requires_auth(&self, path: Option<&str>) -> bool {
        requires_auth_with(path, self.exemptions.as_slice(), self.unconfigured)
    }
}
