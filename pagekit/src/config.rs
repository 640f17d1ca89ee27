//! Per-listing limits and process-wide paging configuration.
//!
//! # File format
//!
//! Every key is optional. Missing blocks keep their defaults; missing keys
//! inside a block fall back to the feed limits.
//!
//! ```toml
//! max_tag_ids = 10
//! max_search_chars = 200
//!
//! [posts]
//! default = 10
//! min = 1
//! max = 50
//! overflow = "clamp"
//!
//! [reports]
//! default = 20
//! max = 100
//! overflow = "reject"
//! ```
//!
//! # Environment Variables
//!
//! | Variable         | Description                              |
//! |------------------|------------------------------------------|
//! | `PAGEKIT_CONFIG` | Path of a TOML file read by `from_env()` |

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "PAGEKIT_CONFIG";

/// Default cap on the number of tag ids in one request.
pub const DEFAULT_MAX_TAG_IDS: usize = 10;

/// Default cap on the length of a search term, in characters.
pub const DEFAULT_MAX_SEARCH_CHARS: usize = 200;

/// What to do with a `limit` outside `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Pull the value back into range (public feeds).
    Clamp,
    /// Fail with [`ValidationError::Limit`] (admin listings).
    Reject,
}

/// Page-size bounds for one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLimits {
    /// Page size when the request has no `limit`.
    pub default: u32,
    /// Smallest accepted page size.
    pub min: u32,
    /// Largest accepted page size.
    pub max: u32,
    /// Handling of requests outside `min..=max`.
    pub overflow: Overflow,
}

impl PageLimits {
    /// Public feeds: 1..=50, default 10, out-of-range values clamped.
    pub const FEED: Self = Self {
        default: 10,
        min: 1,
        max: 50,
        overflow: Overflow::Clamp,
    };

    /// Admin listings: 1..=100, default 20, out-of-range values rejected.
    pub const ADMIN: Self = Self {
        default: 20,
        min: 1,
        max: 100,
        overflow: Overflow::Reject,
    };

    /// Resolve a requested page size against these bounds.
    ///
    /// ```
    /// use pagekit::PageLimits;
    ///
    /// assert_eq!(PageLimits::FEED.resolve(None).unwrap(), 10);
    /// assert_eq!(PageLimits::FEED.resolve(Some(500)).unwrap(), 50);
    /// assert!(PageLimits::ADMIN.resolve(Some(500)).is_err());
    /// ```
    pub fn resolve(&self, requested: Option<i64>) -> Result<u32, ValidationError> {
        let Some(value) = requested else {
            return Ok(self.default);
        };
        let in_range = value >= i64::from(self.min) && value <= i64::from(self.max);
        match self.overflow {
            _ if in_range => Ok(u32::try_from(value).unwrap_or(self.max)),
            Overflow::Clamp if value < i64::from(self.min) => Ok(self.min),
            Overflow::Clamp => Ok(self.max),
            Overflow::Reject => Err(ValidationError::Limit {
                value,
                min: self.min,
                max: self.max,
            }),
        }
    }

    fn check(&self, name: &str) -> Result<(), ConfigError> {
        if self.min == 0 {
            return Err(ConfigError::Invalid(format!("{name}.min must be at least 1")));
        }
        if self.min > self.max {
            return Err(ConfigError::Invalid(format!(
                "{name}.min ({}) exceeds {name}.max ({})",
                self.min, self.max
            )));
        }
        if self.default < self.min || self.default > self.max {
            return Err(ConfigError::Invalid(format!(
                "{name}.default ({}) is outside {}..={}",
                self.default, self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::FEED
    }
}

/// Paging configuration shared by every listing in the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// General post feed.
    pub posts: PageLimits,
    /// Post search.
    pub search: PageLimits,
    /// Replies to a comment.
    pub replies: PageLimits,
    /// Admin report listing.
    pub reports: PageLimits,
    /// Maximum number of tag ids in `tagIds`.
    pub max_tag_ids: usize,
    /// Maximum length of `search`, in characters.
    pub max_search_chars: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            posts: PageLimits::FEED,
            search: PageLimits::FEED,
            replies: PageLimits::FEED,
            reports: PageLimits::ADMIN,
            max_tag_ids: DEFAULT_MAX_TAG_IDS,
            max_search_chars: DEFAULT_MAX_SEARCH_CHARS,
        }
    }
}

impl PagingConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "loaded paging configuration");
        Ok(config)
    }

    /// Load the file named by `PAGEKIT_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check every limit block for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.posts.check("posts")?;
        self.search.check("search")?;
        self.replies.check("replies")?;
        self.reports.check("reports")?;
        if self.max_tag_ids == 0 {
            return Err(ConfigError::Invalid("max_tag_ids must be at least 1".into()));
        }
        if self.max_search_chars == 0 {
            return Err(ConfigError::Invalid(
                "max_search_chars must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    /// Values parsed but are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
