//! Page-size configuration for filter evaluation.

use crate::error::{FilterError, Result};
use anyhow::{bail, Context};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Page size used when a request does not name one
    pub default_limit: usize,
    /// Upper bound applied to requested page sizes
    pub max_limit: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl FilterConfig {
    /// Load a JSON config file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: FilterConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_limit == 0 || self.max_limit == 0 {
            bail!("page sizes must be positive");
        }
        if self.default_limit > self.max_limit {
            bail!(
                "default_limit {} exceeds max_limit {}",
                self.default_limit,
                self.max_limit
            );
        }
        Ok(())
    }

    /// Effective page size for a request
    pub fn resolve_limit(&self, requested: Option<usize>, offset: usize) -> Result<usize> {
        match requested {
            None => Ok(self.default_limit),
            Some(0) => Err(FilterError::InvalidPagination { offset, limit: 0 }),
            Some(limit) if limit > self.max_limit => {
                debug!("clamping limit {} to {}", limit, self.max_limit);
                Ok(self.max_limit)
            }
            Some(limit) => Ok(limit),
        }
    }
}
