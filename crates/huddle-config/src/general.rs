//! General application configuration.

use serde::{Deserialize, Serialize};

/// Hard ceiling for any list page.
pub const PAGE_SIZE_CEILING: u32 = 100;

const fn default_page_size() -> u32 {
    20
}

const fn default_max_page_size() -> u32 {
    PAGE_SIZE_CEILING
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Page size used when a list request omits `limit`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest `limit` a list request may ask for. Never above 100.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl GeneralConfig {
    /// Resolve a requested page size against the configured default and cap.
    #[must_use]
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        let cap = self.max_page_size.clamp(1, PAGE_SIZE_CEILING);
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
    }

    #[test]
    fn page_size_is_capped() {
        let config = GeneralConfig::default();
        assert_eq!(config.page_size(None), 20);
        assert_eq!(config.page_size(Some(0)), 1);
        assert_eq!(config.page_size(Some(500)), 100);

        let wide = GeneralConfig {
            default_page_size: 20,
            max_page_size: 1000,
        };
        assert_eq!(wide.page_size(Some(500)), PAGE_SIZE_CEILING);
    }
}
