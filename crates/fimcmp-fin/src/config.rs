//! Configuration types for the closed-itemset miner.

use crate::error::{FinError, FinResult};

/// Configuration for the closed-itemset miner.
///
/// # Example
///
/// ```rust
/// use fimcmp_fin::FinConfig;
///
/// let config = FinConfig::builder()
///     .with_root_prefix_len(2)
///     .with_parallel(true)
///     .build();
/// assert_eq!(config.root_prefix_len, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinConfig {
    /// Depth of the tree levels expanded sequentially before tasks are cut.
    ///
    /// With `1`, every frequent item is a task root.
    pub root_prefix_len: usize,
    /// Mine task roots in parallel (requires the `parallel` feature).
    pub parallel: bool,
}

impl Default for FinConfig {
    fn default() -> Self {
        Self {
            root_prefix_len: 1,
            parallel: false,
        }
    }
}

impl FinConfig {
    /// Creates a new builder for FinConfig.
    pub fn builder() -> FinConfigBuilder {
        FinConfigBuilder::default()
    }

    /// Checks that the configuration can be mined with.
    ///
    /// # Errors
    ///
    /// Returns [`FinError::InvalidConfig`] when `root_prefix_len` is zero.
    pub fn validate(&self) -> FinResult<()> {
        if self.root_prefix_len == 0 {
            return Err(FinError::InvalidConfig(
                "root_prefix_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for FinConfig.
#[derive(Debug, Clone)]
pub struct FinConfigBuilder {
    root_prefix_len: usize,
    parallel: bool,
}

impl Default for FinConfigBuilder {
    fn default() -> Self {
        let defaults = FinConfig::default();
        Self {
            root_prefix_len: defaults.root_prefix_len,
            parallel: defaults.parallel,
        }
    }
}

impl FinConfigBuilder {
    /// Sets the sequentially expanded prefix depth.
    pub fn with_root_prefix_len(mut self, root_prefix_len: usize) -> Self {
        self.root_prefix_len = root_prefix_len;
        self
    }

    /// Enables or disables parallel mining.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builds the FinConfig.
    pub fn build(self) -> FinConfig {
        FinConfig {
            root_prefix_len: self.root_prefix_len,
            parallel: self.parallel,
        }
    }
}
