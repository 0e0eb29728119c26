//! Configuration types for a pipeline run.

use fimcmp::SupportCount;
use fimcmp_fin::FinConfig;

use crate::error::{RunnerError, RunnerResult};

/// Minimum support threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MinSupport {
    /// Fraction of all transactions, in (0, 1].
    Ratio(f64),
    /// Absolute number of transactions, at least 1.
    Count(SupportCount),
}

impl MinSupport {
    /// Converts the threshold to an absolute count over `total` transactions.
    ///
    /// Ratios round up, so an itemset meets a ratio `r` exactly when its
    /// support is at least `r * total`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::InvalidSupport`] for a ratio outside (0, 1] or
    /// a zero count.
    pub fn to_count(self, total: u64) -> RunnerResult<SupportCount> {
        match self {
            MinSupport::Ratio(ratio) if ratio > 0.0 && ratio <= 1.0 => {
                Ok(((ratio * total as f64).ceil() as SupportCount).max(1))
            }
            MinSupport::Ratio(ratio) => Err(RunnerError::InvalidSupport(ratio)),
            MinSupport::Count(0) => Err(RunnerError::InvalidSupport(0.0)),
            MinSupport::Count(count) => Ok(count),
        }
    }
}

/// Configuration for a pipeline run.
///
/// # Example
///
/// ```rust
/// use fimcmp_runner::{MinSupport, RunConfig};
///
/// let config = RunConfig::builder()
///     .with_min_support_ratio(0.4)
///     .with_num_partitions(4)
///     .with_parallel(true)
///     .build();
///
/// assert_eq!(config.min_support, MinSupport::Ratio(0.4));
/// assert_eq!(config.min_support_count(10).unwrap(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Minimum support threshold.
    pub min_support: MinSupport,
    /// Number of contiguous input partitions.
    pub num_partitions: usize,
    /// Parallel partition build/merge (requires the `parallel` feature).
    pub parallel: bool,
    /// Miner configuration.
    pub fin: FinConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            min_support: MinSupport::Count(1),
            num_partitions: 2,
            parallel: false,
            fin: FinConfig::default(),
        }
    }
}

impl RunConfig {
    /// Creates a new builder for RunConfig.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Absolute minimum support over `total` transactions.
    pub fn min_support_count(&self, total: u64) -> RunnerResult<SupportCount> {
        self.min_support.to_count(total)
    }

    /// Checks that the configuration can be run.
    pub fn validate(&self) -> RunnerResult<()> {
        if self.num_partitions == 0 {
            return Err(RunnerError::InvalidConfig(
                "num_partitions must be at least 1".to_string(),
            ));
        }
        self.fin.validate()?;
        Ok(())
    }
}

/// Builder for RunConfig.
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Sets the minimum support as a fraction of all transactions.
    pub fn with_min_support_ratio(mut self, ratio: f64) -> Self {
        self.config.min_support = MinSupport::Ratio(ratio);
        self
    }

    /// Sets the minimum support as an absolute transaction count.
    pub fn with_min_support_count(mut self, count: SupportCount) -> Self {
        self.config.min_support = MinSupport::Count(count);
        self
    }

    /// Sets the number of input partitions.
    pub fn with_num_partitions(mut self, num_partitions: usize) -> Self {
        self.config.num_partitions = num_partitions;
        self
    }

    /// Enables or disables parallelism for both the index build and mining.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self.config.fin.parallel = parallel;
        self
    }

    /// Replaces the miner configuration.
    pub fn with_fin(mut self, fin: FinConfig) -> Self {
        self.config.fin = fin;
        self
    }

    /// Builds the RunConfig.
    pub fn build(self) -> RunConfig {
        self.config
    }
}
