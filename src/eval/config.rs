//! Evaluation settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RecError, Result};
use crate::pagerank::PageRankConfig;

/// What the harness puts back into the graph after a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestorePolicy {
    /// Re-insert exactly the masked edges. The graph after a trial equals
    /// the graph before it.
    #[default]
    HeldOut,
    /// Re-insert the masked edges, then also link the user to every item
    /// that was recommended. Items that were never read become permanent
    /// edges, so later trials see a grown graph.
    HeldOutAndRecommended,
}

/// Leave-out evaluation configuration.
///
/// # Examples
///
/// ```
/// use aprender_rec::eval::{EvalConfig, RestorePolicy};
///
/// let config = EvalConfig::new().with_k(10).with_test_size(0.3).with_seed(7);
/// assert_eq!(config.k, 10);
/// assert_eq!(config.restore, RestorePolicy::HeldOut);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Recommendation list length requested per trial
    pub k: usize,
    /// Fraction of each user's items held out, in (0, 1)
    pub test_size: f64,
    /// Seed for held-out sampling
    pub seed: u64,
    /// Graph restoration after each trial
    pub restore: RestorePolicy,
    /// Settings for the `pagerank` method
    pub pagerank: PageRankConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            k: 15,
            test_size: 0.2,
            seed: 42,
            restore: RestorePolicy::default(),
            pagerank: PageRankConfig::default(),
        }
    }
}

impl EvalConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set recommendation list length.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set held-out fraction.
    #[must_use]
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set restore policy.
    #[must_use]
    pub fn with_restore(mut self, restore: RestorePolicy) -> Self {
        self.restore = restore;
        self
    }

    /// Set PageRank settings.
    #[must_use]
    pub fn with_pagerank(mut self, pagerank: PageRankConfig) -> Self {
        self.pagerank = pagerank;
        self
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    /// [`RecError::InvalidHyperparameter`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(RecError::invalid_hyperparameter(
                "k",
                self.k,
                "a positive integer",
            ));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(RecError::invalid_hyperparameter(
                "test_size",
                self.test_size,
                "a fraction in (0, 1)",
            ));
        }
        self.pagerank.validate()
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    /// [`RecError::Config`] for malformed JSON, otherwise as [`Self::validate`].
    ///
    /// # Examples
    /// ```
    /// use aprender_rec::eval::{EvalConfig, RestorePolicy};
    ///
    /// let config = EvalConfig::from_json_str(
    ///     r#"{"k": 5, "restore": "held_out_and_recommended", "pagerank": {"damping": 0.9}}"#,
    /// )
    /// .expect("valid config");
    /// assert_eq!(config.k, 5);
    /// assert_eq!(config.test_size, 0.2);
    /// assert_eq!(config.restore, RestorePolicy::HeldOutAndRecommended);
    /// assert_eq!(config.pagerank.damping, 0.9);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    ///
    /// # Errors
    /// [`RecError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
