use serde::{Deserialize, Serialize};

use super::tree_types::{TreeError, TreeResult};

/// Default fan-out ceiling. The structure was designed for mass storage where
/// this matters a lot; in memory anything around 8 performs well.
pub const DEFAULT_MAX_ENTRIES: usize = 8;

/// Fan-out limits for a tree.
///
/// `min_entries` defaults to `max_entries / 2` when not set. A valid
/// configuration satisfies `1 <= min_entries <= max_entries / 2`.
///
/// ```rust
/// use mbr_tree::TreeConfig;
///
/// let config = TreeConfig::new(4).with_min_entries(2);
/// assert!(config.validate().is_ok());
/// assert!(TreeConfig::new(4).with_min_entries(3).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum number of entries in any node
    pub max_entries: usize,
    /// Minimum number of entries in any node except the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_entries: Option<usize>,
}

impl TreeConfig {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            min_entries: None,
        }
    }

    #[must_use]
    pub fn with_min_entries(mut self, min_entries: usize) -> Self {
        self.min_entries = Some(min_entries);
        self
    }

    /// The effective fan-out floor.
    pub fn min_entries(&self) -> usize {
        self.min_entries.unwrap_or(self.max_entries / 2)
    }

    pub fn validate(&self) -> TreeResult<()> {
        let min_entries = self.min_entries();
        if min_entries > self.max_entries / 2 {
            log::error!(
                "min_entries {} exceeds half of max_entries {}",
                min_entries,
                self.max_entries
            );
            return Err(TreeError::Config(format!(
                "min number of entries in a node is too high ({} > {} / 2)",
                min_entries, self.max_entries
            )));
        }
        if min_entries < 1 {
            log::error!("min_entries must be at least 1 (max_entries {})", self.max_entries);
            return Err(TreeError::Config(format!(
                "min number of entries in a node is too low ({} < 1)",
                min_entries
            )));
        }
        Ok(())
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}
