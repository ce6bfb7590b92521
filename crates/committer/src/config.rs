//! Configuration threaded through [`crate::Committer::new`].
//!
//! Kept deliberately small: loading configuration from a file or the
//! environment is out of scope for this core (see spec Non-goals), but
//! the type itself exists and is threaded through construction the way
//! `strata-engine`'s database builder threads a config struct rather
//! than reading globals.

/// Tunables for a [`crate::Committer`] instance.
#[derive(Debug, Clone)]
pub struct CommitterConfig {
    /// Hint to the world-state backend about how many per-database
    /// deltas to expect per commit, used to pre-size internal buffers.
    /// Purely advisory; no store is required to honor it.
    pub world_state_batch_hint: usize,
}

impl Default for CommitterConfig {
    fn default() -> Self {
        Self {
            world_state_batch_hint: 16,
        }
    }
}

impl CommitterConfig {
    /// Construct a config with the given world-state batch-size hint.
    pub fn with_batch_hint(world_state_batch_hint: usize) -> Self {
        Self {
            world_state_batch_hint,
        }
    }
}
