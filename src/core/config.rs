//! Engine configuration with documented defaults
//!
//! Built at load time and carried inside the distribution context; there is
//! no global configuration state.

/// Tunable knobs for the distribution engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Rank assigned to faction memberships added by distribution.
    ///
    /// Every faction rule grants membership at this one rank; rules cannot
    /// override it per entry.
    pub default_faction_rank: i8,

    /// Marker tag stamped on a character once an outfit rule has replaced
    /// its default outfit.
    ///
    /// Later passes without overwrite permission skip outfit replacement
    /// when the marker is present, so a character keeps the first outfit
    /// it was dealt.
    pub outfit_processed_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_faction_rank: 1,
            outfit_processed_marker: "bestow_outfit_processed".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.default_faction_rank < 0 {
            return Err(format!(
                "default_faction_rank ({}) must not be negative",
                self.default_faction_rank
            ));
        }

        if self.outfit_processed_marker.is_empty() {
            return Err("outfit_processed_marker must not be empty".into());
        }

        Ok(())
    }
}
