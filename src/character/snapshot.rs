//! Read-only character view used for filter evaluation

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{CharacterId, ContentId};

/// Binary trait flags describing a character
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterTraits {
    pub female: bool,
    pub unique: bool,
    pub summonable: bool,
    pub child: bool,
}

/// Snapshot of one character's identity and state
///
/// Built immediately before an evaluation call and discarded afterwards;
/// never cached across calls.
#[derive(Debug, Clone)]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub name: String,
    pub level: u16,
    pub traits: CharacterTraits,
    /// Content already attached to the character (tags, factions,
    /// abilities); what content-reference filters match against.
    pub contents: AHashSet<ContentId>,
    /// True when this evaluation only considers level-gated rules.
    pub leveled_only: bool,
}

impl CharacterSnapshot {
    pub fn has_content(&self, content: ContentId) -> bool {
        self.contents.contains(&content)
    }
}
