//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for content records (tags, factions, abilities, outfits, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(pub u32);

/// Stable identifier assigned to each resolved rule entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub u32);

/// Which rule namespace an entry belongs to
///
/// Regular rules run during the initial whole-population pass; death rules
/// run only from the death event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleNamespace {
    Regular,
    Death,
}

/// What a content record actually is, as registered in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Keyword,
    Faction,
    Perk,
    Spell,
    LeveledSpell,
    Package,
    PackageList,
    Outfit,
    Item,
    Skin,
}

/// The five behavior-package override slots a package list can occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageSlot {
    Default,
    Spectator,
    ObserveCorpse,
    GuardWarn,
    EnterCombat,
}

impl PackageSlot {
    pub const COUNT: usize = 5;

    /// Map a resolved index onto a slot. Indices outside 0..=4 have no slot.
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Default),
            1 => Some(Self::Spectator),
            2 => Some(Self::ObserveCorpse),
            3 => Some(Self::GuardWarn),
            4 => Some(Self::EnterCombat),
            _ => None,
        }
    }

    pub fn as_index(self) -> usize {
        self as usize
    }
}
