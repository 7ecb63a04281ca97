//! Distribution rule data model

use serde::{Deserialize, Serialize};

use crate::core::types::{ContentId, RuleNamespace};

/// Content categories a rule can distribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentCategory {
    Keyword,
    Faction,
    Perk,
    Spell,
    LeveledSpell,
    Package,
    Outfit,
    SleepOutfit,
    Item,
    Skin,
}

impl ContentCategory {
    /// Fixed order categories are processed in during a distribution pass.
    pub const ORDER: [ContentCategory; 10] = [
        ContentCategory::Keyword,
        ContentCategory::Faction,
        ContentCategory::Perk,
        ContentCategory::Spell,
        ContentCategory::LeveledSpell,
        ContentCategory::Package,
        ContentCategory::Outfit,
        ContentCategory::SleepOutfit,
        ContentCategory::Item,
        ContentCategory::Skin,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Faction => "faction",
            Self::Perk => "perk",
            Self::Spell => "spell",
            Self::LeveledSpell => "leveled spell",
            Self::Package => "package",
            Self::Outfit => "outfit",
            Self::SleepOutfit => "sleep outfit",
            Self::Item => "item",
            Self::Skin => "skin",
        }
    }
}

/// Name substring predicate; `exclude` rejects the character on a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringFilter {
    pub needle: String,
    pub exclude: bool,
}

impl StringFilter {
    pub fn require(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
            exclude: false,
        }
    }

    pub fn reject(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
            exclude: true,
        }
    }
}

/// Content-reference predicate over what the character already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFilter {
    pub content: ContentId,
    pub exclude: bool,
}

/// Content-reference predicate before the name is resolved to an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContentFilter {
    pub name: String,
    pub exclude: bool,
}

/// Inclusive level range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    pub min: u16,
    pub max: u16,
}

impl LevelRange {
    pub fn at_least(min: u16) -> Self {
        Self { min, max: u16::MAX }
    }

    pub fn contains(&self, level: u16) -> bool {
        level >= self.min && level <= self.max
    }
}

/// Tri-state trait flag requirements; `None` means "don't care".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitFilter {
    pub female: Option<bool>,
    pub unique: Option<bool>,
    pub summonable: Option<bool>,
    pub child: Option<bool>,
}

impl TraitFilter {
    pub fn is_empty(&self) -> bool {
        self.female.is_none()
            && self.unique.is_none()
            && self.summonable.is_none()
            && self.child.is_none()
    }
}

/// Conjunction of optional predicate groups; an empty set matches everyone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSet {
    pub names: Vec<StringFilter>,
    pub contents: Vec<ContentFilter>,
    pub levels: Option<LevelRange>,
    pub traits: TraitFilter,
}

impl FilterSet {
    /// A rule carrying a level filter participates in leveled-only passes.
    pub fn is_leveled(&self) -> bool {
        self.levels.is_some()
    }
}

/// Index-or-count selection specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionSpec {
    /// Position within an ordered list; 0 selects the default/front slot.
    Index(u32),
    /// Quantity drawn uniformly over the inclusive range.
    RandomCount { min: u32, max: u32 },
}

impl SelectionSpec {
    pub fn exact_count(n: u32) -> Self {
        Self::RandomCount { min: n, max: n }
    }

    pub fn is_exact(&self) -> bool {
        match self {
            Self::Index(_) => true,
            Self::RandomCount { min, max } => min == max,
        }
    }
}

/// A parsed rule as produced by the loader, before content resolution.
///
/// Content is referenced by catalog name; the repository resolves names to
/// ids (and infers the category of generic entries) when it is built.
#[derive(Debug, Clone)]
pub struct RawRule {
    pub namespace: RuleNamespace,
    /// `None` marks a generic entry whose category is inferred from the
    /// catalog kind of its content.
    pub category: Option<ContentCategory>,
    pub content: String,
    pub names: Vec<StringFilter>,
    pub content_filters: Vec<RawContentFilter>,
    pub levels: Option<LevelRange>,
    pub traits: TraitFilter,
    pub selection: SelectionSpec,
    /// Inclusion chance in percent, 0..=100.
    pub chance: f32,
    /// Parent content names; when non-empty this rule only applies after
    /// one of the parents was distributed (linked distribution).
    pub linked_to: Vec<String>,
}

impl RawRule {
    /// A rule with no filters, full chance, and a single-grant selection.
    pub fn new(
        namespace: RuleNamespace,
        category: Option<ContentCategory>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            category,
            content: content.into(),
            names: Vec::new(),
            content_filters: Vec::new(),
            levels: None,
            traits: TraitFilter::default(),
            selection: SelectionSpec::exact_count(1),
            chance: 100.0,
            linked_to: Vec::new(),
        }
    }
}
