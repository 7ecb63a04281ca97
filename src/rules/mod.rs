//! Distribution rules: data model, TOML loading, and the resolved repository

pub mod loader;
pub mod repository;
pub mod rule;

pub use loader::{load_rules, parse_rules};
pub use repository::{CategorySummary, CategoryTable, Distributables, ResolvedEntry, RuleRepository};
pub use rule::{
    ContentCategory, ContentFilter, FilterSet, LevelRange, RawContentFilter, RawRule,
    SelectionSpec, StringFilter, TraitFilter,
};
