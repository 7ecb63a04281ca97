//! Distribution orchestration
//!
//! The orchestrator walks the categories in a fixed order and, per rule,
//! runs filter evaluation, the chance-gated selection, and the category's
//! applier. The same pass serves the initial whole-population run and the
//! death-triggered run; only the supplied rule set differs.

pub mod appliers;
pub mod death;
pub mod filters;
pub mod linked;
pub mod selection;

use rand::Rng;

use crate::character::record::HostRecord;
use crate::character::roster::Roster;
use crate::character::snapshot::CharacterSnapshot;
use crate::core::config::EngineConfig;
use crate::core::types::{ContentId, RuleNamespace};
use crate::rules::repository::{CategoryTable, ResolvedEntry, RuleRepository};
use crate::rules::rule::ContentCategory;

pub use selection::{DistributionKey, LevelCache, Resolved};

/// Everything a distribution pass needs, built once at load time and passed
/// by reference; there are no global registries.
#[derive(Debug)]
pub struct DistributionContext {
    pub repository: RuleRepository,
    pub cache: LevelCache,
    pub config: EngineConfig,
}

impl DistributionContext {
    pub fn new(repository: RuleRepository, config: EngineConfig) -> Self {
        Self {
            repository,
            cache: LevelCache::new(),
            config,
        }
    }
}

/// Content refs that actually mutated a record during one pass, in
/// application order and without duplicates.
#[derive(Debug, Default)]
pub struct AppliedContent {
    refs: Vec<ContentId>,
}

impl AppliedContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, content: ContentId) {
        if !self.refs.contains(&content) {
            self.refs.push(content);
        }
    }

    pub fn extend(&mut self, refs: impl IntoIterator<Item = ContentId>) {
        for r in refs {
            self.push(r);
        }
    }

    pub fn refs(&self) -> &[ContentId] {
        &self.refs
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// The per-character working set: a category table narrowed to the
/// leveled-only gate.
#[derive(Debug, Clone, Copy)]
pub struct DistributionSet<'a> {
    table: &'a CategoryTable,
    leveled_only: bool,
}

impl<'a> DistributionSet<'a> {
    pub fn new(table: &'a CategoryTable, leveled_only: bool) -> Self {
        Self {
            table,
            leveled_only,
        }
    }

    /// Every entry of the table, with no leveled-only narrowing.
    pub fn all(table: &'a CategoryTable) -> Self {
        Self::new(table, false)
    }

    fn entries(&self, category: ContentCategory) -> impl Iterator<Item = &'a ResolvedEntry> {
        let leveled_only = self.leveled_only;
        self.table
            .get(category)
            .entries()
            .iter()
            .filter(move |entry| !leveled_only || entry.is_leveled())
    }
}

/// Run one distribution pass over a character record.
///
/// Categories are processed independently in `ContentCategory::ORDER`; a
/// rule that fails its filter or chance roll never blocks the rest. Every
/// ref that mutated the record is collected into `applied`.
pub fn distribute<R: HostRecord>(
    ctx: &DistributionContext,
    record: &mut R,
    snapshot: &CharacterSnapshot,
    set: &DistributionSet<'_>,
    allow_overwrite: bool,
    rng: &mut impl Rng,
    applied: &mut AppliedContent,
) {
    let key = DistributionKey {
        character: snapshot.id,
        level: snapshot.level,
        leveled_only: snapshot.leveled_only,
    };

    for category in ContentCategory::ORDER {
        let passing: Vec<(&ResolvedEntry, Resolved)> = set
            .entries(category)
            .filter(|entry| filters::matches(&entry.filters, snapshot))
            .filter_map(|entry| {
                ctx.cache
                    .select(key, entry, &mut *rng)
                    .map(|resolved| (entry, resolved))
            })
            .collect();

        if passing.is_empty() {
            continue;
        }

        appliers::apply_category(
            category,
            &passing,
            record,
            allow_overwrite,
            &ctx.config,
            applied,
        );
    }
}

/// Distribute one namespace to a character, following linked rule sets
/// exactly one level deep. Returns the refs applied by the main pass.
pub fn distribute_to_character<R: HostRecord>(
    ctx: &DistributionContext,
    namespace: RuleNamespace,
    record: &mut R,
    snapshot: &CharacterSnapshot,
    rng: &mut impl Rng,
) -> AppliedContent {
    let set = DistributionSet::new(ctx.repository.table(namespace), snapshot.leveled_only);

    let mut applied = AppliedContent::new();
    distribute(ctx, record, snapshot, &set, false, rng, &mut applied);

    if !applied.is_empty() {
        linked::cascade(&ctx.repository, namespace, &applied, |linked_table| {
            // Linked content may overwrite; whatever it applies is not
            // collected, so it can never seed another cascade.
            let linked_set = DistributionSet::all(linked_table);
            let mut cascade_applied = AppliedContent::new();
            distribute(
                ctx,
                &mut *record,
                snapshot,
                &linked_set,
                true,
                &mut *rng,
                &mut cascade_applied,
            );
        });
    }

    applied
}

/// Initial pass over every character in the roster. The player never
/// receives distributed content. Returns how many characters were touched.
pub fn distribute_population(
    ctx: &DistributionContext,
    roster: &mut Roster,
    leveled_only: bool,
    rng: &mut impl Rng,
) -> usize {
    let ids = roster.ids().to_vec();
    let mut touched = 0;

    for id in ids {
        let Some(record) = roster.get_mut(id) else {
            continue;
        };
        if record.is_player {
            continue;
        }

        let snapshot = record.snapshot(leveled_only);
        let applied =
            distribute_to_character(ctx, RuleNamespace::Regular, record, &snapshot, rng);
        if !applied.is_empty() {
            tracing::debug!(
                "Distributed {} refs to '{}' (level {})",
                applied.len(),
                snapshot.name,
                snapshot.level
            );
            touched += 1;
        }
    }

    touched
}
