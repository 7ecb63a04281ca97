//! Rule repository: resolves parsed rules into distributable entries
//!
//! Built once at load time from the loader's raw rules and the content
//! catalog, then read-only for the life of the process. Resolution skips
//! entries whose content cannot be found, infers categories for generic
//! entries from the catalog kind, and splits linked rules out under their
//! parent refs.

use ahash::AHashMap;

use crate::content::catalog::ContentCatalog;
use crate::core::types::{ContentId, ContentKind, RuleId, RuleNamespace};
use crate::rules::rule::{
    ContentCategory, ContentFilter, FilterSet, RawRule, SelectionSpec,
};

/// A rule resolved against the content catalog, ready for evaluation
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    pub rule_id: RuleId,
    pub content: ContentId,
    pub kind: ContentKind,
    pub category: ContentCategory,
    pub filters: FilterSet,
    pub selection: SelectionSpec,
    pub chance: f32,
}

impl ResolvedEntry {
    pub fn is_leveled(&self) -> bool {
        self.filters.is_leveled()
    }
}

/// Entries for one category plus how many raw rules mentioned the category
#[derive(Debug, Clone, Default)]
pub struct Distributables {
    entries: Vec<ResolvedEntry>,
    lookup_count: usize,
}

impl Distributables {
    pub fn entries(&self) -> &[ResolvedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many raw rules named this category, including ones that failed
    /// to resolve.
    pub fn lookup_count(&self) -> usize {
        self.lookup_count
    }
}

/// Per-namespace table of distributables, one list per category
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    pub keywords: Distributables,
    pub factions: Distributables,
    pub perks: Distributables,
    pub spells: Distributables,
    pub leveled_spells: Distributables,
    pub packages: Distributables,
    pub outfits: Distributables,
    pub sleep_outfits: Distributables,
    pub items: Distributables,
    pub skins: Distributables,
}

impl CategoryTable {
    pub fn get(&self, category: ContentCategory) -> &Distributables {
        match category {
            ContentCategory::Keyword => &self.keywords,
            ContentCategory::Faction => &self.factions,
            ContentCategory::Perk => &self.perks,
            ContentCategory::Spell => &self.spells,
            ContentCategory::LeveledSpell => &self.leveled_spells,
            ContentCategory::Package => &self.packages,
            ContentCategory::Outfit => &self.outfits,
            ContentCategory::SleepOutfit => &self.sleep_outfits,
            ContentCategory::Item => &self.items,
            ContentCategory::Skin => &self.skins,
        }
    }

    fn get_mut(&mut self, category: ContentCategory) -> &mut Distributables {
        match category {
            ContentCategory::Keyword => &mut self.keywords,
            ContentCategory::Faction => &mut self.factions,
            ContentCategory::Perk => &mut self.perks,
            ContentCategory::Spell => &mut self.spells,
            ContentCategory::LeveledSpell => &mut self.leveled_spells,
            ContentCategory::Package => &mut self.packages,
            ContentCategory::Outfit => &mut self.outfits,
            ContentCategory::SleepOutfit => &mut self.sleep_outfits,
            ContentCategory::Item => &mut self.items,
            ContentCategory::Skin => &mut self.skins,
        }
    }

    pub fn is_empty(&self) -> bool {
        ContentCategory::ORDER
            .iter()
            .all(|category| self.get(*category).is_empty())
    }
}

/// One row of the outward-facing lookup report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: ContentCategory,
    pub resolved: usize,
    pub total: usize,
}

/// All distribution rules, resolved and grouped by namespace
#[derive(Debug, Default)]
pub struct RuleRepository {
    regular: CategoryTable,
    death: CategoryTable,
    linked_regular: AHashMap<ContentId, CategoryTable>,
    linked_death: AHashMap<ContentId, CategoryTable>,
}

impl RuleRepository {
    /// Resolve raw rules against the catalog.
    ///
    /// Per-entry problems (unresolved content, unsupported kinds) are
    /// diagnostics, never errors: the remaining rules still load.
    pub fn build(rules: &[RawRule], catalog: &ContentCatalog) -> Self {
        let mut repo = Self::default();
        let mut next_rule = 0u32;

        for raw in rules {
            repo.insert_raw(raw, catalog, &mut next_rule);
        }

        repo
    }

    pub fn table(&self, namespace: RuleNamespace) -> &CategoryTable {
        match namespace {
            RuleNamespace::Regular => &self.regular,
            RuleNamespace::Death => &self.death,
        }
    }

    /// Linked rule set registered under a distributed ref, if any.
    pub fn linked_set(&self, namespace: RuleNamespace, content: ContentId) -> Option<&CategoryTable> {
        match namespace {
            RuleNamespace::Regular => self.linked_regular.get(&content),
            RuleNamespace::Death => self.linked_death.get(&content),
        }
    }

    /// True iff no category holds a rule in either namespace.
    pub fn is_empty(&self) -> bool {
        self.regular.is_empty() && self.death.is_empty()
    }

    pub fn namespace_empty(&self, namespace: RuleNamespace) -> bool {
        self.table(namespace).is_empty()
    }

    /// Per-category `(resolved, total)` counts for one namespace.
    pub fn summary(&self, namespace: RuleNamespace) -> Vec<CategorySummary> {
        let table = self.table(namespace);
        ContentCategory::ORDER
            .iter()
            .map(|&category| {
                let list = table.get(category);
                CategorySummary {
                    category,
                    resolved: list.len(),
                    total: list.lookup_count(),
                }
            })
            .collect()
    }

    /// Log how many rules registered per category, skipping categories no
    /// rule ever named.
    pub fn log_summary(&self) {
        if self.is_empty() {
            return;
        }

        for namespace in [RuleNamespace::Regular, RuleNamespace::Death] {
            for row in self.summary(namespace) {
                if row.total > 0 {
                    tracing::info!(
                        "[{:?}] Registered {}/{} {} rules",
                        namespace,
                        row.resolved,
                        row.total,
                        row.category.label()
                    );
                }
            }
        }
    }

    fn insert_raw(&mut self, raw: &RawRule, catalog: &ContentCatalog, next_rule: &mut u32) {
        let is_linked = !raw.linked_to.is_empty();

        let def = match catalog.find(&raw.content) {
            Some(def) => def,
            None => {
                if let Some(category) = raw.category {
                    if !is_linked {
                        self.charge_lookup(raw.namespace, category);
                    }
                }
                tracing::warn!("Skipping rule for unresolved content '{}'", raw.content);
                return;
            }
        };

        let Some((category, selection)) = classify(raw, def.kind) else {
            return;
        };

        if !is_linked {
            self.charge_lookup(raw.namespace, category);
        }

        if !category_accepts(category, def.kind) {
            tracing::warn!(
                "Skipping {} rule for '{}': content is registered as {:?}",
                category.label(),
                raw.content,
                def.kind
            );
            return;
        }

        let Some(filters) = resolve_filters(raw, catalog) else {
            return;
        };

        let entry = ResolvedEntry {
            rule_id: RuleId(*next_rule),
            content: def.id,
            kind: def.kind,
            category,
            filters,
            selection,
            chance: raw.chance,
        };
        *next_rule += 1;

        if is_linked {
            self.insert_linked(raw, catalog, entry);
        } else {
            let table = match raw.namespace {
                RuleNamespace::Regular => &mut self.regular,
                RuleNamespace::Death => &mut self.death,
            };
            table.get_mut(category).entries.push(entry);
        }
    }

    fn insert_linked(&mut self, raw: &RawRule, catalog: &ContentCatalog, entry: ResolvedEntry) {
        let linked = match raw.namespace {
            RuleNamespace::Regular => &mut self.linked_regular,
            RuleNamespace::Death => &mut self.linked_death,
        };

        for parent in &raw.linked_to {
            let Some(parent_def) = catalog.find(parent) else {
                tracing::warn!(
                    "Dropping link from unresolved parent '{}' for '{}'",
                    parent,
                    raw.content
                );
                continue;
            };

            linked
                .entry(parent_def.id)
                .or_default()
                .get_mut(entry.category)
                .entries
                .push(entry.clone());
        }
    }

    fn charge_lookup(&mut self, namespace: RuleNamespace, category: ContentCategory) {
        let table = match namespace {
            RuleNamespace::Regular => &mut self.regular,
            RuleNamespace::Death => &mut self.death,
        };
        table.get_mut(category).lookup_count += 1;
    }
}

/// Decide the category and the effective selection for a rule.
///
/// Explicit Spell rules whose content is a leveled spell sort into the
/// leveled list; generic entries take their category from the catalog kind.
fn classify(raw: &RawRule, kind: ContentKind) -> Option<(ContentCategory, SelectionSpec)> {
    match raw.category {
        Some(ContentCategory::Spell) if kind == ContentKind::LeveledSpell => {
            Some((ContentCategory::LeveledSpell, raw.selection))
        }
        Some(ContentCategory::Package) => Some((
            ContentCategory::Package,
            package_index(raw.selection, &raw.content),
        )),
        Some(category) => Some((category, raw.selection)),
        None => infer_category(raw, kind),
    }
}

/// Map a generic entry's catalog kind onto a category.
///
/// Inference does not recognize sleep outfits or skins; those must be
/// declared explicitly.
fn infer_category(raw: &RawRule, kind: ContentKind) -> Option<(ContentCategory, SelectionSpec)> {
    let category = match kind {
        ContentKind::Keyword => ContentCategory::Keyword,
        ContentKind::Faction => ContentCategory::Faction,
        ContentKind::Perk => ContentCategory::Perk,
        ContentKind::Spell => ContentCategory::Spell,
        ContentKind::LeveledSpell => ContentCategory::LeveledSpell,
        ContentKind::Outfit => ContentCategory::Outfit,
        ContentKind::Item => ContentCategory::Item,
        ContentKind::Package | ContentKind::PackageList => {
            return Some((
                ContentCategory::Package,
                package_index(raw.selection, &raw.content),
            ));
        }
        ContentKind::Skin => {
            tracing::warn!(
                "Skipping generic rule for '{}': cannot infer a category for kind {:?}",
                raw.content,
                kind
            );
            return None;
        }
    };

    Some((category, raw.selection))
}

/// Package entries always select by index; count specifications fall back
/// to the range minimum (with a diagnostic when the range was not exact).
fn package_index(selection: SelectionSpec, content: &str) -> SelectionSpec {
    match selection {
        SelectionSpec::Index(_) => selection,
        SelectionSpec::RandomCount { min, max } => {
            if min != max {
                tracing::warn!(
                    "Package entry '{}' specifies a random count; using the range minimum {} as the insertion index",
                    content,
                    min
                );
            }
            SelectionSpec::Index(min)
        }
    }
}

fn category_accepts(category: ContentCategory, kind: ContentKind) -> bool {
    match category {
        ContentCategory::Keyword => kind == ContentKind::Keyword,
        ContentCategory::Faction => kind == ContentKind::Faction,
        ContentCategory::Perk => kind == ContentKind::Perk,
        ContentCategory::Spell => kind == ContentKind::Spell,
        ContentCategory::LeveledSpell => kind == ContentKind::LeveledSpell,
        ContentCategory::Package => {
            matches!(kind, ContentKind::Package | ContentKind::PackageList)
        }
        ContentCategory::Outfit | ContentCategory::SleepOutfit => kind == ContentKind::Outfit,
        ContentCategory::Item => kind == ContentKind::Item,
        ContentCategory::Skin => kind == ContentKind::Skin,
    }
}

/// Resolve content filters by name; a rule with an unresolvable filter is
/// dropped (it could never be evaluated faithfully).
fn resolve_filters(raw: &RawRule, catalog: &ContentCatalog) -> Option<FilterSet> {
    let mut contents = Vec::with_capacity(raw.content_filters.len());
    for filter in &raw.content_filters {
        let Some(def) = catalog.find(&filter.name) else {
            tracing::warn!(
                "Skipping rule for '{}': filter references unknown content '{}'",
                raw.content,
                filter.name
            );
            return None;
        };
        contents.push(ContentFilter {
            content: def.id,
            exclude: filter.exclude,
        });
    }

    Some(FilterSet {
        names: raw.names.clone(),
        contents,
        levels: raw.levels,
        traits: raw.traits,
    })
}
