//! Category appliers: merge selected content into a character record
//!
//! One strategy per category, dispatched over the closed category enum.
//! Every mutation goes through the `HostRecord` surface; each applier
//! reports the refs that actually changed the record so the orchestrator
//! can build the applied set.

use crate::character::record::HostRecord;
use crate::core::config::EngineConfig;
use crate::core::types::{ContentId, ContentKind, PackageSlot};
use crate::distribute::selection::Resolved;
use crate::distribute::AppliedContent;
use crate::rules::repository::ResolvedEntry;
use crate::rules::rule::ContentCategory;

/// Apply every passing entry of one category.
pub fn apply_category<R: HostRecord>(
    category: ContentCategory,
    passing: &[(&ResolvedEntry, Resolved)],
    record: &mut R,
    allow_overwrite: bool,
    config: &EngineConfig,
    applied: &mut AppliedContent,
) {
    match category {
        ContentCategory::Keyword => {
            let refs = contents(passing);
            applied.extend(record.add_tags(&refs));
        }
        ContentCategory::Faction => {
            let refs = contents(passing);
            applied.extend(record.add_faction_memberships(&refs, config.default_faction_rank));
        }
        ContentCategory::Perk | ContentCategory::Spell => {
            let refs = contents(passing);
            applied.extend(record.add_abilities(&refs));
        }
        ContentCategory::LeveledSpell => {
            let refs = contents(passing);
            applied.extend(record.add_leveled_abilities(&refs));
        }
        ContentCategory::Package => {
            for (entry, resolved) in passing {
                apply_package(entry, *resolved, record, applied);
            }
        }
        ContentCategory::Outfit => {
            for (entry, _) in passing {
                apply_outfit(entry, record, allow_overwrite, config, applied);
            }
        }
        ContentCategory::SleepOutfit => {
            for (entry, _) in passing {
                if record.set_sleep_outfit(entry.content) {
                    applied.push(entry.content);
                }
            }
        }
        ContentCategory::Item => {
            let items: Vec<(ContentId, u32)> = passing
                .iter()
                .map(|(entry, resolved)| (entry.content, quantity(*resolved)))
                .collect();
            if record.merge_into_container(&items) {
                for (item, qty) in items {
                    if qty > 0 {
                        applied.push(item);
                    }
                }
            }
        }
        ContentCategory::Skin => {
            for (entry, _) in passing {
                if record.set_skin(entry.content) {
                    applied.push(entry.content);
                }
            }
        }
    }
}

fn contents(passing: &[(&ResolvedEntry, Resolved)]) -> Vec<ContentId> {
    passing.iter().map(|(entry, _)| entry.content).collect()
}

fn quantity(resolved: Resolved) -> u32 {
    match resolved {
        Resolved::Count(n) => n,
        // Item rules always resolve to counts; an index grants one.
        Resolved::Index(_) => 1,
    }
}

/// Package content inserts positionally; package lists map onto the five
/// override slots instead.
fn apply_package<R: HostRecord>(
    entry: &ResolvedEntry,
    resolved: Resolved,
    record: &mut R,
    applied: &mut AppliedContent,
) {
    let index = match resolved {
        Resolved::Index(index) => index,
        Resolved::Count(n) => n,
    };

    match entry.kind {
        ContentKind::Package => {
            // Index 0 is the front; index N sits after the (N-1)-th element,
            // clamped to the list length by the record.
            if record.insert_package_at(entry.content, index as usize) {
                applied.push(entry.content);
            }
        }
        ContentKind::PackageList => {
            if let Some(slot) = PackageSlot::from_index(index) {
                if record.set_override_slot(slot, entry.content) {
                    applied.push(entry.content);
                }
            }
        }
        _ => {}
    }
}

/// The default outfit is replaced once per character unless overwriting is
/// explicitly permitted; the marker records that an outfit rule ran.
fn apply_outfit<R: HostRecord>(
    entry: &ResolvedEntry,
    record: &mut R,
    allow_overwrite: bool,
    config: &EngineConfig,
    applied: &mut AppliedContent,
) {
    if record.default_outfit() == Some(entry.content) {
        return;
    }
    if !allow_overwrite && record.has_marker(&config.outfit_processed_marker) {
        return;
    }

    record.add_marker(&config.outfit_processed_marker);
    if record.set_default_outfit(entry.content) {
        applied.push(entry.content);
    }
}
