//! Filter evaluation against character snapshots

use crate::character::snapshot::CharacterSnapshot;
use crate::rules::rule::{ContentFilter, FilterSet, StringFilter};

/// Evaluate a rule's filter set against a snapshot.
///
/// Predicate groups are conjunctive and short-circuit; absent groups hold
/// vacuously. Within a group, positive filters are satisfied by any match
/// while exclusion filters reject on any match.
pub fn matches(filters: &FilterSet, snapshot: &CharacterSnapshot) -> bool {
    matches_names(&filters.names, &snapshot.name)
        && matches_contents(&filters.contents, snapshot)
        && filters
            .levels
            .map_or(true, |range| range.contains(snapshot.level))
        && matches_traits(filters, snapshot)
}

fn matches_names(filters: &[StringFilter], name: &str) -> bool {
    if filters.is_empty() {
        return true;
    }

    let name = name.to_lowercase();
    let mut has_required = false;
    let mut required_hit = false;

    for filter in filters {
        let hit = name.contains(&filter.needle.to_lowercase());
        if filter.exclude {
            if hit {
                return false;
            }
        } else {
            has_required = true;
            required_hit |= hit;
        }
    }

    !has_required || required_hit
}

fn matches_contents(filters: &[ContentFilter], snapshot: &CharacterSnapshot) -> bool {
    let mut has_required = false;
    let mut required_hit = false;

    for filter in filters {
        let hit = snapshot.has_content(filter.content);
        if filter.exclude {
            if hit {
                return false;
            }
        } else {
            has_required = true;
            required_hit |= hit;
        }
    }

    !has_required || required_hit
}

fn matches_traits(filters: &FilterSet, snapshot: &CharacterSnapshot) -> bool {
    let required = &filters.traits;
    let actual = &snapshot.traits;

    required.female.map_or(true, |want| actual.female == want)
        && required.unique.map_or(true, |want| actual.unique == want)
        && required
            .summonable
            .map_or(true, |want| actual.summonable == want)
        && required.child.map_or(true, |want| actual.child == want)
}
