//! Character records and the host mutation surface

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::character::snapshot::{CharacterSnapshot, CharacterTraits};
use crate::core::types::{CharacterId, ContentId, PackageSlot};

/// One faction membership with its rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionMembership {
    pub faction: ContentId,
    pub rank: i8,
}

/// The full mutation surface the engine may use on a character.
///
/// Appliers never touch character state except through these operations, so
/// a host can back them with its own record storage. Additive operations
/// return the refs that were actually appended; setters report whether the
/// field changed.
pub trait HostRecord {
    fn add_tags(&mut self, tags: &[ContentId]) -> Vec<ContentId>;
    fn add_faction_memberships(&mut self, factions: &[ContentId], rank: i8) -> Vec<ContentId>;
    fn add_abilities(&mut self, abilities: &[ContentId]) -> Vec<ContentId>;
    fn add_leveled_abilities(&mut self, abilities: &[ContentId]) -> Vec<ContentId>;

    /// Insert a behavior package at the given list position, clamped to the
    /// list length. Returns false when the package is already present.
    fn insert_package_at(&mut self, package: ContentId, position: usize) -> bool;
    fn set_override_slot(&mut self, slot: PackageSlot, list: ContentId) -> bool;

    fn default_outfit(&self) -> Option<ContentId>;
    fn set_default_outfit(&mut self, outfit: ContentId) -> bool;
    fn set_sleep_outfit(&mut self, outfit: ContentId) -> bool;
    fn set_skin(&mut self, skin: ContentId) -> bool;

    /// Merge item quantities into the container, accumulating on repeat.
    /// Returns true when anything was added.
    fn merge_into_container(&mut self, items: &[(ContentId, u32)]) -> bool;

    fn has_marker(&self, marker: &str) -> bool;
    fn add_marker(&mut self, marker: &str);
}

/// In-memory character record backing the roster, the demo binary, and tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: CharacterId,
    pub name: String,
    pub level: u16,
    pub is_player: bool,
    pub traits: CharacterTraits,

    pub tags: Vec<ContentId>,
    pub factions: Vec<FactionMembership>,
    pub abilities: Vec<ContentId>,
    pub leveled_abilities: Vec<ContentId>,
    pub packages: Vec<ContentId>,
    pub override_slots: [Option<ContentId>; PackageSlot::COUNT],
    pub outfit: Option<ContentId>,
    pub sleep_outfit: Option<ContentId>,
    pub skin: Option<ContentId>,
    pub inventory: AHashMap<ContentId, u32>,
    markers: AHashSet<String>,
}

impl CharacterRecord {
    pub fn new(name: impl Into<String>, level: u16) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            level,
            is_player: false,
            traits: CharacterTraits::default(),
            tags: Vec::new(),
            factions: Vec::new(),
            abilities: Vec::new(),
            leveled_abilities: Vec::new(),
            packages: Vec::new(),
            override_slots: [None; PackageSlot::COUNT],
            outfit: None,
            sleep_outfit: None,
            skin: None,
            inventory: AHashMap::new(),
            markers: AHashSet::new(),
        }
    }

    /// Build the read-only view the filter evaluator works against.
    pub fn snapshot(&self, leveled_only: bool) -> CharacterSnapshot {
        let mut contents = AHashSet::with_capacity(
            self.tags.len()
                + self.factions.len()
                + self.abilities.len()
                + self.leveled_abilities.len(),
        );
        contents.extend(self.tags.iter().copied());
        contents.extend(self.factions.iter().map(|m| m.faction));
        contents.extend(self.abilities.iter().copied());
        contents.extend(self.leveled_abilities.iter().copied());

        CharacterSnapshot {
            id: self.id,
            name: self.name.clone(),
            level: self.level,
            traits: self.traits,
            contents,
            leveled_only,
        }
    }
}

/// Append refs not already present, returning the ones actually added.
fn append_missing(list: &mut Vec<ContentId>, refs: &[ContentId]) -> Vec<ContentId> {
    let mut added = Vec::new();
    for &r in refs {
        if !list.contains(&r) {
            list.push(r);
            added.push(r);
        }
    }
    added
}

impl HostRecord for CharacterRecord {
    fn add_tags(&mut self, tags: &[ContentId]) -> Vec<ContentId> {
        append_missing(&mut self.tags, tags)
    }

    fn add_faction_memberships(&mut self, factions: &[ContentId], rank: i8) -> Vec<ContentId> {
        let mut added = Vec::new();
        for &faction in factions {
            if !self.factions.iter().any(|m| m.faction == faction) {
                self.factions.push(FactionMembership { faction, rank });
                added.push(faction);
            }
        }
        added
    }

    fn add_abilities(&mut self, abilities: &[ContentId]) -> Vec<ContentId> {
        append_missing(&mut self.abilities, abilities)
    }

    fn add_leveled_abilities(&mut self, abilities: &[ContentId]) -> Vec<ContentId> {
        append_missing(&mut self.leveled_abilities, abilities)
    }

    fn insert_package_at(&mut self, package: ContentId, position: usize) -> bool {
        if self.packages.contains(&package) {
            return false;
        }
        let at = position.min(self.packages.len());
        self.packages.insert(at, package);
        true
    }

    fn set_override_slot(&mut self, slot: PackageSlot, list: ContentId) -> bool {
        let current = &mut self.override_slots[slot.as_index()];
        if *current == Some(list) {
            return false;
        }
        *current = Some(list);
        true
    }

    fn default_outfit(&self) -> Option<ContentId> {
        self.outfit
    }

    fn set_default_outfit(&mut self, outfit: ContentId) -> bool {
        if self.outfit == Some(outfit) {
            return false;
        }
        self.outfit = Some(outfit);
        true
    }

    fn set_sleep_outfit(&mut self, outfit: ContentId) -> bool {
        if self.sleep_outfit == Some(outfit) {
            return false;
        }
        self.sleep_outfit = Some(outfit);
        true
    }

    fn set_skin(&mut self, skin: ContentId) -> bool {
        if self.skin == Some(skin) {
            return false;
        }
        self.skin = Some(skin);
        true
    }

    fn merge_into_container(&mut self, items: &[(ContentId, u32)]) -> bool {
        let mut changed = false;
        for &(item, quantity) in items {
            if quantity == 0 {
                continue;
            }
            *self.inventory.entry(item).or_insert(0) += quantity;
            changed = true;
        }
        changed
    }

    fn has_marker(&self, marker: &str) -> bool {
        self.markers.contains(marker)
    }

    fn add_marker(&mut self, marker: &str) {
        self.markers.insert(marker.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_tags_skips_present() {
        let mut record = CharacterRecord::new("Bandit", 5);
        let added = record.add_tags(&[ContentId(1), ContentId(2)]);
        assert_eq!(added, vec![ContentId(1), ContentId(2)]);

        let added = record.add_tags(&[ContentId(2), ContentId(3)]);
        assert_eq!(added, vec![ContentId(3)]);
        assert_eq!(record.tags, vec![ContentId(1), ContentId(2), ContentId(3)]);
    }

    #[test]
    fn test_faction_membership_rank() {
        let mut record = CharacterRecord::new("Bandit", 5);
        record.add_faction_memberships(&[ContentId(9)], 1);

        assert_eq!(
            record.factions,
            vec![FactionMembership {
                faction: ContentId(9),
                rank: 1
            }]
        );

        // Re-adding does not duplicate or change the rank
        let added = record.add_faction_memberships(&[ContentId(9)], 3);
        assert!(added.is_empty());
        assert_eq!(record.factions.len(), 1);
        assert_eq!(record.factions[0].rank, 1);
    }

    #[test]
    fn test_insert_package_front_and_clamp() {
        let mut record = CharacterRecord::new("Guard", 10);
        assert!(record.insert_package_at(ContentId(1), 0));
        assert!(record.insert_package_at(ContentId(2), 0));
        assert_eq!(record.packages, vec![ContentId(2), ContentId(1)]);

        // Position past the end clamps to append
        assert!(record.insert_package_at(ContentId(3), 99));
        assert_eq!(record.packages, vec![ContentId(2), ContentId(1), ContentId(3)]);
    }

    #[test]
    fn test_insert_package_rejects_duplicate() {
        let mut record = CharacterRecord::new("Guard", 10);
        assert!(record.insert_package_at(ContentId(1), 0));
        assert!(!record.insert_package_at(ContentId(1), 1));
        assert_eq!(record.packages, vec![ContentId(1)]);
    }

    #[test]
    fn test_container_merge_accumulates() {
        let mut record = CharacterRecord::new("Merchant", 8);
        assert!(record.merge_into_container(&[(ContentId(5), 2)]));
        assert!(record.merge_into_container(&[(ContentId(5), 3)]));
        assert_eq!(record.inventory.get(&ContentId(5)), Some(&5));
    }

    #[test]
    fn test_container_merge_ignores_zero_quantity() {
        let mut record = CharacterRecord::new("Merchant", 8);
        assert!(!record.merge_into_container(&[(ContentId(5), 0)]));
        assert!(record.inventory.is_empty());
    }

    #[test]
    fn test_setters_report_change_only_on_difference() {
        let mut record = CharacterRecord::new("Noble", 20);
        assert!(record.set_default_outfit(ContentId(4)));
        assert!(!record.set_default_outfit(ContentId(4)));
        assert!(record.set_sleep_outfit(ContentId(6)));
        assert!(!record.set_sleep_outfit(ContentId(6)));
        assert!(record.set_skin(ContentId(7)));
        assert!(!record.set_skin(ContentId(7)));
    }

    #[test]
    fn test_markers() {
        let mut record = CharacterRecord::new("Noble", 20);
        assert!(!record.has_marker("processed"));
        record.add_marker("processed");
        assert!(record.has_marker("processed"));
    }

    #[test]
    fn test_snapshot_collects_attached_content() {
        let mut record = CharacterRecord::new("Bandit", 12);
        record.add_tags(&[ContentId(1)]);
        record.add_faction_memberships(&[ContentId(2)], 1);
        record.add_abilities(&[ContentId(3)]);
        record.add_leveled_abilities(&[ContentId(4)]);

        let snapshot = record.snapshot(false);
        assert_eq!(snapshot.level, 12);
        assert!(!snapshot.leveled_only);
        for id in [1, 2, 3, 4] {
            assert!(snapshot.has_content(ContentId(id)));
        }
    }

    proptest! {
        #[test]
        fn prop_package_insert_never_duplicates(ops in prop::collection::vec((0u32..6, 0usize..8), 0..32)) {
            let mut record = CharacterRecord::new("Any", 1);
            for (id, position) in ops {
                record.insert_package_at(ContentId(id), position);
            }
            let mut seen = record.packages.clone();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), record.packages.len());
        }

        #[test]
        fn prop_package_insert_position_in_bounds(id in 0u32..100, position in 0usize..1000) {
            let mut record = CharacterRecord::new("Any", 1);
            record.insert_package_at(ContentId(0), 0);
            record.insert_package_at(ContentId(1), 1);
            if record.insert_package_at(ContentId(id), position) {
                prop_assert!(record.packages.contains(&ContentId(id)));
                prop_assert!(record.packages.len() == 3);
            }
        }
    }
}
