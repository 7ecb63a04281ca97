//! Chance-gated selection with per-level memoization

use std::sync::Mutex;

use ahash::AHashMap;
use rand::Rng;

use crate::core::types::{CharacterId, RuleId};
use crate::rules::repository::ResolvedEntry;
use crate::rules::rule::SelectionSpec;

/// Key identifying one memoized evaluation of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DistributionKey {
    pub character: CharacterId,
    pub level: u16,
    pub leveled_only: bool,
}

/// Concrete outcome of resolving a selection spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Index(u32),
    Count(u32),
}

#[derive(Debug, Clone, Copy)]
struct Outcome {
    /// `None` records a failed chance roll.
    resolved: Option<Resolved>,
}

/// Append-only memo of selection outcomes.
///
/// Rows are written exactly once and never mutated, so a fixed key always
/// yields the outcome of its first resolution: re-running distribution for
/// a character at the same level never re-rolls content it already decided
/// on. The mutex makes insertion safe when the host drives distribution
/// from more than one logical caller.
#[derive(Debug, Default)]
pub struct LevelCache {
    rows: Mutex<AHashMap<(DistributionKey, RuleId), Outcome>>,
}

impl LevelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().expect("level cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Roll inclusion and resolve the selection spec, memoized under
    /// `(key, rule)`. Returns `None` when the chance roll failed.
    pub fn select(
        &self,
        key: DistributionKey,
        entry: &ResolvedEntry,
        rng: &mut impl Rng,
    ) -> Option<Resolved> {
        let mut rows = self.rows.lock().expect("level cache lock poisoned");

        if let Some(outcome) = rows.get(&(key, entry.rule_id)) {
            return outcome.resolved;
        }

        let outcome = roll(entry, rng);
        rows.insert((key, entry.rule_id), outcome);
        outcome.resolved
    }
}

/// A draw in `[0, 100)` strictly below the chance passes, so 100 always
/// passes and 0 never does.
fn roll(entry: &ResolvedEntry, rng: &mut impl Rng) -> Outcome {
    if rng.gen_range(0.0f32..100.0) >= entry.chance {
        return Outcome { resolved: None };
    }

    let resolved = match entry.selection {
        SelectionSpec::Index(index) => Resolved::Index(index),
        SelectionSpec::RandomCount { min, max } => {
            let count = if min >= max {
                min
            } else {
                rng.gen_range(min..=max)
            };
            Resolved::Count(count)
        }
    };

    Outcome {
        resolved: Some(resolved),
    }
}
