//! Death-triggered distribution

use rand::Rng;

use crate::character::roster::Roster;
use crate::core::types::{CharacterId, RuleNamespace};
use crate::distribute::{self, AppliedContent, DistributionContext};
use crate::rules::repository::RuleRepository;

/// Death notification delivered by the host simulation
#[derive(Debug, Clone, Copy)]
pub struct DeathEvent {
    pub is_dead: bool,
    pub subject: CharacterId,
}

/// Synchronous handler for death events.
///
/// Whether the handler should be wired to the host's event source at all is
/// decided exactly once, from the rules loaded into the death namespace; an
/// empty namespace means the handler provably never applies anything.
#[derive(Debug, Clone, Copy)]
pub struct DeathHandler {
    registered: bool,
}

impl DeathHandler {
    pub fn from_rules(repository: &RuleRepository) -> Self {
        let registered = !repository.namespace_empty(RuleNamespace::Death);
        if registered {
            tracing::info!("Registered for death distribution");
        }
        Self { registered }
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Handle one death notification.
    ///
    /// Returns the refs applied to the subject. The result is empty when
    /// the event is ignored: an unregistered handler, a live subject, the
    /// player, or an id that resolves to no character.
    pub fn handle(
        &self,
        ctx: &DistributionContext,
        roster: &mut Roster,
        event: &DeathEvent,
        rng: &mut impl Rng,
    ) -> AppliedContent {
        if !self.registered || !event.is_dead {
            return AppliedContent::new();
        }

        let Some(record) = roster.get_mut(event.subject) else {
            return AppliedContent::new();
        };
        if record.is_player {
            return AppliedContent::new();
        }

        let snapshot = record.snapshot(false);
        let applied = distribute::distribute_to_character(
            ctx,
            RuleNamespace::Death,
            record,
            &snapshot,
            rng,
        );

        if !applied.is_empty() {
            tracing::debug!(
                "Death distribution applied {} refs to '{}'",
                applied.len(),
                snapshot.name
            );
        }

        applied
    }
}
