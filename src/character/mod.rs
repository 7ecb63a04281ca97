//! Characters: records, snapshots, and the roster that holds them

pub mod record;
pub mod roster;
pub mod snapshot;

pub use record::{CharacterRecord, FactionMembership, HostRecord};
pub use roster::Roster;
pub use snapshot::{CharacterSnapshot, CharacterTraits};
