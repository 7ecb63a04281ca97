//! Bestow - rule-driven content distribution for persistent-world simulations
//!
//! Declarative rules bind content (tags, factions, abilities, behavior
//! packages, outfits, items, skins) to filter predicates over character
//! state. The engine matches live characters against those predicates and
//! attaches the selected content through the host record surface, with a
//! reactive death-event pass and one level of linked distribution.

pub mod character;
pub mod content;
pub mod core;
pub mod distribute;
pub mod rules;
