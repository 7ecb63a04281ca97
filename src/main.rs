//! Bestow - demo entry point
//!
//! Loads a rule file (see `data/rules.toml`), builds a small demo world,
//! runs the initial distribution pass and a death event, and prints what
//! every character ended up with.

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bestow::character::record::CharacterRecord;
use bestow::character::roster::Roster;
use bestow::character::snapshot::CharacterTraits;
use bestow::content::catalog::ContentCatalog;
use bestow::core::config::EngineConfig;
use bestow::core::error::Result;
use bestow::core::types::ContentKind;
use bestow::distribute::death::{DeathEvent, DeathHandler};
use bestow::distribute::{distribute_population, DistributionContext};
use bestow::rules::loader::load_rules;
use bestow::rules::repository::RuleRepository;

#[derive(Parser)]
#[command(name = "bestow", about = "Rule-driven content distribution demo")]
struct Args {
    /// Path to a TOML rule file
    #[arg(default_value = "data/rules.toml")]
    rules: PathBuf,

    /// RNG seed, for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("bestow=info")
        .init();

    let args = Args::parse();

    let mut catalog = ContentCatalog::new();
    register_demo_content(&mut catalog);

    let raw = load_rules(&args.rules)?;
    tracing::info!("Loaded {} rules from {}", raw.len(), args.rules.display());

    let repository = RuleRepository::build(&raw, &catalog);
    repository.log_summary();
    if repository.is_empty() {
        tracing::warn!("No distributable rules registered; nothing will happen");
    }

    let death_handler = DeathHandler::from_rules(&repository);
    let ctx = DistributionContext::new(repository, EngineConfig::new());

    let mut roster = Roster::new();
    let victim = spawn_demo_population(&mut roster);

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let touched = distribute_population(&ctx, &mut roster, false, &mut rng);
    tracing::info!("Initial pass touched {}/{} characters", touched, roster.len());

    println!("\n=== AFTER INITIAL PASS ===");
    display_roster(&roster, &catalog);

    let event = DeathEvent {
        is_dead: true,
        subject: victim,
    };
    let applied = death_handler.handle(&ctx, &mut roster, &event, &mut rng);
    tracing::info!("Death pass applied {} refs", applied.len());

    println!("\n=== AFTER DEATH EVENT ===");
    display_roster(&roster, &catalog);

    Ok(())
}

fn register_demo_content(catalog: &mut ContentCatalog) {
    catalog.register("Undead", ContentKind::Keyword);
    catalog.register("FrostTouched", ContentKind::Keyword);
    catalog.register("BanditFaction", ContentKind::Faction);
    catalog.register("GuardFaction", ContentKind::Faction);
    catalog.register("IronWill", ContentKind::Perk);
    catalog.register("Firebolt", ContentKind::Spell);
    catalog.register("FrostCloak", ContentKind::Spell);
    catalog.register("FrostScaling", ContentKind::LeveledSpell);
    catalog.register("PatrolPackage", ContentKind::Package);
    catalog.register("AmbushPackage", ContentKind::Package);
    catalog.register("GuardOverrides", ContentKind::PackageList);
    catalog.register("BanditArmor", ContentKind::Outfit);
    catalog.register("NobleRobes", ContentKind::Outfit);
    catalog.register("Bedroll", ContentKind::Outfit);
    catalog.register("HealingDraught", ContentKind::Item);
    catalog.register("Gold", ContentKind::Item);
    catalog.register("ScarredSkin", ContentKind::Skin);
}

/// Spawn the demo characters; returns the id used for the death event.
fn spawn_demo_population(roster: &mut Roster) -> bestow::core::types::CharacterId {
    let mut player = CharacterRecord::new("Player", 30);
    player.is_player = true;
    roster.insert(player);

    let mut chief = CharacterRecord::new("Bandit Chief", 18);
    chief.traits = CharacterTraits {
        unique: true,
        ..CharacterTraits::default()
    };
    let victim = roster.insert(chief);

    let mut marauder = CharacterRecord::new("Bandit Marauder", 12);
    marauder.traits.female = true;
    roster.insert(marauder);

    roster.insert(CharacterRecord::new("Bandit Thug", 4));
    roster.insert(CharacterRecord::new("City Guard", 10));

    victim
}

fn display_roster(roster: &Roster, catalog: &ContentCatalog) {
    for &id in roster.ids() {
        let Some(record) = roster.get(id) else {
            continue;
        };

        println!("{} (level {})", record.name, record.level);
        let names = |refs: &[bestow::core::types::ContentId]| {
            refs.iter()
                .map(|&r| catalog.name(r))
                .collect::<Vec<_>>()
                .join(", ")
        };

        if !record.tags.is_empty() {
            println!("  tags: {}", names(&record.tags));
        }
        if !record.factions.is_empty() {
            let list = record
                .factions
                .iter()
                .map(|m| format!("{} (rank {})", catalog.name(m.faction), m.rank))
                .collect::<Vec<_>>()
                .join(", ");
            println!("  factions: {list}");
        }
        if !record.abilities.is_empty() {
            println!("  abilities: {}", names(&record.abilities));
        }
        if !record.leveled_abilities.is_empty() {
            println!("  leveled abilities: {}", names(&record.leveled_abilities));
        }
        if !record.packages.is_empty() {
            println!("  packages: {}", names(&record.packages));
        }
        if let Some(outfit) = record.outfit {
            println!("  outfit: {}", catalog.name(outfit));
        }
        if let Some(outfit) = record.sleep_outfit {
            println!("  sleep outfit: {}", catalog.name(outfit));
        }
        if let Some(skin) = record.skin {
            println!("  skin: {}", catalog.name(skin));
        }
        if !record.inventory.is_empty() {
            let mut items: Vec<_> = record.inventory.iter().collect();
            items.sort_by_key(|(id, _)| **id);
            let list = items
                .iter()
                .map(|(id, qty)| format!("{} x{}", catalog.name(**id), qty))
                .collect::<Vec<_>>()
                .join(", ");
            println!("  inventory: {list}");
        }
    }
}
