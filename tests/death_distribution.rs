//! Integration tests for the death-triggered distribution pass

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bestow::character::record::CharacterRecord;
use bestow::character::roster::Roster;
use bestow::content::catalog::ContentCatalog;
use bestow::core::config::EngineConfig;
use bestow::core::types::{CharacterId, ContentKind, RuleNamespace};
use bestow::distribute::death::{DeathEvent, DeathHandler};
use bestow::distribute::{distribute_population, DistributionContext};
use bestow::rules::repository::RuleRepository;
use bestow::rules::rule::{ContentCategory, RawRule, StringFilter};

fn demo_catalog() -> ContentCatalog {
    let mut catalog = ContentCatalog::new();
    catalog.register("Undead", ContentKind::Keyword);
    catalog.register("IronWill", ContentKind::Perk);
    catalog.register("HealingDraught", ContentKind::Item);
    catalog.register("BanditArmor", ContentKind::Outfit);
    catalog.register("BurialShroud", ContentKind::Outfit);
    catalog.register("ScarredSkin", ContentKind::Skin);
    catalog
}

fn death_rules() -> Vec<RawRule> {
    let mut draught = RawRule::new(
        RuleNamespace::Death,
        Some(ContentCategory::Item),
        "HealingDraught",
    );
    draught.names = vec![StringFilter::require("Bandit")];

    let undead = RawRule::new(RuleNamespace::Death, Some(ContentCategory::Keyword), "Undead");

    vec![draught, undead]
}

#[test]
fn test_death_event_applies_death_namespace() {
    let catalog = demo_catalog();
    let undead = catalog.find("Undead").unwrap().id;
    let draught = catalog.find("HealingDraught").unwrap().id;

    let repo = RuleRepository::build(&death_rules(), &catalog);
    let handler = DeathHandler::from_rules(&repo);
    assert!(handler.is_registered());

    let ctx = DistributionContext::new(repo, EngineConfig::new());
    let mut roster = Roster::new();
    let bandit = roster.insert(CharacterRecord::new("Bandit Thug", 6));

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let event = DeathEvent {
        is_dead: true,
        subject: bandit,
    };
    let applied = handler.handle(&ctx, &mut roster, &event, &mut rng);

    assert_eq!(applied.len(), 2);
    let record = roster.get(bandit).unwrap();
    assert!(record.tags.contains(&undead));
    assert_eq!(record.inventory.get(&draught), Some(&1));
}

#[test]
fn test_player_death_is_ignored() {
    let catalog = demo_catalog();
    let repo = RuleRepository::build(&death_rules(), &catalog);
    let handler = DeathHandler::from_rules(&repo);
    let ctx = DistributionContext::new(repo, EngineConfig::new());

    let mut roster = Roster::new();
    let mut player = CharacterRecord::new("Player Bandit", 30);
    player.is_player = true;
    let player_id = roster.insert(player);

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let event = DeathEvent {
        is_dead: true,
        subject: player_id,
    };
    let applied = handler.handle(&ctx, &mut roster, &event, &mut rng);

    assert!(applied.is_empty());
    let record = roster.get(player_id).unwrap();
    assert!(record.tags.is_empty());
    assert!(record.inventory.is_empty());
}

#[test]
fn test_live_subject_is_ignored() {
    let catalog = demo_catalog();
    let repo = RuleRepository::build(&death_rules(), &catalog);
    let handler = DeathHandler::from_rules(&repo);
    let ctx = DistributionContext::new(repo, EngineConfig::new());

    let mut roster = Roster::new();
    let bandit = roster.insert(CharacterRecord::new("Bandit Thug", 6));

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let event = DeathEvent {
        is_dead: false,
        subject: bandit,
    };
    let applied = handler.handle(&ctx, &mut roster, &event, &mut rng);

    assert!(applied.is_empty());
    assert!(roster.get(bandit).unwrap().tags.is_empty());
}

#[test]
fn test_unknown_subject_is_ignored() {
    let catalog = demo_catalog();
    let repo = RuleRepository::build(&death_rules(), &catalog);
    let handler = DeathHandler::from_rules(&repo);
    let ctx = DistributionContext::new(repo, EngineConfig::new());

    let mut roster = Roster::new();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let event = DeathEvent {
        is_dead: true,
        subject: CharacterId::new(),
    };
    let applied = handler.handle(&ctx, &mut roster, &event, &mut rng);
    assert!(applied.is_empty());
}

#[test]
fn test_unregistered_handler_does_nothing() {
    let catalog = demo_catalog();

    // Regular rules only; the death namespace stays empty
    let regular = RawRule::new(RuleNamespace::Regular, Some(ContentCategory::Perk), "IronWill");
    let repo = RuleRepository::build(&[regular], &catalog);
    let handler = DeathHandler::from_rules(&repo);
    assert!(!handler.is_registered());

    let ctx = DistributionContext::new(repo, EngineConfig::new());
    let mut roster = Roster::new();
    let bandit = roster.insert(CharacterRecord::new("Bandit Thug", 6));

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let event = DeathEvent {
        is_dead: true,
        subject: bandit,
    };
    let applied = handler.handle(&ctx, &mut roster, &event, &mut rng);

    assert!(applied.is_empty());
    assert!(roster.get(bandit).unwrap().abilities.is_empty());
}

#[test]
fn test_death_cascade_may_overwrite_outfit() {
    let catalog = demo_catalog();
    let armor = catalog.find("BanditArmor").unwrap().id;
    let shroud = catalog.find("BurialShroud").unwrap().id;

    // Living bandits wear armor; on death the undead mark is applied, and
    // the linked set under it swaps the outfit for a burial shroud.
    let mut armor_rule = RawRule::new(
        RuleNamespace::Regular,
        Some(ContentCategory::Outfit),
        "BanditArmor",
    );
    armor_rule.names = vec![StringFilter::require("Bandit")];

    let undead = RawRule::new(RuleNamespace::Death, Some(ContentCategory::Keyword), "Undead");

    let mut shroud_rule = RawRule::new(
        RuleNamespace::Death,
        Some(ContentCategory::Outfit),
        "BurialShroud",
    );
    shroud_rule.linked_to = vec!["Undead".to_string()];

    let repo = RuleRepository::build(&[armor_rule, undead, shroud_rule], &catalog);
    let handler = DeathHandler::from_rules(&repo);
    let ctx = DistributionContext::new(repo, EngineConfig::new());

    let mut roster = Roster::new();
    let bandit = roster.insert(CharacterRecord::new("Bandit Thug", 6));

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    distribute_population(&ctx, &mut roster, false, &mut rng);
    assert_eq!(roster.get(bandit).unwrap().outfit, Some(armor));

    let event = DeathEvent {
        is_dead: true,
        subject: bandit,
    };
    handler.handle(&ctx, &mut roster, &event, &mut rng);

    // The processed marker would block a regular pass, but the cascade
    // runs with overwrite permitted.
    assert_eq!(roster.get(bandit).unwrap().outfit, Some(shroud));
}

#[test]
fn test_population_pass_skips_player() {
    let catalog = demo_catalog();
    let perk = catalog.find("IronWill").unwrap().id;

    let rule = RawRule::new(RuleNamespace::Regular, Some(ContentCategory::Perk), "IronWill");
    let repo = RuleRepository::build(&[rule], &catalog);
    let ctx = DistributionContext::new(repo, EngineConfig::new());

    let mut roster = Roster::new();
    let mut player = CharacterRecord::new("Player", 30);
    player.is_player = true;
    let player_id = roster.insert(player);
    let bandit = roster.insert(CharacterRecord::new("Bandit Thug", 6));

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let touched = distribute_population(&ctx, &mut roster, false, &mut rng);

    assert_eq!(touched, 1);
    assert!(roster.get(player_id).unwrap().abilities.is_empty());
    assert!(roster.get(bandit).unwrap().abilities.contains(&perk));
}
