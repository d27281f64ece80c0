#![allow(dead_code)]

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Once;

use guess_core::config::GAME_CONFIG_ENV;
use guess_core::{CatalogProvider, ChainGameController, GameConfig, StaticCatalog};
use guess_schema::{ChainSessionSnapshot, ChallengeKind, ChallengeRule, Entity, EntityId};

static INIT: Once = Once::new();

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Points `GUESS_CONFIG_PATH` at the integration config, once per test binary.
pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = fixture_path("test_game_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test game config at {}",
            config_path.display()
        );

        std::env::set_var(GAME_CONFIG_ENV, &config_path);
    });
}

pub fn fixture_catalog() -> Vec<Entity> {
    StaticCatalog::from_file(&fixture_path("catalog.json"))
        .expect("fixture catalog parses")
        .entities()
        .to_vec()
}

pub fn provider() -> Rc<dyn CatalogProvider> {
    Rc::new(StaticCatalog::new(fixture_catalog()))
}

pub fn entity(catalog: &[Entity], id: u64) -> Entity {
    catalog
        .iter()
        .find(|entity| entity.id == EntityId(id))
        .cloned()
        .unwrap_or_else(|| panic!("fixture entity {id} missing"))
}

/// Only "higher score" challenges, without the solvability filter.
pub fn higher_score_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.chain.challenge_kinds = vec![ChallengeKind::HigherScore];
    config.chain.require_solvable = false;
    config
}

/// Puts `controller` into an active chain at round zero with `reference` as
/// the only used entity, under a fixed rule.
pub fn resume_at(
    controller: &mut ChainGameController,
    catalog: &[Entity],
    reference: &Entity,
    rule: ChallengeRule,
) {
    let snapshot = ChainSessionSnapshot {
        reference: reference.clone(),
        challenge: rule,
        used_ids: vec![reference.id],
        rounds_completed: 0,
        accumulated_score: 0,
        terminal: false,
        created_at_ms: 0,
        saved_at_ms: 0,
    };
    controller
        .resume(catalog.to_vec(), snapshot)
        .expect("fixture catalog is not empty");
}

pub fn higher_than(reference: &Entity) -> ChallengeRule {
    ChallengeRule::HigherScore {
        score: reference.score.expect("reference has a score"),
    }
}
