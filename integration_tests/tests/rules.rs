mod common;

use common::{fixture_catalog, higher_score_config};
use guess_core::{evaluate, session_rng, ChallengeGenerator, ComparisonEngine};
use guess_schema::{ChallengeKind, ChallengeRule, EntityId};

#[test]
fn higher_score_rule_splits_catalog_at_reference() {
    let catalog = fixture_catalog();
    let generator = ChallengeGenerator::new(&higher_score_config().chain);
    let mut rng = session_rng(Some(17));

    for reference in catalog.iter().filter(|entity| entity.score.is_some()) {
        let challenge = generator.generate(reference, &mut rng);
        let ChallengeRule::HigherScore { score } = challenge.rule() else {
            panic!("{reference} should get a higher score challenge");
        };
        assert_eq!(Some(*score), reference.score);

        for candidate in &catalog {
            let expected = candidate.score.is_some_and(|s| s > *score);
            assert_eq!(
                evaluate(challenge.rule(), candidate),
                expected,
                "{candidate} against {reference}"
            );
        }
    }
}

#[test]
fn unscored_reference_falls_back_to_anything() {
    let catalog = fixture_catalog();
    let harbor = catalog
        .iter()
        .find(|entity| entity.id == EntityId(8))
        .expect("unscored fixture");
    let generator = ChallengeGenerator::new(&higher_score_config().chain);
    let challenge = generator.generate(harbor, &mut session_rng(Some(3)));
    assert_eq!(challenge.kind(), ChallengeKind::Anything);
    assert!(catalog.iter().all(|entity| challenge.is_satisfied_by(entity)));
}

#[test]
fn single_episode_reference_never_asks_for_fewer() {
    let catalog = fixture_catalog();
    let generator = ChallengeGenerator::default();

    for seed in 0..64 {
        let mut rng = session_rng(Some(seed));
        for reference in catalog.iter().filter(|entity| entity.episodes == Some(1)) {
            let rules = generator.eligible_rules(reference, &mut rng);
            assert!(rules
                .iter()
                .all(|rule| rule.kind() != ChallengeKind::FewerEpisodes));
            assert!(rules
                .iter()
                .any(|rule| rule.kind() == ChallengeKind::MoreEpisodes));
            assert_ne!(
                generator.generate(reference, &mut rng).kind(),
                ChallengeKind::FewerEpisodes
            );
        }
    }
}

#[test]
fn identical_genre_sets_overlap_completely() {
    let catalog = fixture_catalog();
    let engine = ComparisonEngine::new(0.1);

    for target in &catalog {
        let mut twin = target.clone();
        twin.id = EntityId(target.id.0 + 1_000);
        twin.genres.reverse();

        let result = engine.compare(target, &twin);
        assert!(!result.is_target);
        assert_eq!(result.genre_overlap.correct.len(), target.genres.len());
        assert!(result.genre_overlap.wrong.is_empty());
    }
}
