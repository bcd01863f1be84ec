//! End-to-end runs of the batch jobs against a real in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use cadence_core::config::CadenceConfig;
use cadence_core::model::{PatternType, Scope, SourceTag};
use cadence_core::traits::{AlertSeverity, IOpsStore, IPatternStore};
use cadence_orchestrator::{BackfillJob, HealthJob, LearningJob};
use cadence_resolver::WeightResolver;
use cadence_store::StoreEngine;
use test_fixtures::{conversion_scenario, ClientScenario};

fn seed(engine: &StoreEngine, scenario: &ClientScenario) {
    engine
        .upsert_client(&scenario.client_id, Some(&scenario.industry))
        .unwrap();
    for touch in &scenario.touches {
        engine.insert_touch(touch).unwrap();
    }
    for (lead_id, components) in &scenario.components {
        engine
            .insert_score_components(lead_id, &scenario.client_id, components)
            .unwrap();
    }
    for event in &scenario.conversions {
        engine.record_conversion(event).unwrap();
    }
}

fn learning_job(engine: &Arc<StoreEngine>) -> LearningJob {
    LearningJob::new(
        engine.clone(),
        engine.clone(),
        engine.clone(),
        CadenceConfig::default(),
    )
}

fn acme_setup(now: DateTime<Utc>) -> Arc<StoreEngine> {
    let engine = Arc::new(StoreEngine::open_in_memory().unwrap());
    seed(&engine, &conversion_scenario("acme", "saas", 120, 40, 7, now));
    engine
}

#[test]
fn learning_run_yields_client_learned_weights() {
    let now = Utc::now();
    let engine = acme_setup(now);
    let reports = learning_job(&engine).run(now).unwrap();

    // client + industry + platform scopes, all four types each
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.failure.is_none()));
    assert!(reports.iter().all(|r| r.patterns_written == 4));

    let resolver = WeightResolver::new(engine.clone(), engine.clone(), engine.watermarks());
    let resolved = resolver.resolve_weights("acme").unwrap();
    assert_eq!(resolved.source, SourceTag::ClientLearned);
    assert!(resolved.weights.is_valid());
    assert!(resolved.computed_at.is_some());
    // authority drives conversion in the scenario
    assert!(resolved.weights.authority > 0.3, "{:?}", resolved.weights);

    let scope = Scope::Client("acme".into());
    assert!(resolver.get_when_pattern(&scope, now).is_some());
    assert!(resolver.get_how_pattern(&scope, now).is_some());
}

#[test]
fn rerun_on_unchanged_data_is_idempotent() {
    let now = Utc::now();
    let engine = acme_setup(now);
    let job = learning_job(&engine);
    let scope = Scope::Client("acme".into());

    job.run(now).unwrap();
    let first: Vec<_> = PatternType::ALL
        .iter()
        .map(|t| engine.read_active(&scope, *t).unwrap().unwrap())
        .collect();

    job.run(now).unwrap();
    for previous in &first {
        let current = engine
            .read_active(&scope, previous.pattern_type)
            .unwrap()
            .unwrap();
        assert_eq!(
            current.payload_hash().unwrap(),
            previous.payload_hash().unwrap(),
            "{} payload drifted on identical data",
            previous.pattern_type.as_str()
        );
        assert_eq!(current.confidence, previous.confidence);
        // The second run superseded the first: exactly one history row.
        let history = engine.history(&scope, previous.pattern_type).unwrap();
        assert_eq!(history.len(), 1);
    }
}

#[test]
fn who_admission_gate_sits_between_49_and_50_leads() {
    let now = Utc::now();
    let engine = Arc::new(StoreEngine::open_in_memory().unwrap());
    seed(&engine, &conversion_scenario("fortynine", "saas", 49, 15, 3, now));
    seed(&engine, &conversion_scenario("fifty", "saas", 50, 16, 4, now));

    learning_job(&engine).run(now).unwrap();

    assert!(engine
        .read_active(&Scope::Client("fortynine".into()), PatternType::Who)
        .unwrap()
        .is_none());
    assert!(engine
        .read_active(&Scope::Client("fifty".into()), PatternType::Who)
        .unwrap()
        .is_some());
    // The thin scope still learns its lift patterns from 98 touches.
    assert!(engine
        .read_active(&Scope::Client("fortynine".into()), PatternType::What)
        .unwrap()
        .is_some());
}

#[test]
fn scopes_learn_independently() {
    let now = Utc::now();
    let engine = Arc::new(StoreEngine::open_in_memory().unwrap());
    seed(&engine, &conversion_scenario("acme", "saas", 120, 40, 7, now));
    seed(&engine, &conversion_scenario("initech", "fintech", 80, 20, 9, now));

    learning_job(&engine).run(now).unwrap();

    let acme = engine
        .read_active(&Scope::Client("acme".into()), PatternType::Who)
        .unwrap()
        .unwrap();
    let initech = engine
        .read_active(&Scope::Client("initech".into()), PatternType::Who)
        .unwrap()
        .unwrap();
    assert_eq!(acme.sample_size, 120);
    assert_eq!(initech.sample_size, 80);

    let platform = engine
        .read_active(&Scope::Platform, PatternType::Who)
        .unwrap()
        .unwrap();
    assert_eq!(platform.sample_size, 200);
}

#[test]
fn backfill_checkpoints_and_resumes() {
    let now = Utc::now();
    let engine = acme_setup(now);
    let job = BackfillJob::new(
        engine.clone(),
        engine.clone(),
        engine.clone(),
        CadenceConfig::default(),
    );

    let first = job.run("bf-2026-08", 720, now).unwrap();
    assert!(first.iter().all(|r| r.patterns_written > 0));
    assert!(engine
        .backfill_complete("bf-2026-08", &Scope::Client("acme".into()))
        .unwrap());

    // A re-run of the same job id skips every completed scope.
    let second = job.run("bf-2026-08", 720, now).unwrap();
    assert!(second.iter().all(|r| r.patterns_written == 0 && r.failure.is_none()));
    let history = engine
        .history(&Scope::Client("acme".into()), PatternType::Who)
        .unwrap();
    assert!(history.is_empty(), "skipped scopes must not rewrite");

    // A different job id starts fresh.
    assert!(!engine
        .backfill_complete("bf-other", &Scope::Client("acme".into()))
        .unwrap());
}

#[test]
fn health_job_flags_without_rewriting() {
    let now = Utc::now();
    let engine = acme_setup(now);
    learning_job(&engine).run(now).unwrap();

    // Age the clock past validity so every pattern reads as expired.
    let later = now + Duration::days(15);
    let alerts = HealthJob::new(engine.clone(), engine.clone())
        .run(later)
        .unwrap();

    assert!(!alerts.is_empty());
    assert!(alerts.iter().all(|a| a.severity == AlertSeverity::Warning
        || a.severity == AlertSeverity::Critical));
    assert!(alerts
        .iter()
        .any(|a| a.scope == Scope::Client("acme".into())));

    // Flags only: the patterns themselves are untouched.
    let active = engine.list_active().unwrap();
    assert_eq!(active.len(), 12);
    for pattern in active {
        assert!(engine
            .history(&pattern.scope, pattern.pattern_type)
            .unwrap()
            .is_empty());
    }
}
