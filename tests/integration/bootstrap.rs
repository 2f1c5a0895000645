use crate::*;

use std::time::Instant;

use axum::http::StatusCode;
use gizo_client::{Bootstrapper, Error, Gizo};
use gizo_core::{ConnectionState, KeyPair, StateStore};

fn persist(path: &Path, dispatcher: &str, keys: Option<KeyPair>) {
    StateStore::new(path)
        .save(&ConnectionState {
            dispatcher: dispatcher.to_string(),
            keys,
        })
        .unwrap();
}

fn old_keys() -> KeyPair {
    KeyPair {
        public: "old-pub".into(),
        private: "old-priv".into(),
    }
}

/// Discovery walks candidates in registry order, skipping malformed and
/// unreachable ones, and adopts the first that answers.
#[tokio::test]
async fn test_discovery_skips_bad_and_unreachable_candidates() {
    let good = MockDispatcher::spawn("good").await.unwrap();
    let later = MockDispatcher::spawn("later").await.unwrap();
    let registry = MockRegistry::spawn(vec![
        "definitely not a url".into(),
        "gizo://127.0.0.1:9995".into(),
        unreachable_url(),
        good.url(),
        later.url(),
    ])
    .await
    .unwrap();
    let state = state_path("discovery-skips");

    let gizo = Gizo::connect(config(&state, Some(&registry))).await.unwrap();

    assert_eq!(gizo.dispatcher().url(), good.url());
    assert_eq!(gizo.dispatcher().identity(), format!("{}-key", good.name));
    assert_eq!(gizo.keys().public, "good-pub-1");
    assert_eq!(good.key_requests(), 1);
    assert!(later.calls().is_empty(), "iteration must stop at first success");
    assert_eq!(registry.hits(), 1);

    let saved = read_state(&state);
    assert_eq!(saved["dispatcher"], good.url());
    assert_eq!(saved["keys"]["pub"], "good-pub-1");
    assert_eq!(saved["keys"]["priv"], "good-priv-1");
}

#[tokio::test]
async fn test_empty_registry_means_no_dispatcher() {
    let registry = MockRegistry::spawn(vec![]).await.unwrap();
    let state = state_path("empty-registry");

    let err = Gizo::connect(config(&state, Some(&registry))).await.unwrap_err();

    assert!(matches!(err, Error::NoDispatcherAvailable { candidates: 0 }), "{err}");
    assert!(!state.exists(), "nothing should be persisted on failure");
}

#[tokio::test]
async fn test_all_candidates_unusable_means_no_dispatcher() {
    let registry = MockRegistry::spawn(vec!["::::".into(), unreachable_url()])
        .await
        .unwrap();
    let state = state_path("all-unusable");

    let err = Gizo::connect(config(&state, Some(&registry))).await.unwrap_err();

    assert!(matches!(err, Error::NoDispatcherAvailable { candidates: 2 }), "{err}");
}

#[tokio::test]
async fn test_registry_503_is_unavailable() {
    let good = MockDispatcher::spawn("good").await.unwrap();
    let registry = MockRegistry::spawn_with_status(StatusCode::SERVICE_UNAVAILABLE, vec![good.url()])
        .await
        .unwrap();
    let state = state_path("registry-503");

    let err = Gizo::connect(config(&state, Some(&registry))).await.unwrap_err();

    assert!(matches!(err, Error::RegistryUnavailable { .. }), "{err}");
    assert!(err.to_string().contains("503"), "{err}");
    assert_eq!(good.key_requests(), 0);
}

/// A healthy persisted dispatcher is reused with its key pair; the registry
/// is never asked and no new keys are issued.
#[tokio::test]
async fn test_healthy_persisted_dispatcher_is_reused() {
    let known = MockDispatcher::spawn("known").await.unwrap();
    let registry = MockRegistry::spawn(vec![]).await.unwrap();
    let state = state_path("reuse");
    persist(&state, &known.url(), Some(old_keys()));

    let gizo = Gizo::connect(config(&state, Some(&registry))).await.unwrap();

    assert_eq!(gizo.dispatcher().url(), known.url());
    assert_eq!(gizo.keys(), &old_keys());
    assert_eq!(registry.hits(), 0);
    assert_eq!(known.key_requests(), 0);
}

/// A dead persisted dispatcher demotes to discovery; the state file is
/// overwritten with the new dispatcher and a freshly issued key pair.
#[tokio::test]
async fn test_dead_persisted_dispatcher_falls_back_to_discovery() {
    let fresh = MockDispatcher::spawn("fresh").await.unwrap();
    let registry = MockRegistry::spawn(vec![fresh.url()]).await.unwrap();
    let state = state_path("failover");
    let dead = unreachable_url();
    persist(&state, &dead, Some(old_keys()));

    let gizo = Gizo::connect(config(&state, Some(&registry))).await.unwrap();

    assert_eq!(gizo.dispatcher().url(), fresh.url());
    assert_eq!(gizo.keys().public, "fresh-pub-1");
    assert_eq!(registry.hits(), 1);

    let saved = read_state(&state);
    assert_eq!(saved["dispatcher"], fresh.url());
    assert_eq!(saved["keys"]["pub"], "fresh-pub-1");
    assert_ne!(saved["keys"]["pub"], "old-pub");
}

#[tokio::test]
async fn test_failover_can_keep_persisted_keys() {
    let fresh = MockDispatcher::spawn("fresh").await.unwrap();
    let registry = MockRegistry::spawn(vec![fresh.url()]).await.unwrap();
    let state = state_path("failover-keep-keys");
    persist(&state, &unreachable_url(), Some(old_keys()));

    let mut cfg = config(&state, Some(&registry));
    cfg.rotate_keys_on_failover = false;
    let gizo = Gizo::connect(cfg).await.unwrap();

    assert_eq!(gizo.dispatcher().url(), fresh.url());
    assert_eq!(gizo.keys(), &old_keys());
    assert_eq!(fresh.key_requests(), 0);

    let saved = read_state(&state);
    assert_eq!(saved["dispatcher"], fresh.url());
    assert_eq!(saved["keys"]["pub"], "old-pub");
}

#[tokio::test]
async fn test_malformed_persisted_dispatcher_falls_back_to_discovery() {
    let fresh = MockDispatcher::spawn("fresh").await.unwrap();
    let registry = MockRegistry::spawn(vec![fresh.url()]).await.unwrap();
    let state = state_path("persisted-malformed");
    persist(&state, "gizo://no-port-here@127.0.0.1", Some(old_keys()));

    let gizo = Gizo::connect(config(&state, Some(&registry))).await.unwrap();

    assert_eq!(gizo.dispatcher().url(), fresh.url());
    assert_eq!(read_state(&state)["dispatcher"], fresh.url());
}

/// Failover that finds nothing surfaces the discovery error; the old state
/// file is left untouched.
#[tokio::test]
async fn test_failover_with_no_candidates_fails() {
    let registry = MockRegistry::spawn(vec![]).await.unwrap();
    let state = state_path("failover-empty");
    let dead = unreachable_url();
    persist(&state, &dead, Some(old_keys()));

    let err = Gizo::connect(config(&state, Some(&registry))).await.unwrap_err();

    assert!(matches!(err, Error::NoDispatcherAvailable { .. }), "{err}");
    assert_eq!(read_state(&state)["dispatcher"], dead);
}

#[tokio::test]
async fn test_persisted_state_without_keys_requests_them() {
    let known = MockDispatcher::spawn("known").await.unwrap();
    let state = state_path("reuse-no-keys");
    persist(&state, &known.url(), None);

    let gizo = Gizo::connect(config(&state, None)).await.unwrap();

    assert_eq!(gizo.keys().public, "known-pub-1");
    assert_eq!(read_state(&state)["keys"]["pub"], "known-pub-1");
}

/// With no state file, an explicit dispatcher is used directly; a second
/// bootstrap then takes the reuse path with the persisted keys.
#[tokio::test]
async fn test_explicit_dispatcher_then_reuse() {
    let chosen = MockDispatcher::spawn("chosen").await.unwrap();
    let registry = MockRegistry::spawn(vec![]).await.unwrap();
    let state = state_path("explicit");

    let mut cfg = config(&state, Some(&registry));
    cfg.dispatcher = Some(chosen.url());

    let first = Gizo::connect(cfg.clone()).await.unwrap();
    assert_eq!(first.dispatcher().url(), chosen.url());
    assert_eq!(first.keys().public, "chosen-pub-1");
    assert_eq!(read_state(&state)["dispatcher"], chosen.url());

    let second = Gizo::connect(cfg).await.unwrap();
    assert_eq!(second.keys(), first.keys());
    assert_eq!(chosen.key_requests(), 1);
    assert_eq!(registry.hits(), 0);
}

#[tokio::test]
async fn test_explicit_unreachable_dispatcher_does_not_discover() {
    let good = MockDispatcher::spawn("good").await.unwrap();
    let registry = MockRegistry::spawn(vec![good.url()]).await.unwrap();
    let state = state_path("explicit-unreachable");

    let mut cfg = config(&state, Some(&registry));
    cfg.dispatcher = Some(unreachable_url());

    let err = Gizo::connect(cfg).await.unwrap_err();

    assert!(matches!(err, Error::DispatcherUnreachable { .. }), "{err}");
    assert_eq!(registry.hits(), 0);
    assert!(!state.exists());
}

#[tokio::test]
async fn test_bootstrapper_session_matches_state_file() {
    let good = MockDispatcher::spawn("good").await.unwrap();
    let registry = MockRegistry::spawn(vec![good.url()]).await.unwrap();
    let state = state_path("bootstrapper-session");

    let bootstrapper = Bootstrapper::new(config(&state, Some(&registry))).unwrap();
    let session = bootstrapper.bootstrap().await.unwrap();

    let saved = bootstrapper.store().load().unwrap().unwrap();
    assert_eq!(saved.dispatcher, session.endpoint.url());
    assert_eq!(saved.keys.as_ref(), Some(&session.keys));
    assert_eq!(
        session.connection.url(),
        format!("http://127.0.0.1:{}/rpc", session.endpoint.port())
    );
}

/// A persisted dispatcher whose health endpoint hangs is abandoned once the
/// probe timeout elapses, not when the dispatcher finally answers.
#[tokio::test]
async fn test_slow_persisted_dispatcher_times_out_into_discovery() {
    let slow = StubDispatcher::slow_status(Duration::from_secs(5)).await.unwrap();
    let fresh = MockDispatcher::spawn("fresh").await.unwrap();
    let registry = MockRegistry::spawn(vec![fresh.url()]).await.unwrap();
    let state = state_path("slow-persisted");
    persist(&state, &slow.url(), Some(old_keys()));

    let started = Instant::now();
    let gizo = Gizo::connect(config(&state, Some(&registry))).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(gizo.dispatcher().url(), fresh.url());
    assert!(elapsed >= Duration::from_millis(500), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(1500), "{elapsed:?}");
}

#[tokio::test]
async fn test_slow_explicit_dispatcher_is_unreachable() {
    let slow = StubDispatcher::slow_status(Duration::from_secs(5)).await.unwrap();
    let state = state_path("slow-explicit");
    let mut cfg = config(&state, None);
    cfg.dispatcher = Some(slow.url());

    let started = Instant::now();
    let err = Gizo::connect(cfg).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, Error::DispatcherUnreachable { .. }), "{err}");
    assert!(elapsed < Duration::from_millis(1500), "{elapsed:?}");
    assert!(!state.exists());
}
