//! Privileged document writes behind the displayed cover state.
mod common;

use std::time::Duration;

use common::{ARCHER, GOBLIN, config, drain, line, party};
use cover_core::{CoverEffectId, CoverEffectSet, CoverMode, CoverSettings, HostEvent, UsePolicy};
use cover_runtime::{
    DocumentKind, Event, PrivilegedEvent, PrivilegedOperation, Runtime, RuntimeConfig, Topic,
};

#[tokio::test]
async fn failed_create_leaves_display_ahead_of_host() {
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            authoritative: false,
            ..config("pf2e")
        })
        .settings(CoverSettings::uniform(UsePolicy::Always, false))
        .cover_lines([line(ARCHER, GOBLIN, 0.5)])
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let mut privileged_rx = handle.subscribe(Topic::Privileged);
    runtime.proxy().unwrap().set_available(false);

    let report = handle
        .dispatch(HostEvent::SceneLoaded { tokens: party() })
        .await
        .unwrap();
    assert!(report.changed.contains(&(GOBLIN, CoverMode::CoverEffects)));
    assert!(report.failures.is_empty());
    handle.settle().await.unwrap();

    let snapshot = handle.query_state().await.unwrap();
    assert_eq!(
        snapshot.token(GOBLIN).unwrap().cover_effects,
        CoverEffectSet::from([CoverEffectId(2)])
    );
    assert!(runtime.document_host().unwrap().documents().await.unwrap().is_empty());

    let events = drain(&mut privileged_rx).await;
    assert!(events.iter().any(|event| matches!(
        event,
        Event::Privileged(PrivilegedEvent::OperationFailed {
            token,
            operation: PrivilegedOperation::Create,
            ..
        }) if *token == GOBLIN
    )));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn proxied_writes_use_system_storage() {
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            authoritative: false,
            ..config("sfrpg")
        })
        .settings(CoverSettings::uniform(UsePolicy::Always, false))
        .tokens(party())
        .cover_lines([line(ARCHER, GOBLIN, 0.3)])
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    handle.settle().await.unwrap();

    let documents = runtime.document_host().unwrap().documents().await.unwrap();
    assert_eq!(documents.len(), 1);
    let (_, data) = &documents[0];
    assert_eq!(data.kind, DocumentKind::Item);
    assert_eq!(data.item_type.as_deref(), Some("effect"));
    assert_eq!(data.name, "Partial Cover");
    assert!(data.backs(GOBLIN, CoverEffectId(1)));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn late_create_after_removal_is_discarded() {
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            host_latency: Duration::from_millis(40),
            ..config("dnd5e")
        })
        .settings(CoverSettings::uniform(UsePolicy::Always, false))
        .tokens(party())
        .cover_lines([line(ARCHER, GOBLIN, 0.6)])
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let mut privileged_rx = handle.subscribe(Topic::Privileged);

    handle
        .dispatch(HostEvent::TokenRemoved { token: GOBLIN })
        .await
        .unwrap();
    handle.settle().await.unwrap();

    assert!(runtime.document_host().unwrap().documents().await.unwrap().is_empty());
    let events = drain(&mut privileged_rx).await;
    assert!(events.iter().any(|event| matches!(
        event,
        Event::Privileged(PrivilegedEvent::ResultDiscarded { token, .. }) if *token == GOBLIN
    )));
    assert!(!events.iter().any(|event| matches!(
        event,
        Event::Privileged(PrivilegedEvent::DocumentCreated { .. })
    )));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn shutdown_waits_for_pending_writes() {
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            host_latency: Duration::from_millis(20),
            ..config("dnd5e")
        })
        .settings(CoverSettings::uniform(UsePolicy::Always, false))
        .tokens(party())
        .cover_lines([line(ARCHER, GOBLIN, 0.6)])
        .build()
        .await
        .unwrap();
    let mut privileged_rx = runtime.handle().subscribe(Topic::Privileged);

    runtime.shutdown().await.unwrap();

    assert!(matches!(
        privileged_rx.recv().await.unwrap(),
        Event::Privileged(PrivilegedEvent::DocumentCreated { token, .. }) if token == GOBLIN
    ));
}
