//! Replaying a RON scenario against a live runtime.
use cover_core::{CoverEffectId, CoverEffectSet, CoverTypeId, CoverTypeSet, TokenId};
use cover_runtime::{RuntimeConfig, Scenario, StepOutcome};

const SCENARIO: &str = r#"(
    system_id: Some("dnd5e"),
    settings: Some((
        cover_types: (use_policy: always),
        cover_effects: (use_policy: always),
    )),
    tokens: [
        (id: (1), name: "Archer", position: (x: 0, y: 0), controlled: true),
        (id: (2), name: "Goblin", position: (x: 4, y: 2)),
    ],
    lines: [(attacker: (1), defender: (2), percent: 0.6)],
    steps: [
        Query(defender: (2), attacker: (1)),
        Line((attacker: (1), defender: (2), percent: 0.8)),
        Host(token_moved(token: (2), position: (x: 5, y: 2))),
        Settle,
    ],
)"#;

#[tokio::test]
async fn replays_steps_in_order() {
    let scenario = Scenario::parse(SCENARIO).unwrap();
    let runtime = scenario
        .configure(RuntimeConfig::default())
        .build()
        .await
        .unwrap();

    let mut seen = 0;
    let outcomes = scenario.replay(&runtime, |_| seen += 1).await.unwrap();
    assert_eq!(seen, 4);
    assert_eq!(outcomes.len(), 4);

    match &outcomes[0] {
        StepOutcome::Cover { record, .. } => {
            assert_eq!(record.percent_cover, 0.6);
            assert_eq!(record.cover_types, CoverTypeSet::from([CoverTypeId(1)]));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    match &outcomes[2] {
        StepOutcome::Dispatched { event, report } => {
            assert_eq!(event, "token_moved");
            assert_eq!(report.changed.len(), 2);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    match &outcomes[3] {
        StepOutcome::Settled(snapshot) => {
            let goblin = snapshot.token(TokenId(2)).unwrap();
            assert_eq!(goblin.cover_types, CoverTypeSet::from([CoverTypeId(2)]));
            assert_eq!(goblin.cover_effects, CoverEffectSet::from([CoverEffectId(2)]));
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let documents = runtime.document_host().unwrap().documents().await.unwrap();
    assert_eq!(documents.len(), 1);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn outcomes_serialize_as_json() {
    let scenario = Scenario::parse(SCENARIO).unwrap();
    let runtime = scenario
        .configure(RuntimeConfig::default())
        .build()
        .await
        .unwrap();

    let outcomes = scenario.replay(&runtime, |_| {}).await.unwrap();
    let json = serde_json::to_string(&outcomes[2]).unwrap();
    assert!(json.contains("\"dispatched\""));
    assert!(json.contains("token_moved"));

    runtime.shutdown().await.unwrap();
}
