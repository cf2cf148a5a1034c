use std::sync::Arc;
use std::time::Duration;

use remedy_core::flow::{current_selection, reset_selection, select_remedy};
use remedy_core::{
    cancel_pair, AddOutcome, AssemblyStatus, CancelToken, CatalogStore, CookingFlow,
    DirectorySource, FlowError, InMemorySelection, InMemorySource, MatchStage, RemedyConfig,
    ResolutionError,
};

const REMEDIES: &str = r#"{
    "remedies": [
        {
            "name": "Cold",
            "ingredients": ["Ginger", "Honey", "Tulsi"],
            "instructions": "Boil ginger and tulsi. Strain. Stir in honey.",
            "benefits": "Clears congestion."
        },
        {
            "name": "Sore Throat",
            "ingredients": ["Salt", "Warm Water"],
            "instructions": "Dissolve salt in warm water. Gargle.",
            "benefits": "Reduces swelling."
        },
        {
            "name": "Indigestion",
            "ingredients": ["Cumin", "Fennel"],
            "instructions": "Roast seeds. Chew after meals.",
            "benefits": "Aids digestion."
        }
    ]
}"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn quick_policy(max_attempts: u32) -> remedy_core::RetryPolicy {
    let json = serde_json::json!({
        "retry": { "max_attempts": max_attempts, "delay_ms": 200, "initial_delay_ms": 0 }
    });
    RemedyConfig::from_json_str(&json.to_string()).unwrap().retry
}

#[tokio::test(start_paused = true)]
async fn cooking_flow_from_directory_source() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("remedies.json"), REMEDIES).unwrap();

    let store = CatalogStore::open(Arc::new(DirectorySource::new(dir.path())), "remedies");
    assert_eq!(
        store.current().unwrap().names(),
        vec!["Cold", "Sore Throat", "Indigestion"]
    );

    let selection = InMemorySelection::new();
    select_remedy(&selection, "sore-throat").unwrap();

    let mut flow = CookingFlow::start(&store, &selection, &quick_policy(3), &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(flow.remedy().name, "Sore Throat");
    assert!(matches!(flow.match_stage(), MatchStage::Variant(_)));

    assert_eq!(
        flow.add_ingredient("Salt").unwrap(),
        AddOutcome::Added(AssemblyStatus::InProgress)
    );
    assert_eq!(
        flow.add_ingredient("Salt").unwrap(),
        AddOutcome::Duplicate(AssemblyStatus::InProgress)
    );
    assert_eq!(
        flow.add_ingredient("Warm Water").unwrap(),
        AddOutcome::Added(AssemblyStatus::ReadyToMix)
    );
    assert_eq!(flow.mix().unwrap(), AssemblyStatus::Mixed);
    assert!(flow.session().mixed_at().is_some());
}

#[tokio::test(start_paused = true)]
async fn consumer_started_before_data_exists_waits_for_it() {
    init_tracing();
    let source = Arc::new(InMemorySource::new());
    let store = Arc::new(CatalogStore::new(source.clone(), "remedies"));

    let consumer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            CookingFlow::for_query(&store, "indigestion", &quick_policy(5), &CancelToken::never())
                .await
        })
    };

    // Data lands between the second and third attempts (t=200 and t=400).
    tokio::time::sleep(Duration::from_millis(300)).await;
    source.put("remedies", REMEDIES).unwrap();

    let flow = consumer.await.unwrap().unwrap();
    assert_eq!(flow.remedy().name, "Indigestion");
    assert_eq!(flow.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn recreated_store_serves_new_consumers() {
    init_tracing();
    let source = Arc::new(InMemorySource::with_document("remedies", REMEDIES));
    let selection = InMemorySelection::new();
    select_remedy(&selection, "Cold").unwrap();

    // First page owns a store, then is torn down.
    {
        let store = CatalogStore::open(source.clone(), "remedies");
        let flow = CookingFlow::start(&store, &selection, &quick_policy(2), &CancelToken::never())
            .await
            .unwrap();
        assert_eq!(flow.status(), AssemblyStatus::Idle);
    }

    // The next page builds a fresh, unloaded store.
    let store = CatalogStore::new(source, "remedies");
    let mut flow = CookingFlow::start(&store, &selection, &quick_policy(2), &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(flow.attempts(), 1);

    flow.add_ingredient("Ginger").unwrap();
    flow.add_ingredient("Pepper").unwrap();
    flow.add_ingredient("Honey").unwrap();
    assert_eq!(flow.session().progress(), (3, 3));
    assert_eq!(flow.status(), AssemblyStatus::InProgress);
    assert_eq!(flow.session().missing(), vec!["Tulsi"]);
    assert!(!flow.can_mix());
    assert!(flow.mix().is_err());
}

#[tokio::test(start_paused = true)]
async fn leaving_the_page_cancels_resolution() {
    init_tracing();
    let store = Arc::new(CatalogStore::new(Arc::new(InMemorySource::new()), "remedies"));
    let (handle, token) = cancel_pair();

    let consumer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            CookingFlow::for_query(&store, "Cold", &quick_policy(50), &token).await
        })
    };

    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.cancel();

    let err = consumer.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        FlowError::Resolution(ResolutionError::Cancelled { attempts_tried, .. })
            if attempts_tried < 50
    ));
}

#[tokio::test(start_paused = true)]
async fn reset_returns_to_selection_screen() {
    init_tracing();
    let store = CatalogStore::open(
        Arc::new(InMemorySource::with_document("remedies", REMEDIES)),
        "remedies",
    );
    let selection = InMemorySelection::new();
    select_remedy(&selection, "Cold").unwrap();

    reset_selection(&selection, &store).unwrap();
    assert!(current_selection(&selection).unwrap().is_none());

    let err = CookingFlow::start(&store, &selection, &quick_policy(2), &CancelToken::never())
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::NoSelection);
}
