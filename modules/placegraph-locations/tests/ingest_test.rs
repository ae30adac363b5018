//! Deterministic pipeline tests: MockGeocoder + MockLocationStore, no network, no database.

use std::sync::Arc;

use mapbox_client::{Feature, GeocodeResponse};
use placegraph_common::{Coordinates, Language};
use placegraph_locations::testing::{feature, response, MockGeocoder, MockLocationStore, StoreOp};
use placegraph_locations::{IngestError, IngestOutcome, IngestStage, LocationIngestor};

const USER: &str = "user-1";

fn ingestor(geocoder: &Arc<MockGeocoder>, store: &Arc<MockLocationStore>) -> LocationIngestor {
    LocationIngestor::new(geocoder.clone(), store.clone())
}

/// Munich, with Bavaria and Germany as containers.
fn munich() -> Feature {
    Feature {
        matching_place_name: Some("Munich".to_string()),
        text_de: Some("München".to_string()),
        center: Some(vec![11.57, 48.13]),
        context: vec![
            feature("region.20", "Bavaria"),
            feature("country.30", "Germany"),
        ],
        ..feature("place.10", "Munich")
    }
}

fn paris() -> Feature {
    Feature {
        context: vec![feature("country.31", "France")],
        ..feature("place.11", "Paris")
    }
}

fn resolved(outcome: IngestOutcome) -> placegraph_locations::ResolvedLocation {
    match outcome {
        IngestOutcome::Resolved(r) => r,
        IngestOutcome::Skipped => panic!("expected a resolved location"),
    }
}

#[tokio::test]
async fn empty_name_is_a_no_op() {
    let geocoder = Arc::new(MockGeocoder::new());
    let store = Arc::new(MockLocationStore::new().with_user(USER));

    let outcome = ingestor(&geocoder, &store)
        .resolve_and_bind_location(USER, "")
        .await
        .unwrap();

    assert_eq!(outcome, IngestOutcome::Skipped);
    assert!(geocoder.calls().is_empty(), "no outbound call expected");
    assert!(store.ops().is_empty(), "no graph mutation expected");
}

#[tokio::test]
async fn whitespace_name_is_a_no_op() {
    let geocoder = Arc::new(MockGeocoder::new());
    let store = Arc::new(MockLocationStore::new().with_user(USER));

    let outcome = ingestor(&geocoder, &store)
        .resolve_and_bind_location(USER, "  \t")
        .await
        .unwrap();

    assert_eq!(outcome, IngestOutcome::Skipped);
    assert!(geocoder.calls().is_empty());
}

#[tokio::test]
async fn overlong_name_is_rejected_without_lookup() {
    let geocoder = Arc::new(MockGeocoder::new());
    let store = Arc::new(MockLocationStore::new().with_user(USER));
    let name = "x".repeat(201);

    let err = ingestor(&geocoder, &store)
        .resolve_and_bind_location(USER, &name)
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::InvalidLocation));
    assert!(geocoder.calls().is_empty());
}

#[tokio::test]
async fn name_limit_counts_characters_not_bytes() {
    // 200 two-byte characters: at the limit, so the lookup goes ahead.
    let name = "ü".repeat(200);
    let geocoder = Arc::new(
        MockGeocoder::new().on_name(&name, response(vec![feature("place.5", "Ü")])),
    );
    let store = Arc::new(MockLocationStore::new().with_user(USER));

    let outcome = ingestor(&geocoder, &store)
        .resolve_and_bind_location(USER, &name)
        .await
        .unwrap();

    assert_eq!(resolved(outcome).location_id, "place.5");
    assert_eq!(geocoder.calls(), vec![name]);
}

#[tokio::test]
async fn empty_candidate_list_is_invalid_and_keeps_old_binding() {
    let geocoder = Arc::new(
        MockGeocoder::new()
            .on_name("Munich", response(vec![munich()]))
            .on_name("Nowhere", GeocodeResponse::default()),
    );
    let store = Arc::new(MockLocationStore::new().with_user(USER));
    let ingestor = ingestor(&geocoder, &store);

    ingestor.resolve_and_bind_location(USER, "Munich").await.unwrap();
    let ops_before = store.ops().len();

    let err = ingestor
        .resolve_and_bind_location(USER, "Nowhere")
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::InvalidLocation));
    assert_eq!(err.stage(), IngestStage::Select);
    assert_eq!(err.user_message(), "locationName is invalid");
    assert_eq!(store.ops().len(), ops_before, "nothing written for invalid input");
    assert_eq!(store.binding_of(USER).as_deref(), Some("place.10"));
}

#[tokio::test]
async fn resolves_upserts_links_and_binds() {
    let geocoder = Arc::new(MockGeocoder::new().on_name("Munich", response(vec![munich()])));
    let store = Arc::new(MockLocationStore::new().with_user(USER));

    let outcome = ingestor(&geocoder, &store)
        .resolve_and_bind_location(USER, "Munich")
        .await
        .unwrap();

    let r = resolved(outcome);
    assert_eq!(r.location_id, "place.10");
    assert_eq!(r.ancestors, vec!["region.20", "country.30"]);
    assert!(r.bound);

    let stored = store.location("place.10").unwrap();
    assert_eq!(stored.location_type, "place");
    assert_eq!(stored.name(), Some("Munich"));
    assert_eq!(stored.names.get(Language::De), Some("München"));
    assert_eq!(stored.coordinates, Some(Coordinates { lng: 11.57, lat: 48.13 }));
    assert_eq!(store.location("country.30").unwrap().location_type, "country");
    assert_eq!(store.binding_of(USER).as_deref(), Some("place.10"));
}

#[tokio::test]
async fn hierarchy_links_in_provider_order() {
    let candidate = Feature {
        context: vec![
            feature("place.A", "A"),
            feature("region.B", "B"),
            feature("country.C", "C"),
        ],
        ..feature("place.X", "X")
    };
    let geocoder = Arc::new(MockGeocoder::new().on_name("X", response(vec![candidate])));
    let store = Arc::new(MockLocationStore::new().with_user(USER));

    ingestor(&geocoder, &store)
        .resolve_and_bind_location(USER, "X")
        .await
        .unwrap();

    let pair = |a: &str, b: &str| (a.to_string(), b.to_string());
    assert_eq!(
        store.containment_ops(),
        vec![
            pair("place.X", "place.A"),
            pair("place.A", "region.B"),
            pair("region.B", "country.C"),
        ]
    );

    // Every container is written before the edge that needs it, and the bind comes last.
    let s = |v: &str| v.to_string();
    assert_eq!(
        store.ops(),
        vec![
            StoreOp::Upsert(s("place.X")),
            StoreOp::Upsert(s("place.A")),
            StoreOp::Contain { child: s("place.X"), container: s("place.A") },
            StoreOp::Upsert(s("region.B")),
            StoreOp::Contain { child: s("place.A"), container: s("region.B") },
            StoreOp::Upsert(s("country.C")),
            StoreOp::Contain { child: s("region.B"), container: s("country.C") },
            StoreOp::Rebind { user: s(USER), location: s("place.X") },
        ]
    );
}

#[tokio::test]
async fn candidate_without_context_creates_no_edges() {
    let geocoder = Arc::new(
        MockGeocoder::new().on_name("Germany", response(vec![feature("country.30", "Germany")])),
    );
    let store = Arc::new(MockLocationStore::new().with_user(USER));

    let r = resolved(
        ingestor(&geocoder, &store)
            .resolve_and_bind_location(USER, "Germany")
            .await
            .unwrap(),
    );

    assert!(r.ancestors.is_empty());
    assert!(store.containment_edges().is_empty());
    assert_eq!(store.binding_of(USER).as_deref(), Some("country.30"));
}

#[tokio::test]
async fn multi_type_match_is_stored_and_bound_as_region() {
    let candidate = Feature {
        place_type: vec!["region".to_string(), "place".to_string()],
        context: vec![feature("country.1", "Singapore")],
        ..feature("place.55", "Singapore")
    };
    let geocoder = Arc::new(MockGeocoder::new().on_name("Singapore", response(vec![candidate])));
    let store = Arc::new(MockLocationStore::new().with_user(USER));

    let r = resolved(
        ingestor(&geocoder, &store)
            .resolve_and_bind_location(USER, "Singapore")
            .await
            .unwrap(),
    );

    assert_eq!(r.location_id, "region.55");
    assert!(store.location("place.55").is_none());
    assert_eq!(store.location("region.55").unwrap().location_type, "region");
    assert_eq!(
        store.containment_edges(),
        vec![("region.55".to_string(), "country.1".to_string())]
    );
    assert_eq!(store.binding_of(USER).as_deref(), Some("region.55"));
}

#[tokio::test]
async fn exact_match_beats_rank() {
    let geocoder = Arc::new(MockGeocoder::new().on_name(
        "Berlin",
        response(vec![
            feature("region.2", "Berlin (state)"),
            Feature {
                matching_place_name: Some("Berlin".to_string()),
                ..feature("place.1", "Berlin")
            },
        ]),
    ));
    let store = Arc::new(MockLocationStore::new().with_user(USER));

    let r = resolved(
        ingestor(&geocoder, &store)
            .resolve_and_bind_location(USER, "Berlin")
            .await
            .unwrap(),
    );
    assert_eq!(r.location_id, "place.1");
}

#[tokio::test]
async fn reingesting_is_idempotent() {
    let geocoder = Arc::new(MockGeocoder::new().on_name("Munich", response(vec![munich()])));
    let store = Arc::new(MockLocationStore::new().with_user(USER));
    let ingestor = ingestor(&geocoder, &store);

    ingestor.resolve_and_bind_location(USER, "Munich").await.unwrap();
    let first = store.location("place.10").unwrap();
    let edges = store.containment_edges();

    ingestor.resolve_and_bind_location(USER, "Munich").await.unwrap();

    assert_eq!(store.location_count(), 3);
    assert_eq!(store.location("place.10").unwrap(), first);
    assert_eq!(store.containment_edges(), edges);
    assert_eq!(store.binding_count(USER), 1);
}

#[tokio::test]
async fn concurrent_ingestions_of_same_place_converge() {
    let geocoder = Arc::new(MockGeocoder::new().on_name("Munich", response(vec![munich()])));
    let store = Arc::new(
        MockLocationStore::new()
            .with_user("user-a")
            .with_user("user-b"),
    );
    let ingestor = Arc::new(ingestor(&geocoder, &store));

    let a = tokio::spawn({
        let ingestor = ingestor.clone();
        async move { ingestor.resolve_and_bind_location("user-a", "Munich").await }
    });
    let b = tokio::spawn({
        let ingestor = ingestor.clone();
        async move { ingestor.resolve_and_bind_location("user-b", "Munich").await }
    });
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(store.location_count(), 3);
    assert_eq!(store.containment_edges().len(), 2);
    assert_eq!(store.binding_of("user-a").as_deref(), Some("place.10"));
    assert_eq!(store.binding_of("user-b").as_deref(), Some("place.10"));
}

#[tokio::test]
async fn second_ingestion_replaces_binding() {
    let geocoder = Arc::new(
        MockGeocoder::new()
            .on_name("Munich", response(vec![munich()]))
            .on_name("Paris", response(vec![paris()])),
    );
    let store = Arc::new(MockLocationStore::new().with_user(USER));
    let ingestor = ingestor(&geocoder, &store);

    ingestor.resolve_and_bind_location(USER, "Munich").await.unwrap();
    ingestor.resolve_and_bind_location(USER, "Paris").await.unwrap();

    assert_eq!(store.binding_count(USER), 1);
    assert_eq!(store.binding_of(USER).as_deref(), Some("place.11"));
}

#[tokio::test]
async fn missing_center_keeps_stored_coordinates() {
    let without_center = Feature {
        center: None,
        ..munich()
    };
    let geocoder = Arc::new(
        MockGeocoder::new()
            .on_name("Munich", response(vec![munich()]))
            .on_name("München", response(vec![without_center])),
    );
    let store = Arc::new(MockLocationStore::new().with_user(USER));
    let ingestor = ingestor(&geocoder, &store);

    ingestor.resolve_and_bind_location(USER, "Munich").await.unwrap();
    ingestor.resolve_and_bind_location(USER, "München").await.unwrap();

    assert_eq!(
        store.location("place.10").unwrap().coordinates,
        Some(Coordinates { lng: 11.57, lat: 48.13 })
    );
}

#[tokio::test]
async fn unknown_user_binds_nothing() {
    let geocoder = Arc::new(MockGeocoder::new().on_name("Munich", response(vec![munich()])));
    let store = Arc::new(MockLocationStore::new());

    let r = resolved(
        ingestor(&geocoder, &store)
            .resolve_and_bind_location("ghost", "Munich")
            .await
            .unwrap(),
    );

    assert!(!r.bound);
    assert!(store.location("place.10").is_some());
    assert_eq!(store.binding_count("ghost"), 0);
}

#[tokio::test]
async fn transport_failure_propagates_before_any_write() {
    let geocoder = Arc::new(MockGeocoder::new().failing_on("Munich", "connection refused"));
    let store = Arc::new(MockLocationStore::new().with_user(USER));

    let err = ingestor(&geocoder, &store)
        .resolve_and_bind_location(USER, "Munich")
        .await
        .unwrap_err();

    assert_eq!(err.stage(), IngestStage::Geocode);
    assert!(err.to_string().contains("connection refused"));
    assert!(store.ops().is_empty());
}

#[tokio::test]
async fn upsert_failure_stops_before_hierarchy_and_bind() {
    let geocoder = Arc::new(
        MockGeocoder::new()
            .on_name("Paris", response(vec![paris()]))
            .on_name("Munich", response(vec![munich()])),
    );
    let store = Arc::new(
        MockLocationStore::new()
            .with_user(USER)
            .failing_upsert_of("place.10"),
    );
    let ingestor = ingestor(&geocoder, &store);

    ingestor.resolve_and_bind_location(USER, "Paris").await.unwrap();
    let err = ingestor
        .resolve_and_bind_location(USER, "Munich")
        .await
        .unwrap_err();

    assert_eq!(err.stage(), IngestStage::Upsert);
    assert!(store.location("region.20").is_none());
    assert_eq!(store.binding_of(USER).as_deref(), Some("place.11"));
}

#[tokio::test]
async fn hierarchy_failure_aborts_rest_of_chain() {
    let geocoder = Arc::new(MockGeocoder::new().on_name("Munich", response(vec![munich()])));
    let store = Arc::new(
        MockLocationStore::new()
            .with_user(USER)
            .failing_containment_of("region.20"),
    );

    let err = ingestor(&geocoder, &store)
        .resolve_and_bind_location(USER, "Munich")
        .await
        .unwrap_err();

    match &err {
        IngestError::Hierarchy {
            child_id,
            container_id,
            ..
        } => {
            assert_eq!(child_id, "region.20");
            assert_eq!(container_id, "country.30");
        }
        other => panic!("expected hierarchy error, got {other:?}"),
    }

    // The first link and both upserts before the failure stay committed.
    assert_eq!(
        store.containment_edges(),
        vec![("place.10".to_string(), "region.20".to_string())]
    );
    assert!(store.location("country.30").is_some());
    assert_eq!(store.binding_of(USER), None);
}

#[tokio::test]
async fn bind_failure_can_be_retried_alone() {
    let geocoder = Arc::new(MockGeocoder::new().on_name("Munich", response(vec![munich()])));
    let store = Arc::new(MockLocationStore::new().with_user(USER).failing_rebinds());
    let ingestor = ingestor(&geocoder, &store);

    let err = ingestor
        .resolve_and_bind_location(USER, "Munich")
        .await
        .unwrap_err();

    let location_id = match &err {
        IngestError::Bind { location_id, .. } => location_id.clone(),
        other => panic!("expected bind error, got {other:?}"),
    };
    assert_eq!(store.location_count(), 3, "hierarchy stays committed");
    assert_eq!(store.binding_of(USER), None);

    store.heal();
    assert!(ingestor.rebind(USER, &location_id).await.unwrap());
    assert_eq!(store.binding_of(USER).as_deref(), Some("place.10"));
    assert_eq!(geocoder.calls().len(), 1, "retrying the bind needs no new lookup");
}
