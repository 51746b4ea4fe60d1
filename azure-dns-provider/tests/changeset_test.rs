//! Changeset ordering and failure behaviour against the in-memory API.

mod common;

use azure_dns_provider::{ApiError, ProviderError, RrsType, WriteCondition};
use common::{Call, recorded_zone};

fn write(relative_name: &str, record_type: RrsType, condition: WriteCondition) -> Call {
    Call::WriteRecordSet {
        zone_name: "example.com".to_string(),
        relative_name: relative_name.to_string(),
        record_type,
        condition,
    }
}

fn delete(relative_name: &str, record_type: RrsType) -> Call {
    Call::DeleteRecordSet {
        zone_name: "example.com".to_string(),
        relative_name: relative_name.to_string(),
        record_type,
        if_match: String::new(),
    }
}

// ============ Ordering ============

#[tokio::test]
async fn apply_runs_removals_then_upserts_then_additions() {
    let (zone, api) = recorded_zone("example.com").await;
    let rrsets = zone.resource_record_sets();

    let x = require_ok!(rrsets.new_record_set("x.example.com", ["192.0.2.1"], 60, RrsType::A));
    let y = require_ok!(rrsets.new_record_set("y.example.com", ["192.0.2.2"], 60, RrsType::A));
    let z = require_ok!(rrsets.new_record_set("z.example.com", ["2001:db8::1"], 60, RrsType::Aaaa));

    require_ok!(
        rrsets
            .start_changeset()
            .add(x)
            .remove(y)
            .upsert(z)
            .apply()
            .await
    );

    assert_eq!(
        api.calls().await,
        vec![
            delete("y", RrsType::A),
            write("z", RrsType::Aaaa, WriteCondition::unconditional()),
            write("x", RrsType::A, WriteCondition::only_if_absent()),
        ]
    );
}

#[tokio::test]
async fn each_list_keeps_caller_order() {
    let (zone, api) = recorded_zone("example.com").await;
    let rrsets = zone.resource_record_sets();

    let mut changeset = rrsets.start_changeset();
    for name in ["c", "a", "b"] {
        let rrset = require_ok!(rrsets.new_record_set(
            &format!("{name}.example.com"),
            ["192.0.2.1"],
            300,
            RrsType::A
        ));
        changeset = changeset.add(rrset);
    }
    require_ok!(changeset.apply().await);

    let names: Vec<String> = api
        .calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            Call::WriteRecordSet { relative_name, .. } => Some(relative_name),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

// ============ Failure ============

#[tokio::test]
async fn second_addition_failure_stops_the_batch() {
    let (zone, api) = recorded_zone("example.com").await;
    let rrsets = zone.resource_record_sets();
    let injected = ApiError::Status {
        status: 500,
        error_code: Some("InternalServerError".to_string()),
        message: "boom".to_string(),
    };
    api.fail_record_set("two", injected.clone()).await;

    let mut changeset = rrsets.start_changeset();
    for name in ["one", "two", "three"] {
        let rrset = require_ok!(rrsets.new_record_set(
            &format!("{name}.example.com"),
            ["192.0.2.1"],
            300,
            RrsType::A
        ));
        changeset = changeset.add(rrset);
    }

    let err = changeset.apply().await.unwrap_err();
    assert!(matches!(err, ProviderError::RemoteWrite { .. }), "{err:?}");
    assert_eq!(err.api_error(), Some(&injected));

    let calls = api.calls().await;
    assert_eq!(calls.len(), 2, "third addition must not be attempted");
    assert_eq!(
        calls[1],
        write("two", RrsType::A, WriteCondition::only_if_absent())
    );

    // the first addition stays applied
    assert!(api.inner.record_set("example.com", "one", RrsType::A).await.is_some());
    assert!(api.inner.record_set("example.com", "three", RrsType::A).await.is_none());
}

#[tokio::test]
async fn failed_removal_skips_upserts_and_additions() {
    let (zone, api) = recorded_zone("example.com").await;
    let rrsets = zone.resource_record_sets();
    api.fail_record_set(
        "old",
        ApiError::Unauthorized {
            status: 403,
            message: "AuthorizationFailed".to_string(),
        },
    )
    .await;

    let old = require_ok!(rrsets.new_record_set("old.example.com", ["192.0.2.1"], 60, RrsType::A));
    let new = require_ok!(rrsets.new_record_set("new.example.com", ["192.0.2.2"], 60, RrsType::A));

    let err = rrsets
        .start_changeset()
        .remove(old)
        .upsert(new.clone())
        .add(new)
        .apply()
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RemoteDelete { .. }));
    assert!(!err.is_expected());
    assert_eq!(api.calls().await, vec![delete("old", RrsType::A)]);
}

#[tokio::test]
async fn duplicate_add_is_precondition_failed() {
    let (zone, _api) = recorded_zone("example.com").await;
    let rrsets = zone.resource_record_sets();
    let www = require_ok!(rrsets.new_record_set("www.example.com", ["203.0.113.5"], 300, RrsType::A));

    require_ok!(rrsets.start_changeset().add(www.clone()).apply().await);
    let err = rrsets.start_changeset().add(www).apply().await.unwrap_err();

    assert!(matches!(err, ProviderError::PreconditionFailed { .. }), "{err:?}");
    assert!(err.is_expected());
}

#[tokio::test]
async fn unsupported_listed_record_fails_before_any_call() {
    let (zone, api) = recorded_zone("example.com").await;
    assert!(
        api.inner
            .seed_record_set("example.com", "@", "NS", Default::default())
            .await
    );
    let rrsets = zone.resource_record_sets();
    let listed = require_ok!(rrsets.list().await);
    let ns = require_some!(listed.into_iter().next());
    api.clear_calls().await;

    let err = rrsets.start_changeset().upsert(ns).apply().await.unwrap_err();
    assert!(matches!(err, ProviderError::UnsupportedRecordType { .. }));
    assert!(api.calls().await.is_empty());
}

// ============ Upsert semantics ============

#[tokio::test]
async fn upsert_creates_then_replaces() {
    let (zone, api) = recorded_zone("example.com").await;
    let rrsets = zone.resource_record_sets();

    let first = require_ok!(rrsets.new_record_set("api.example.com", ["192.0.2.1"], 60, RrsType::A));
    require_ok!(rrsets.start_changeset().upsert(first).apply().await);

    let second = require_ok!(rrsets.new_record_set(
        "api.example.com",
        ["192.0.2.7", "192.0.2.8"],
        120,
        RrsType::A
    ));
    require_ok!(rrsets.start_changeset().upsert(second).apply().await);

    let found = require_ok!(rrsets.get("api.example.com").await);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].ttl(), 120);
    assert_eq!(
        require_ok!(found[0].rrdatas()),
        vec!["192.0.2.7".to_string(), "192.0.2.8".to_string()]
    );
    assert_eq!(api.inner.record_set_count("example.com").await, 1);
}

#[tokio::test]
async fn replace_via_remove_and_add() {
    let (zone, _api) = recorded_zone("example.com").await;
    let rrsets = zone.resource_record_sets();

    let v1 = require_ok!(rrsets.new_record_set(
        "alias.example.com",
        ["old-target.example.net"],
        300,
        RrsType::Cname
    ));
    require_ok!(rrsets.start_changeset().add(v1.clone()).apply().await);

    let v2 = require_ok!(rrsets.new_record_set(
        "alias.example.com",
        ["new-target.example.net"],
        300,
        RrsType::Cname
    ));
    require_ok!(rrsets.start_changeset().remove(v1).add(v2).apply().await);

    let found = require_ok!(rrsets.get("alias.example.com").await);
    assert_eq!(found.len(), 1);
    assert_eq!(
        require_ok!(found[0].rrdatas()),
        vec!["new-target.example.net".to_string()]
    );
}

#[tokio::test]
async fn removing_missing_record_set_succeeds() {
    let (zone, _api) = recorded_zone("example.com").await;
    let rrsets = zone.resource_record_sets();
    let ghost = require_ok!(rrsets.new_record_set("ghost.example.com", ["192.0.2.9"], 60, RrsType::A));
    require_ok!(rrsets.start_changeset().remove(ghost).apply().await);
}
