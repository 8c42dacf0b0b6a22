use prm_core::store::resolver::{RecordLocation, ResolveError};
use prm_core::{user_from_json, StoreError};
use serde_json::{json, Value};
use std::rc::Rc;

fn contact(name: &str, id: &str) -> Value {
    json!({
        "name": name,
        "phoneNumber": "",
        "address": "",
        "notes": [],
        "tags": [],
        "stableId": id,
    })
}

fn document(event_contacts: Value) -> Value {
    json!({
        "name": "Kim",
        "tags": { "club": { "name": "club", "color": "ff8800" } },
        "contacts": [0, 1, 2],
        "contactObjects": [
            contact("Ann", "6f1d2c3e-0000-4000-8000-000000000001"),
            contact("Bo", "6f1d2c3e-0000-4000-8000-000000000002"),
            contact("Cy", "6f1d2c3e-0000-4000-8000-000000000003"),
        ],
        "events": [{
            "name": "Dinner",
            "address": "",
            "dateTime": "2024-09-01T19:00:00",
            "description": "",
            "tag": "club",
            "contacts": event_contacts,
            "stableId": "6f1d2c3e-0000-4000-8000-0000000000e1",
        }],
        "uuid": "6f1d2c3e-0000-4000-8000-0000000000aa",
    })
}

fn resolve_error(document: Value) -> ResolveError {
    match user_from_json(&document.to_string()) {
        Err(StoreError::Resolve(err)) => err,
        other => panic!("expected resolve error, got {other:?}"),
    }
}

#[test]
fn well_formed_document_resolves() {
    let user = user_from_json(&document(json!([2, 0])).to_string()).unwrap();
    assert_eq!(user.contacts().len(), 3);

    let event = user.events().iter().next().unwrap();
    assert!(Rc::ptr_eq(&event.contacts()[0], user.contacts().get(2).unwrap()));
    assert!(Rc::ptr_eq(event.tag().unwrap(), &user.tag("club").unwrap()));
}

#[test]
fn event_contact_past_the_end_fails_the_load() {
    let err = resolve_error(document(json!([0, 5])));
    assert_eq!(
        err,
        ResolveError::DanglingContact {
            location: RecordLocation::Event(0),
            position: 5,
            resolved: 3,
        }
    );
}

#[test]
fn membership_past_the_end_fails_the_load() {
    let mut doc = document(json!([]));
    doc["contacts"] = json!([0, 3]);
    let err = resolve_error(doc);
    assert_eq!(
        err,
        ResolveError::DanglingContact {
            location: RecordLocation::Membership(1),
            position: 3,
            resolved: 3,
        }
    );
}

#[test]
fn unknown_tag_key_fails_the_load() {
    let mut doc = document(json!([]));
    doc["contactObjects"][1]["tags"] = json!(["chess"]);
    let err = resolve_error(doc);
    assert_eq!(
        err,
        ResolveError::DanglingTag {
            location: RecordLocation::Contact(1),
            key: "chess".to_string(),
        }
    );
}

#[test]
fn tag_key_must_match_its_name() {
    let mut doc = document(json!([]));
    doc["tags"] = json!({ "club": { "name": "society", "color": "ff8800" } });
    doc["events"][0]
        .as_object_mut()
        .unwrap()
        .remove("tag");
    let err = resolve_error(doc);
    assert!(matches!(err, ResolveError::KeyMismatch { .. }));
}

#[test]
fn repeated_stable_id_fails_the_load() {
    let mut doc = document(json!([]));
    doc["contactObjects"][2]["stableId"] = json!("6f1d2c3e-0000-4000-8000-000000000001");
    let err = resolve_error(doc);
    assert!(matches!(
        err,
        ResolveError::DuplicateStableId {
            location: RecordLocation::Contact(2),
            ..
        }
    ));
}

#[test]
fn invalid_color_fails_the_load() {
    let mut doc = document(json!([]));
    doc["tags"]["club"]["color"] = json!("orange");
    let err = resolve_error(doc);
    assert!(matches!(
        err,
        ResolveError::InvalidRecord {
            location: RecordLocation::Tag(_),
            ..
        }
    ));
}

#[test]
fn missing_optional_sections_default_to_empty() {
    let mut doc = document(json!([]));
    doc["events"][0].as_object_mut().unwrap().remove("contacts");
    doc["events"][0].as_object_mut().unwrap().remove("tag");
    doc["contactObjects"][0].as_object_mut().unwrap().remove("notes");

    let user = user_from_json(&doc.to_string()).unwrap();
    let event = user.events().iter().next().unwrap();
    assert!(event.contacts().is_empty());
    assert!(event.tag().is_none());
}

#[test]
fn wrong_field_type_is_malformed() {
    let mut doc = document(json!([]));
    doc["contacts"] = json!("all");
    let err = user_from_json(&doc.to_string()).unwrap_err();
    assert!(matches!(err, StoreError::Malformed(_)));
}
