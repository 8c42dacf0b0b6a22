use chrono::{NaiveDate, NaiveDateTime};
use prm_core::model::notes::Note;
use prm_core::store::flatten::{flatten_user, FlattenError};
use prm_core::{DocumentStore, Event, StoreConfig, StoreError, User, UserError};
use std::rc::Rc;

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, day)
        .unwrap()
        .and_hms_opt(hour, 30, 0)
        .unwrap()
}

/// Two listed contacts, one event-only contact, three events sharing Ann.
fn sample_user() -> User {
    let mut user = User::new("Kim");
    let friends = user.create_tag("friends").unwrap();
    let work = user.create_tag("work").unwrap();
    user.set_tag_color("work", "1e88e5").unwrap();

    let ann = user.contacts_mut().add_contact("Ann").unwrap();
    {
        let mut ann = ann.borrow_mut();
        ann.set_phone_number("555-0101");
        ann.set_address("1 Main St");
        ann.add_tag(Rc::clone(&friends));
        ann.add_tag(Rc::clone(&work));
        ann.notes_mut().insert(Note::created_at(at(2, 9), "met at conference"));
        ann.notes_mut().insert(Note::created_at(at(1, 9), "intro by Bo"));
    }
    let bo = user.contacts_mut().add_contact("Bo").unwrap();
    let cy = prm_core::Contact::new("Cy").unwrap().into_ref();

    for (index, name) in ["Lunch", "Standup", "Party"].into_iter().enumerate() {
        let mut event = Event::new(name, at(10 + index as u32, 12));
        event.add_contact(Rc::clone(&ann));
        if name == "Party" {
            event.set_tag(Rc::clone(&friends));
            event.add_contact(Rc::clone(&cy));
            event.add_contact(Rc::clone(&bo));
        }
        user.events_mut().add(event).unwrap();
    }
    user
}

#[test]
fn save_then_load_preserves_the_graph() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().join("user.json"));
    let original = sample_user();

    store.save(&original).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded.snapshot(), original.snapshot());
    assert_eq!(loaded.id(), original.id());
    assert!(!dir.path().join("user.json.tmp").exists());
}

#[test]
fn contact_shared_by_events_loads_as_one_instance() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().join("user.json"));
    store.save(&sample_user()).unwrap();

    let loaded = store.load().unwrap();
    let ann = loaded.contacts().get(0).unwrap();
    let holders: Vec<_> = loaded
        .events()
        .iter()
        .map(|event| Rc::clone(&event.contacts()[0]))
        .collect();
    assert_eq!(holders.len(), 3);
    assert!(holders.iter().all(|held| Rc::ptr_eq(held, ann)));
    assert_eq!(loaded.contact_events(ann).len(), 3);

    ann.borrow_mut().set_phone_number("555-9999");
    for event in loaded.events().iter() {
        assert_eq!(event.contacts()[0].borrow().phone_number(), "555-9999");
    }
}

#[test]
fn tags_are_shared_between_contacts_and_events_after_load() {
    let store_dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(store_dir.path().join("user.json"));
    store.save(&sample_user()).unwrap();

    let mut loaded = store.load().unwrap();
    let friends = loaded.tag("friends").unwrap();
    let ann = loaded.contacts().get(0).cloned().unwrap();
    assert!(Rc::ptr_eq(&ann.borrow().tags()[0], &friends));
    let party = loaded
        .events()
        .iter()
        .find(|event| event.name() == "Party")
        .unwrap();
    assert!(Rc::ptr_eq(party.tag().unwrap(), &friends));

    loaded.rename_tag("friends", "pals").unwrap();
    assert_eq!(ann.borrow().tags()[0].borrow().name(), "pals");
}

#[test]
fn every_contact_is_written_once_in_first_encounter_order() {
    let user = sample_user();
    let record = flatten_user(&user).unwrap();

    let names: Vec<&str> = record
        .contact_objects
        .iter()
        .map(|contact| contact.name.as_str())
        .collect();
    assert_eq!(names, vec!["Ann", "Bo", "Cy"]);
    assert_eq!(record.contacts, vec![0, 1]);
    assert_eq!(record.events[2].contacts, vec![0, 2, 1]);
    assert_eq!(record.events[0].tag, None);
    assert_eq!(record.events[2].tag.as_deref(), Some("friends"));
}

#[test]
fn event_only_contact_is_not_listed_after_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().join("user.json"));
    store.save(&sample_user()).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.contacts().len(), 2);
    let party = loaded
        .events()
        .iter()
        .find(|event| event.name() == "Party")
        .unwrap();
    let cy = &party.contacts()[1];
    assert_eq!(cy.borrow().name(), "Cy");
    assert!(!loaded.contacts().contains(cy));
}

#[test]
fn stable_ids_survive_repeated_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().join("user.json"));
    let original = sample_user();
    let ids: Vec<_> = original
        .contacts()
        .iter()
        .map(|contact| contact.borrow().id())
        .collect();

    store.save(&original).unwrap();
    let first = store.load().unwrap();
    store.save(&first).unwrap();
    let second = store.load().unwrap();

    let reloaded: Vec<_> = second
        .contacts()
        .iter()
        .map(|contact| contact.borrow().id())
        .collect();
    assert_eq!(reloaded, ids);
    assert_eq!(second.snapshot(), original.snapshot());
}

#[test]
fn notes_come_back_in_creation_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().join("user.json"));
    store.save(&sample_user()).unwrap();

    let loaded = store.load().unwrap();
    let ann = loaded.contacts().get(0).unwrap().borrow();
    let texts: Vec<&str> = ann.notes().iter().map(Note::text).collect();
    assert_eq!(texts, vec!["intro by Bo", "met at conference"]);
}

#[test]
fn failed_save_leaves_previous_document_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.json");
    let store = DocumentStore::new(&path);
    store.save(&sample_user()).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let broken = sample_user();
    let stray = broken.contacts().get(0).cloned().unwrap();
    let foreign = User::new("other").create_tag("stray").unwrap();
    stray.borrow_mut().add_tag(foreign);

    assert!(store.save(&broken).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn load_or_create_starts_fresh_without_a_document() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::from_data_dir(dir.path());
    let store = config.document_store();

    let user = store.load_or_create("Kim").unwrap();
    assert_eq!(user.name(), "Kim");
    assert!(user.contacts().is_empty());
    assert!(!store.exists());

    store.save(&user).unwrap();
    assert!(store.exists());
    assert_eq!(store.load_or_create("ignored").unwrap().id(), user.id());
}

fn round_trip(user: &User) -> User {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().join("user.json"));
    store.save(user).unwrap();
    store.load().unwrap()
}

#[test]
fn graph_without_tags_round_trips() {
    let mut user = User::new("Kim");
    let ann = user.contacts_mut().add_contact("Ann").unwrap();
    let mut event = Event::new("Walk", at(3, 7));
    event.add_contact(Rc::clone(&ann));
    user.events_mut().add(event).unwrap();

    let loaded = round_trip(&user);
    assert!(loaded.tag_handler().is_empty());
    assert_eq!(loaded.snapshot(), user.snapshot());
    let event = loaded.events().iter().next().unwrap();
    assert!(event.tag().is_none());
    assert!(Rc::ptr_eq(&event.contacts()[0], loaded.contacts().get(0).unwrap()));
}

#[test]
fn event_without_contacts_round_trips() {
    let mut user = User::new("Kim");
    let solo = user.create_tag("solo").unwrap();
    let mut event = Event::new("Reading", at(4, 21));
    event.set_description("alone");
    event.set_tag(solo);
    user.events_mut().add(event).unwrap();

    let loaded = round_trip(&user);
    assert!(loaded.contacts().is_empty());
    let event = loaded.events().iter().next().unwrap();
    assert!(event.contacts().is_empty());
    assert_eq!(event.description(), "alone");
    assert!(Rc::ptr_eq(event.tag().unwrap(), &loaded.tag("solo").unwrap()));
}

#[test]
fn contact_holding_every_tag_round_trips() {
    let mut user = User::new("Kim");
    let names = ["alpha", "beta", "gamma", "delta"];
    let ann = user.contacts_mut().add_contact("Ann").unwrap();
    let bo = user.contacts_mut().add_contact("Bo").unwrap();
    for name in names {
        let tag = user.create_tag(name).unwrap();
        ann.borrow_mut().add_tag(Rc::clone(&tag));
    }
    bo.borrow_mut().add_tag(user.tag("gamma").unwrap());

    let loaded = round_trip(&user);
    assert_eq!(loaded.snapshot(), user.snapshot());
    let ann = loaded.contacts().get(0).unwrap().borrow();
    assert_eq!(ann.tags().len(), names.len());
    for (held, name) in ann.tags().iter().zip(names) {
        assert!(Rc::ptr_eq(held, &loaded.tag(name).unwrap()));
    }
    let bo = loaded.contacts().get(1).unwrap().borrow();
    assert!(Rc::ptr_eq(&bo.tags()[0], &ann.tags()[2]));
}

#[test]
fn events_sharing_a_stable_id_are_refused_before_saving() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().join("user.json"));
    let mut user = sample_user();
    let first = user.events().iter().next().unwrap();
    let copy = Event::restore(first.snapshot(), None, Vec::new()).unwrap();

    assert!(user.events_mut().add(copy).is_err());
    assert_eq!(user.events().len(), 3);

    let mut events: Vec<Event> = Vec::new();
    for event in user.events().iter() {
        events.push(Event::restore(event.snapshot(), None, Vec::new()).unwrap());
    }
    let first = user.events().iter().next().unwrap().snapshot();
    events.push(Event::restore(first, None, Vec::new()).unwrap());
    *user.events_mut() = events.into_iter().collect();

    assert!(matches!(
        store.save(&user),
        Err(StoreError::Flatten(FlattenError::DuplicateEventId(_)))
    ));
    assert!(!store.exists());
}

#[test]
fn contact_snapshot_cannot_be_added_twice() {
    let mut user = sample_user();
    let ann = user.contacts().get(0).cloned().unwrap();
    let snapshot = ann.borrow().snapshot();

    let err = user.add_contact_from_cache(snapshot).unwrap_err();
    assert!(matches!(err, UserError::DuplicateStableId(_)));

    let loaded = round_trip(&user);
    assert_eq!(loaded.contacts().len(), 2);
}
