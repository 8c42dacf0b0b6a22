use prm_core::{Event, TagError, User, ValidationError, DEFAULT_TAG_COLOR};
use std::rc::Rc;

fn midday() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[test]
fn duplicate_name_is_rejected_and_count_is_unchanged() {
    let mut user = User::new("owner");
    user.create_tag("family").unwrap();
    user.create_tag("work").unwrap();

    let err = user.create_tag("family").unwrap_err();
    assert_eq!(err, TagError::NameNotAvailable("family".to_string()));
    assert_eq!(user.tag_handler().len(), 2);
}

#[test]
fn new_tags_get_the_default_color() {
    let mut user = User::new("owner");
    let tag = user.create_tag("gym").unwrap();
    assert_eq!(tag.borrow().color(), DEFAULT_TAG_COLOR);
}

#[test]
fn rename_is_visible_through_every_holder() {
    let mut user = User::new("owner");
    let tag = user.create_tag("club").unwrap();
    let contact = user.contacts_mut().add_contact("Rin").unwrap();
    contact.borrow_mut().add_tag(Rc::clone(&tag));
    let mut event = Event::new("Meeting", midday());
    event.set_tag(Rc::clone(&tag));
    let event_id = user.events_mut().add(event).unwrap();

    user.rename_tag("club", "society").unwrap();

    assert_eq!(contact.borrow().tags()[0].borrow().name(), "society");
    let event = user.events().get(event_id).unwrap();
    assert!(Rc::ptr_eq(event.tag().unwrap(), &tag));
    assert!(user.tag("club").is_err());
    assert!(Rc::ptr_eq(&user.tag("society").unwrap(), &tag));
}

#[test]
fn rename_onto_taken_name_fails_without_changes() {
    let mut user = User::new("owner");
    user.create_tag("a").unwrap();
    user.create_tag("b").unwrap();

    let err = user.rename_tag("a", "b").unwrap_err();
    assert_eq!(err, TagError::NameNotAvailable("b".to_string()));
    assert_eq!(user.tag("a").unwrap().borrow().name(), "a");
    assert_eq!(user.tag_handler().len(), 2);
}

#[test]
fn missing_tags_are_reported_as_not_found() {
    let mut user = User::new("owner");
    assert_eq!(
        user.tag("ghost").unwrap_err(),
        TagError::TagNotFound("ghost".to_string())
    );
    assert_eq!(
        user.rename_tag("ghost", "spirit").unwrap_err(),
        TagError::TagNotFound("ghost".to_string())
    );
    assert_eq!(
        user.delete_tag("ghost").unwrap_err(),
        TagError::TagNotFound("ghost".to_string())
    );
}

#[test]
fn color_must_be_a_hex_triplet() {
    let mut user = User::new("owner");
    user.create_tag("red").unwrap();

    user.set_tag_color("red", "ff0000").unwrap();
    assert_eq!(user.tag("red").unwrap().borrow().color(), "ff0000");

    let err = user.set_tag_color("red", "#ff0000").unwrap_err();
    assert!(matches!(
        err,
        TagError::Validation(ValidationError::InvalidColor(_))
    ));
    assert_eq!(user.tag("red").unwrap().borrow().color(), "ff0000");
}

#[test]
fn deleted_name_becomes_available_again() {
    let mut user = User::new("owner");
    let first = user.create_tag("temp").unwrap();
    user.delete_tag("temp").unwrap();
    assert!(user.tag_handler().is_name_available("temp"));

    let second = user.create_tag("temp").unwrap();
    assert!(!Rc::ptr_eq(&first, &second));
}
