use terrigraphic::contact::{
    ContactFormState, ContactResponse, Field, SubmitStatus, ERROR_BANNER, SUCCESS_BANNER,
};
use terrigraphic::Error;

fn filled() -> ContactFormState {
    let mut state = ContactFormState::new();
    state.set_field(Field::FullName, "Ada Lovelace");
    state.set_field(Field::Email, "ada@example.com");
    state.set_field(Field::Subject, "Commission");
    state.set_field(Field::Message, "A 3D piece for the lobby.");
    state
}

#[test]
fn empty_full_name_is_reported() {
    let mut state = filled();
    state.set_field(Field::FullName, "   ");
    assert_eq!(state.begin_submit().unwrap(), None);
    assert_eq!(state.errors().full_name, Some("Full name is required"));
    assert!(!state.is_submitting());
}

#[test]
fn malformed_email_is_reported() {
    let mut state = filled();
    state.set_field(Field::Email, "a@b");
    assert_eq!(state.begin_submit().unwrap(), None);
    assert_eq!(state.errors().email, Some("Email is invalid"));

    state.set_field(Field::Email, "");
    state.begin_submit().unwrap();
    assert_eq!(state.errors().email, Some("Email is required"));
}

#[test]
fn typing_clears_only_that_error() {
    let mut state = ContactFormState::new();
    state.begin_submit().unwrap();
    assert_eq!(state.errors().subject, Some("Subject is required"));
    state.set_field(Field::Subject, "H");
    assert_eq!(state.errors().subject, None);
    assert_eq!(state.errors().message, Some("Message is required"));
}

#[test]
fn success_resolves_once_and_clears_form() {
    let mut state = filled();
    let payload = state.begin_submit().unwrap().expect("valid form");
    assert_eq!(payload.full_name, "Ada Lovelace");
    assert!(state.is_submitting());
    assert!(matches!(state.begin_submit(), Err(Error::SubmitInFlight)));

    let status = state.finish_submit(Ok(ContactResponse::ok("sent")));
    assert_eq!(status, SubmitStatus::Success);
    assert_eq!(state.status().banner(), Some(SUCCESS_BANNER));
    assert!(state.form().full_name.is_empty());

    // A stray second result does not change the banner.
    let again = state.finish_submit(Err(Error::Contact("late".into())));
    assert_eq!(again, SubmitStatus::Success);
}

#[test]
fn failure_keeps_form_for_resubmit() {
    let mut state = filled();
    state.begin_submit().unwrap();
    let status = state.finish_submit(Err(Error::Contact("network down".into())));
    assert_eq!(status, SubmitStatus::Error);
    assert_eq!(state.status().banner(), Some(ERROR_BANNER));
    assert_eq!(state.form().email, "ada@example.com");

    // Resubmitting resets the banner while in flight.
    state.begin_submit().unwrap();
    assert_eq!(state.status(), SubmitStatus::Idle);
    let status = state.finish_submit(Ok(ContactResponse::failed("Invalid email format")));
    assert_eq!(status, SubmitStatus::Error);
}
