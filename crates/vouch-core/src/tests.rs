//! Controller tests against the recording fake backend.

use bytes::Bytes;
use uuid::Uuid;

use crate::{
  Error,
  asset::{AssetSlot, UploadFile},
  contact::{
    ApprovalType, CHANGES_SAVED_MESSAGE, Category, Contact, ContactKind,
    DraftEdit, Relationship,
  },
  fake::{Call, FakeBackend, Op},
  form::{FormController, FormMode},
  list::{EmptyState, ListController},
  schema::Field,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn png(name: &str) -> UploadFile {
  UploadFile {
    file_name:    name.into(),
    content_type: "image/png".into(),
    bytes:        Bytes::from_static(b"\x89PNG"),
    local_path:   None,
  }
}

fn fill_asha(form: &mut FormController) {
  form.apply(DraftEdit::Name("Asha".into())).unwrap();
  form.apply(DraftEdit::Email("asha@x.com".into())).unwrap();
  form.apply(DraftEdit::Phone("9999".into())).unwrap();
  form
    .apply(DraftEdit::Relationship(Some(Relationship::Sister)))
    .unwrap();
}

async fn list_with_asha(backend: &FakeBackend) -> ListController {
  let mut list = ListController::new(ContactKind::Nominee);
  list.refresh(backend).await.unwrap();
  list.open_create();
  fill_asha(list.form_mut().unwrap());
  list.submit_form(backend).await.unwrap();
  list.dismiss_notice();
  list
}

async fn list_of(backend: &FakeBackend, names: &[&str]) -> ListController {
  let mut list = ListController::new(ContactKind::Trustee);
  for name in names {
    let mut form = FormController::create(ContactKind::Trustee);
    form.apply(DraftEdit::Name((*name).into())).unwrap();
    form.apply(DraftEdit::Email(format!("{name}@x.com"))).unwrap();
    form.apply(DraftEdit::Phone("1".into())).unwrap();
    form
      .apply(DraftEdit::Relationship(Some(Relationship::Brother)))
      .unwrap();
    form.submit(backend).await.unwrap();
  }
  list.refresh(backend).await.unwrap();
  backend.clear_calls();
  list
}

fn count(calls: &[Call], pred: impl Fn(&Call) -> bool) -> usize {
  calls.iter().filter(|c| pred(c)).count()
}

// ─── Create / edit scenarios ─────────────────────────────────────────────────

#[tokio::test]
async fn create_shows_added_notice_and_refetches() {
  let backend = FakeBackend::signed_in();
  let mut list = ListController::new(ContactKind::Nominee);
  list.refresh(&backend).await.unwrap();
  assert_eq!(list.empty_state(), Some(EmptyState::NoRecords));

  list.open_create();
  fill_asha(list.form_mut().unwrap());
  backend.clear_calls();
  list.submit_form(&backend).await.unwrap();

  assert!(list.form().is_none());
  assert_eq!(list.notice().unwrap().message, "Nominee added successfully");
  assert_eq!(
    backend.calls(),
    vec![
      Call::CurrentUser,
      Call::Insert(ContactKind::Nominee),
      Call::SelectAll(ContactKind::Nominee),
    ]
  );

  let rows = list.contacts();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].name, "Asha");
  assert_eq!(rows[0].email, "asha@x.com");
  assert_eq!(rows[0].phone, "9999");
  assert_eq!(rows[0].relationship, Relationship::Sister);
  assert!(rows[0].categories.is_empty());

  list.dismiss_notice();
  assert!(list.notice().is_none());
}

#[tokio::test]
async fn edit_saves_with_distinct_message() {
  let backend = FakeBackend::signed_in();
  let mut list = list_with_asha(&backend).await;
  let id = list.contacts()[0].id;

  list.open_edit(id).unwrap();
  let form = list.form_mut().unwrap();
  assert_eq!(form.mode(), FormMode::Edit);
  assert_eq!(form.draft().name, "Asha");
  form
    .apply(DraftEdit::Relationship(Some(Relationship::Spouse)))
    .unwrap();
  list.submit_form(&backend).await.unwrap();

  let message = &list.notice().unwrap().message;
  assert_eq!(message, CHANGES_SAVED_MESSAGE);
  assert_ne!(message, &ContactKind::Nominee.added_message());
  assert_eq!(list.contacts().len(), 1);
  assert_eq!(list.contacts()[0].relationship, Relationship::Spouse);
  assert_eq!(list.contacts()[0].id, id);
}

#[tokio::test]
async fn user_id_always_comes_from_the_session() {
  let backend = FakeBackend::signed_in();
  let mut form = FormController::create(ContactKind::Nominee);
  fill_asha(&mut form);
  form.submit(&backend).await.unwrap();

  // A row that somehow carries another account's id is re-stamped on save.
  let foreign = Contact {
    user_id: Uuid::new_v4(),
    ..backend.rows(ContactKind::Nominee)[0].clone()
  };
  let mut edit = FormController::edit(ContactKind::Nominee, foreign);
  edit.apply(DraftEdit::Name("Asha K".into())).unwrap();
  edit.submit(&backend).await.unwrap();

  let rows = backend.rows(ContactKind::Nominee);
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].name, "Asha K");
  assert_eq!(rows[0].user_id, backend.user_id());
}

#[tokio::test]
async fn trustee_records_carry_approval_type() {
  let backend = FakeBackend::signed_in();
  let mut form = FormController::create(ContactKind::Trustee);
  fill_asha(&mut form);
  form.set_field(Field::ApprovalType, "Without Request").unwrap();
  form.set_field(Field::Categories, "Health").unwrap();
  form.submit(&backend).await.unwrap();

  let rows = backend.rows(ContactKind::Trustee);
  assert_eq!(rows[0].approval_type, Some(ApprovalType::WithoutRequest));
  assert_eq!(rows[0].categories, vec![Category::Health]);
}

#[tokio::test]
async fn unknown_option_is_rejected() {
  let mut form = FormController::create(ContactKind::Nominee);
  let err = form.set_field(Field::Relationship, "Cousin").unwrap_err();
  assert!(matches!(err, Error::InvalidOption { field: "Relationship", .. }));
  assert_eq!(form.draft().relationship, None);
}

// ─── Submit failures ─────────────────────────────────────────────────────────

#[tokio::test]
async fn unauthenticated_submit_fails_and_keeps_draft() {
  let backend = FakeBackend::signed_out();
  let mut list = ListController::new(ContactKind::Nominee);
  list.refresh(&backend).await.unwrap();
  list.open_create();
  fill_asha(list.form_mut().unwrap());

  let err = list.submit_form(&backend).await.unwrap_err();
  assert!(matches!(err, Error::Unauthenticated));

  let form = list.form().unwrap();
  assert_eq!(form.error(), Some("User not authenticated"));
  assert_eq!(form.draft().name, "Asha");
  assert!(list.notice().is_none());
  assert!(backend.rows(ContactKind::Nominee).is_empty());
}

#[tokio::test]
async fn missing_required_field_blocks_before_any_call() {
  let backend = FakeBackend::signed_in();
  let mut form = FormController::create(ContactKind::Nominee);
  form.apply(DraftEdit::Name("Asha".into())).unwrap();

  let err = form.submit(&backend).await.unwrap_err();
  assert!(matches!(err, Error::MissingField("Email Address")));
  assert_eq!(form.error(), Some("Email Address is required"));
  assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn backend_rejection_is_surfaced_verbatim() {
  let backend = FakeBackend::signed_in();
  backend.fail(Op::Insert, "duplicate key value violates unique constraint");

  let mut list = ListController::new(ContactKind::Nominee);
  list.open_create();
  fill_asha(list.form_mut().unwrap());
  assert!(list.submit_form(&backend).await.is_err());

  let form = list.form().unwrap();
  assert_eq!(form.error(), Some("duplicate key value violates unique constraint"));
  assert!(form.is_editable());

  // The same form can be resubmitted once the backend recovers.
  backend.recover(Op::Insert);
  list.submit_form(&backend).await.unwrap();
  assert!(list.form().is_none());
  assert_eq!(list.contacts().len(), 1);
}

#[tokio::test]
async fn view_mode_is_read_only() {
  let backend = FakeBackend::signed_in();
  let mut list = list_with_asha(&backend).await;
  let id = list.contacts()[0].id;
  list.open_view(id).unwrap();
  backend.clear_calls();

  let form = list.form_mut().unwrap();
  assert_eq!(form.title(), "View Nominee");
  assert!(!form.can_submit());
  assert!(matches!(
    form.apply(DraftEdit::Name("x".into())),
    Err(Error::NotEditable)
  ));
  assert!(matches!(
    form.begin_upload(AssetSlot::Photo, png("a.png")),
    Err(Error::NotEditable)
  ));
  assert!(matches!(form.submit(&backend).await, Err(Error::NotEditable)));
  assert!(form.error().is_none());
  assert!(backend.calls().is_empty());
}

// ─── Uploads ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn successful_upload_stores_public_url() {
  let backend = FakeBackend::signed_in();
  let mut form = FormController::create(ContactKind::Trustee);
  form
    .upload(&backend, AssetSlot::Photo, png("me.png"))
    .await
    .unwrap();

  let url = &form.draft().photo_url;
  assert!(url.starts_with("https://storage.test/profile-photos/trustees/"));
  assert_eq!(form.photo_preview(), Some("me.png"));
  assert!(!form.is_uploading());
  assert_eq!(backend.object_count(), 1);
}

#[tokio::test]
async fn failed_photo_upload_is_scoped_to_photo() {
  let backend = FakeBackend::signed_in();
  let mut form = FormController::create(ContactKind::Nominee);
  fill_asha(&mut form);
  form
    .upload(&backend, AssetSlot::GovernmentId, png("id.png"))
    .await
    .unwrap();
  let id_url = form.draft().government_id_url.clone();

  backend.fail(Op::Upload, "The resource already exists");
  let err = form
    .upload(&backend, AssetSlot::Photo, png("me.png"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Backend(_)));

  assert_eq!(form.slot_error(AssetSlot::Photo), Some("The resource already exists"));
  assert_eq!(form.slot_error(AssetSlot::GovernmentId), None);
  assert!(form.error().is_none());
  assert_eq!(form.draft().photo_url, "");
  assert_eq!(form.photo_preview(), None);
  assert_eq!(form.draft().government_id_url, id_url);
  assert_eq!(form.draft().name, "Asha");
  assert_eq!(form.draft().phone, "9999");

  assert!(form.can_submit());
  form.submit(&backend).await.unwrap();
}

#[tokio::test]
async fn in_flight_upload_blocks_submit() {
  let backend = FakeBackend::signed_in();
  let mut form = FormController::create(ContactKind::Nominee);
  fill_asha(&mut form);

  let pending = form.begin_upload(AssetSlot::Photo, png("me.png")).unwrap();
  assert!(!form.can_submit());
  assert_eq!(form.submit_label(), "Uploading...");
  assert!(matches!(form.submit(&backend).await, Err(Error::UploadInFlight)));
  assert!(matches!(
    form.begin_upload(AssetSlot::Photo, png("again.png")),
    Err(Error::UploadInFlight)
  ));

  let outcome = pending.run(&backend).await;
  assert!(form.finish_upload(outcome));
  assert!(form.can_submit());
  assert_eq!(form.submit_label(), "Submit");
}

#[tokio::test]
async fn both_slots_can_upload_at_once() {
  let backend = FakeBackend::signed_in();
  let mut form = FormController::create(ContactKind::Trustee);

  let photo = form.begin_upload(AssetSlot::Photo, png("me.png")).unwrap();
  let id = form
    .begin_upload(AssetSlot::GovernmentId, png("id.png"))
    .unwrap();
  assert!(form.is_slot_uploading(AssetSlot::Photo));
  assert!(form.is_slot_uploading(AssetSlot::GovernmentId));

  let (photo, id) = tokio::join!(photo.run(&backend), id.run(&backend));
  form.finish_upload(id);
  assert!(form.is_uploading());
  form.finish_upload(photo);
  assert!(!form.is_uploading());
  assert!(!form.draft().photo_url.is_empty());
  assert!(form
    .draft()
    .government_id_url
    .starts_with("https://storage.test/government-ids/government-ids/"));
}

#[tokio::test]
async fn outcome_for_closed_form_is_ignored() {
  let backend = FakeBackend::signed_in();
  let mut closed = FormController::create(ContactKind::Nominee);
  let pending = closed.begin_upload(AssetSlot::Photo, png("me.png")).unwrap();
  drop(closed);

  let mut current = FormController::create(ContactKind::Nominee);
  let outcome = pending.run(&backend).await;
  assert!(!current.finish_upload(outcome));
  assert_eq!(current.draft().photo_url, "");
}

#[tokio::test]
async fn unsupported_file_never_reaches_backend() {
  let backend = FakeBackend::signed_in();
  let mut form = FormController::create(ContactKind::Nominee);
  let pdf = UploadFile {
    file_name:    "id.pdf".into(),
    content_type: "application/pdf".into(),
    bytes:        Bytes::from_static(b"%PDF"),
    local_path:   None,
  };

  let err = form
    .upload(&backend, AssetSlot::Photo, pdf.clone())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UnsupportedFile { .. }));
  assert!(form.slot_error(AssetSlot::Photo).is_some());
  assert!(!form.is_uploading());

  form
    .upload(&backend, AssetSlot::GovernmentId, pdf)
    .await
    .unwrap();
  assert_eq!(backend.object_count(), 1);
}

// ─── List behaviour ──────────────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_delete_makes_no_call() {
  let backend = FakeBackend::signed_in();
  let mut list = list_with_asha(&backend).await;
  let id = list.contacts()[0].id;
  backend.clear_calls();

  assert!(list.request_delete(id));
  assert!(list.pending_delete().is_some());
  list.cancel_delete();

  assert!(list.pending_delete().is_none());
  assert_eq!(list.contacts().len(), 1);
  assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn confirmed_delete_removes_exactly_one() {
  let backend = FakeBackend::signed_in();
  let mut list = list_of(&backend, &["ana", "ben", "cam", "dev"]).await;
  let before: Vec<Contact> = list.contacts().to_vec();
  let target = before[1].id;

  assert!(list.request_delete(target));
  assert_eq!(
    list.pending_delete().unwrap().message,
    "Are you sure you want to delete this trustee? This action cannot be undone."
  );
  list.confirm_delete(&backend).await.unwrap();

  let calls = backend.calls();
  assert_eq!(calls, vec![Call::Delete(ContactKind::Trustee, target)]);
  assert_eq!(list.notice().unwrap().message, "Trustee deleted successfully");

  let expected: Vec<&Contact> = before.iter().filter(|c| c.id != target).collect();
  let after: Vec<&Contact> = list.contacts().iter().collect();
  assert_eq!(after, expected);
}

#[tokio::test]
async fn only_one_delete_can_be_pending() {
  let backend = FakeBackend::signed_in();
  let mut list = list_of(&backend, &["ana", "ben"]).await;
  let (a, b) = (list.contacts()[0].id, list.contacts()[1].id);

  assert!(list.request_delete(a));
  assert!(!list.request_delete(b));
  assert_eq!(list.pending_delete().unwrap().target(), &a);

  list.cancel_delete();
  assert!(!list.request_delete(Uuid::new_v4()));
  assert!(list.pending_delete().is_none());
}

#[tokio::test]
async fn failed_delete_keeps_the_record() {
  let backend = FakeBackend::signed_in();
  let mut list = list_of(&backend, &["ana"]).await;
  let id = list.contacts()[0].id;
  backend.fail(Op::Delete, "permission denied for table trustees");

  list.request_delete(id);
  assert!(list.confirm_delete(&backend).await.is_err());
  assert_eq!(list.contacts().len(), 1);
  assert!(list.notice().is_none());
  assert_eq!(list.last_error(), Some("permission denied for table trustees"));
}

#[tokio::test]
async fn failed_fetch_keeps_last_known_good() {
  let backend = FakeBackend::signed_in();
  let mut list = list_of(&backend, &["ana", "ben"]).await;
  backend.fail(Op::SelectAll, "network unreachable");

  assert!(list.refresh(&backend).await.is_err());
  assert_eq!(list.contacts().len(), 2);
  assert_eq!(list.last_error(), Some("network unreachable"));

  backend.recover(Op::SelectAll);
  list.refresh(&backend).await.unwrap();
  assert_eq!(list.last_error(), None);
}

#[tokio::test]
async fn empty_states_are_distinct() {
  let backend = FakeBackend::signed_in();
  let mut list = ListController::new(ContactKind::Trustee);
  assert_eq!(list.empty_state(), Some(EmptyState::Loading));

  list.refresh(&backend).await.unwrap();
  assert_eq!(list.empty_state(), Some(EmptyState::NoRecords));

  let mut list = list_of(&backend, &["ana"]).await;
  assert_eq!(list.empty_state(), None);
  list.set_search("zzz");
  assert_eq!(list.empty_state(), Some(EmptyState::NoMatches));

  let messages: Vec<String> = [EmptyState::Loading, EmptyState::NoRecords, EmptyState::NoMatches]
    .iter()
    .map(|s| s.message(ContactKind::Trustee).0)
    .collect();
  assert_eq!(messages, ["Loading trustees...", "No trustees yet", "No matching trustees"]);
}

#[tokio::test]
async fn search_survives_close_and_refetch() {
  let backend = FakeBackend::signed_in();
  let mut list = list_of(&backend, &["ana", "ben"]).await;
  list.set_search("BEN");
  assert_eq!(list.visible().len(), 1);

  list.open_create();
  list.close_form(&backend).await;

  assert_eq!(list.search(), "BEN");
  assert_eq!(list.visible().len(), 1);
  assert_eq!(
    count(&backend.calls(), |c| matches!(c, Call::SelectAll(_))),
    1
  );
}

#[tokio::test]
async fn add_discards_previous_selection() {
  let backend = FakeBackend::signed_in();
  let mut list = list_of(&backend, &["ana"]).await;
  let id = list.contacts()[0].id;

  list.open_edit(id).unwrap();
  list.close_form(&backend).await;
  list.open_create();

  let form = list.form().unwrap();
  assert_eq!(form.mode(), FormMode::Create);
  assert!(form.existing().is_none());
  assert_eq!(form.draft().name, "");
  assert_eq!(form.draft().approval_type, Some(ApprovalType::GroupRequest));
}

#[tokio::test]
async fn cursor_tracks_visible_list() {
  let backend = FakeBackend::signed_in();
  let mut list = list_of(&backend, &["ana", "ben", "cam"]).await;

  list.move_cursor(5);
  assert_eq!(list.cursor(), 2);
  assert_eq!(list.selected().unwrap().name, "cam");
  list.move_cursor(-10);
  assert_eq!(list.cursor(), 0);

  list.set_search("ben");
  assert_eq!(list.selected().unwrap().name, "ben");
}
