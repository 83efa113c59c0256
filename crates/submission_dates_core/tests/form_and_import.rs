use chrono::NaiveDate;
use rusqlite::Connection;
use submission_dates_core::db::open_db_in_memory;
use submission_dates_core::{
    DateField, DateValidationError, RepoError, SqliteSubmissionDatesRepository,
    SubmissionDatesService, SubmissionParams, METADATA_FORM_ID,
};

fn service(conn: &Connection) -> SubmissionDatesService<SqliteSubmissionDatesRepository<'_>> {
    SubmissionDatesService::new(SqliteSubmissionDatesRepository::try_new(conn).unwrap())
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn params(entries: &[(&str, Option<&str>)]) -> SubmissionParams {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.map(str::to_string)))
        .collect()
}

#[test]
fn import_recognized_tag_sets_field() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let applied = service
        .import_from_tag("accepted_date", "2023-05-01", "pub-1")
        .unwrap();
    assert!(applied);
    assert_eq!(
        service.get_fields("pub-1").unwrap().accepted,
        Some(date("2023-05-01"))
    );

    assert!(service
        .import_from_tag("revised_date", "\n  2023-04-01\n", "pub-1")
        .unwrap());
    assert_eq!(
        service.get_fields("pub-1").unwrap().revised,
        Some(date("2023-04-01"))
    );
}

#[test]
fn import_unrelated_tag_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .set_field("pub-1", "received", Some("2023-01-01"))
        .unwrap();
    let before = service.get_fields("pub-1").unwrap();

    let applied = service.import_from_tag("unrelated_tag", "x", "pub-1").unwrap();

    assert!(!applied);
    assert_eq!(service.get_fields("pub-1").unwrap(), before);
}

#[test]
fn import_invalid_text_reports_tag_and_resource() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .import_from_tag("accepted_date", "May 1st", "pub-1")
        .unwrap_err();
    assert_eq!(err.tag_name, "accepted_date");
    assert_eq!(err.resource_id, "pub-1");
    assert!(matches!(
        err.source,
        RepoError::Validation(DateValidationError::InvalidDate {
            field: DateField::Accepted,
            ..
        })
    ));
    assert!(service.get_fields("pub-1").unwrap().is_empty());
}

#[test]
fn import_never_clears_with_blank_text() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .import_from_tag("revised_date", "2023-04-01", "pub-1")
        .unwrap();

    assert!(service.import_from_tag("revised_date", "   ", "pub-1").is_err());
    assert_eq!(
        service.get_fields("pub-1").unwrap().revised,
        Some(date("2023-04-01"))
    );
}

#[test]
fn batch_import_continues_past_rejected_tags() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let report = service.import_tags(
        "pub-1",
        [
            ("title", "Some article"),
            ("accepted_date", "garbage"),
            ("revised_date", "2023-04-01"),
            ("doi", "10.1000/xyz"),
            ("accepted_date", "2023-05-01"),
        ],
    );

    assert_eq!(report.applied, vec![DateField::Revised, DateField::Accepted]);
    assert_eq!(report.ignored, 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].tag_name, "accepted_date");
    assert!(!report.is_clean());

    let attrs = service.get_fields("pub-1").unwrap();
    assert_eq!(attrs.revised, Some(date("2023-04-01")));
    assert_eq!(attrs.accepted, Some(date("2023-05-01")));
}

#[test]
fn submission_applies_only_present_keys() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .set_field("pub-1", "received", Some("2023-01-01"))
        .unwrap();
    service
        .set_field("pub-1", "revised", Some("2023-02-01"))
        .unwrap();

    let attrs = service
        .apply_submission(
            "pub-1",
            &params(&[
                ("title", Some("ignored")),
                ("submission_dates__accepted", Some("2023-03-01")),
                ("submission_dates__revised", None),
            ]),
        )
        .unwrap();

    assert_eq!(attrs.received, Some(date("2023-01-01")));
    assert_eq!(attrs.revised, None);
    assert_eq!(attrs.accepted, Some(date("2023-03-01")));
    assert_eq!(service.get_fields("pub-1").unwrap(), attrs);
}

#[test]
fn rejected_submission_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .set_field("pub-1", "received", Some("2023-01-01"))
        .unwrap();

    let err = service
        .apply_submission(
            "pub-1",
            &params(&[
                ("submission_dates__accepted", Some("2023-03-01")),
                ("submission_dates__received", Some("31/01/2023")),
            ]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(DateValidationError::InvalidDate {
            field: DateField::Received,
            ..
        })
    ));

    let attrs = service.get_fields("pub-1").unwrap();
    assert_eq!(attrs.received, Some(date("2023-01-01")));
    assert_eq!(attrs.accepted, None);
}

#[test]
fn submission_with_inexact_date_key_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .apply_submission(
            "pub-2",
            &params(&[("submission_dates__ accepted ", Some("2024-02-02"))]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(DateValidationError::UnknownField(ref key))
            if key == "submission_dates__ accepted "
    ));
    assert!(service.get_fields("pub-2").unwrap().is_empty());
}

#[test]
fn import_error_reports_resource_id_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .import_from_tag("revised_date", "later", " pub-3 ")
        .unwrap_err();
    assert_eq!(err.resource_id, " pub-3 ");
}

#[test]
fn submission_without_date_keys_creates_no_row() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let attrs = service
        .apply_submission("pub-1", &params(&[("title", Some("x"))]))
        .unwrap();
    assert!(attrs.is_empty());

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM submission_dates;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}

#[test]
fn form_fields_carry_stored_values_for_metadata_form() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .set_field("pub-1", "accepted", Some("2023-03-01"))
        .unwrap();

    let fields = service.form_fields(METADATA_FORM_ID, "pub-1").unwrap();
    assert_eq!(fields.len(), 3);
    let accepted = fields
        .iter()
        .find(|field| field.name == "submission_dates__accepted")
        .unwrap();
    assert_eq!(accepted.value.as_deref(), Some("2023-03-01"));
    assert_eq!(
        accepted.label_key,
        "plugins.submissionDates.accepted.displayName"
    );

    assert!(service.form_fields("citations", "pub-1").unwrap().is_empty());
}
