use achievements_core::db::open_db_in_memory;
use achievements_core::{
    ActivityRepository, EventDetails, EventLevel, RepoError, SqliteActivityRepository,
    ValidationError,
};
use chrono::NaiveDate;
use rusqlite::Connection;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn details(name: &str, level: EventLevel, start: NaiveDate, end: NaiveDate) -> EventDetails {
    EventDetails {
        name: name.to_string(),
        level,
        start_date: start,
        end_date: end,
        is_first_time: false,
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn event_identity_is_name_and_both_dates() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteActivityRepository::try_new(&mut conn).unwrap();
        let first = repo
            .upsert_event(&details(
                "Олимпиада",
                EventLevel::Faculty,
                date(2024, 3, 1),
                date(2024, 3, 2),
            ))
            .unwrap();
        assert!(first.created);

        let mut update = details(
            "Олимпиада",
            EventLevel::AllRussian,
            date(2024, 3, 1),
            date(2024, 3, 2),
        );
        update.is_first_time = true;
        let second = repo.upsert_event(&update).unwrap();
        assert!(!second.created);
        assert_eq!(second.id, first.id);

        let stored = repo
            .find_event("Олимпиада", date(2024, 3, 1), date(2024, 3, 2))
            .unwrap()
            .unwrap();
        assert_eq!(stored.level, EventLevel::AllRussian);
        assert!(stored.is_first_time);

        let other_dates = repo
            .upsert_event(&details(
                "Олимпиада",
                EventLevel::Faculty,
                date(2024, 3, 1),
                date(2024, 3, 3),
            ))
            .unwrap();
        assert!(other_dates.created);
        assert_ne!(other_dates.id, first.id);
    }
    assert_eq!(count(&conn, "events"), 2);
}

#[test]
fn student_group_is_synced_without_creating_a_row() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteActivityRepository::try_new(&mut conn).unwrap();
        let first = repo.upsert_student("Иванов Иван", "101").unwrap();
        assert!(first.created);

        let same = repo.upsert_student("Иванов Иван", "101").unwrap();
        assert!(!same.created);

        let moved = repo.upsert_student("Иванов Иван", "201").unwrap();
        assert!(!moved.created);
        assert_eq!(moved.id, first.id);

        let stored = repo.find_student("Иванов Иван").unwrap().unwrap();
        assert_eq!(stored.group, "201");
    }
    assert_eq!(count(&conn, "students"), 1);
}

#[test]
fn participation_role_and_hours_are_overwritten() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteActivityRepository::try_new(&mut conn).unwrap();
    let event = repo
        .upsert_event(&details(
            "Капустник",
            EventLevel::Cabbage,
            date(2023, 12, 20),
            date(2023, 12, 20),
        ))
        .unwrap();
    let student = repo.upsert_student("Петрова Анна", "").unwrap();

    let first = repo
        .upsert_participation(student.id, event.id, "участник", 4)
        .unwrap();
    assert!(first.created);

    let second = repo
        .upsert_participation(student.id, event.id, "организатор", 10)
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.id, first.id);

    let stored = repo
        .find_participation(student.id, event.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.role, "организатор");
    assert_eq!(stored.hours, 10);
}

#[test]
fn zero_hours_and_blank_names_are_rejected_before_writing() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteActivityRepository::try_new(&mut conn).unwrap();
        let event = repo
            .upsert_event(&details(
                "Посвящение",
                EventLevel::Dedication,
                date(2023, 9, 1),
                date(2023, 9, 1),
            ))
            .unwrap();
        let student = repo.upsert_student("Сидоров Пётр", "305").unwrap();

        let zero = repo
            .upsert_participation(student.id, event.id, "", 0)
            .unwrap_err();
        assert!(matches!(
            zero,
            RepoError::Validation(ValidationError::ZeroHours)
        ));

        let blank = repo.upsert_student("   ", "101").unwrap_err();
        assert!(matches!(
            blank,
            RepoError::Validation(ValidationError::EmptyStudentName)
        ));

        let nameless = repo
            .upsert_event(&details(
                " ",
                EventLevel::Faculty,
                date(2023, 9, 1),
                date(2023, 9, 1),
            ))
            .unwrap_err();
        assert!(matches!(
            nameless,
            RepoError::Validation(ValidationError::EmptyEventName)
        ));
    }
    assert_eq!(count(&conn, "participations"), 0);
    assert_eq!(count(&conn, "students"), 1);
    assert_eq!(count(&conn, "events"), 1);
}

#[test]
fn unmigrated_connection_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    let err = SqliteActivityRepository::try_new(&mut conn)
        .err()
        .unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("students")));
}

#[test]
fn connection_missing_a_column_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE students (uuid TEXT PRIMARY KEY, full_name TEXT);
         CREATE TABLE events (uuid TEXT, name TEXT, level TEXT, start_date TEXT, end_date TEXT, is_first_time INTEGER);
         CREATE TABLE participations (uuid TEXT, student_uuid TEXT, event_uuid TEXT, role TEXT, hours INTEGER);",
    )
    .unwrap();
    let err = SqliteActivityRepository::try_new(&mut conn)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        RepoError::MissingRequiredColumn {
            table: "students",
            column: "group_name",
        }
    ));
}
