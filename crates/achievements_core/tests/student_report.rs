use achievements_core::db::open_db_in_memory;
use achievements_core::{
    ActivityRepository, EventDetails, EventLevel, ReportError, ReportService,
    SqliteActivityRepository, SqliteReportRepository,
};
use chrono::NaiveDate;
use rusqlite::Connection;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn seed(conn: &mut Connection) {
    let mut repo = SqliteActivityRepository::try_new(conn).unwrap();
    let student = repo.upsert_student("Иванов Иван", "101").unwrap();
    let other = repo.upsert_student("Петрова Анна", "102").unwrap();

    let events = [
        ("Посвящение", EventLevel::Dedication, date(2023, 9, 1), 3, "участник"),
        ("Капустник", EventLevel::Cabbage, date(2023, 12, 20), 5, "главныйорганизатор"),
        ("Олимпиада", EventLevel::AllRussian, date(2023, 10, 5), 8, "отв.по тех.части"),
        ("День химика", EventLevel::ChemistryDay, date(2024, 5, 12), 6, "ведущий"),
    ];
    for (name, level, start, hours, role) in events {
        let event = repo
            .upsert_event(&EventDetails {
                name: name.to_string(),
                level,
                start_date: start,
                end_date: start,
                is_first_time: false,
            })
            .unwrap();
        repo.upsert_participation(student.id, event.id, role, hours)
            .unwrap();
        repo.upsert_participation(other.id, event.id, "зритель", 1)
            .unwrap();
    }
}

#[test]
fn report_filters_by_start_date_and_orders_rows() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn);

    let repo = SqliteReportRepository::try_new(&conn).unwrap();
    let service = ReportService::new(repo);
    let report = service
        .student_report(" Иванов Иван ", date(2023, 9, 1), date(2023, 12, 31))
        .unwrap();

    assert_eq!(report.student.full_name, "Иванов Иван");
    assert_eq!(report.student.group, "101");
    let names: Vec<&str> = report
        .rows
        .iter()
        .map(|row| row.event_name.as_str())
        .collect();
    assert_eq!(names, vec!["Посвящение", "Олимпиада", "Капустник"]);
    assert_eq!(report.total_hours, 16);

    let olympiad = &report.rows[1];
    assert_eq!(olympiad.level, EventLevel::AllRussian);
    assert_eq!(olympiad.level_label, EventLevel::AllRussian.label());
    assert_eq!(olympiad.role, "отв. по тех. части");
    assert_eq!(report.rows[2].role, "главный организатор");
}

#[test]
fn report_range_bounds_are_inclusive() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn);

    let service = ReportService::new(SqliteReportRepository::try_new(&conn).unwrap());
    let report = service
        .student_report("Иванов Иван", date(2024, 5, 12), date(2024, 5, 12))
        .unwrap();
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.total_hours, 6);

    let empty = service
        .student_report("Иванов Иван", date(2025, 1, 1), date(2025, 12, 31))
        .unwrap();
    assert!(empty.rows.is_empty());
    assert_eq!(empty.total_hours, 0);
}

#[test]
fn unknown_student_and_inverted_range_are_errors() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&mut conn);

    let service = ReportService::new(SqliteReportRepository::try_new(&conn).unwrap());
    let missing = service
        .student_report("Никто", date(2023, 1, 1), date(2024, 1, 1))
        .unwrap_err();
    assert!(matches!(missing, ReportError::StudentNotFound(name) if name == "Никто"));

    let inverted = service
        .student_report("Иванов Иван", date(2024, 1, 1), date(2023, 1, 1))
        .unwrap_err();
    assert!(matches!(inverted, ReportError::InvalidRange { .. }));
}
