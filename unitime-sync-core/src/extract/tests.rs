use super::*;

fn row(cells: &[&str]) -> String {
    let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
    format!("<tr>{tds}</tr>")
}

fn page(rows: &[String]) -> String {
    format!(
        "<html><body><table class=\"unitime-WebTable\">{}</table></body></html>",
        rows.concat()
    )
}

fn lecture_row(subject: &str, course: &str, ty: &str) -> String {
    row(&[
        "", subject, course, ty, "12345", "10", "MWF", "9:30a", "10:20a",
        "08/22 - 12/10", "LWSN B155", "Dunsmore", "", "", "3", "Letter",
    ])
}

#[test]
fn extracts_rows_with_inheritance() {
    let html = page(&[
        lecture_row("CS", "180", "Lec"),
        row(&[
            "", "", "", "Lab", "12346", "10", "T", "2:30p", "4:20p",
            "08/22 - 12/10", "HAAS G040", "Staff", "", "", "0", "Letter",
        ]),
    ]);

    let entries = ScheduleExtractor::new().extract(&html).unwrap();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].subject, "CS");
    assert_eq!(entries[0].course, "180");
    assert_eq!(entries[0].schedule_type, ScheduleType::Lecture);
    assert_eq!(entries[0].name, "CS 180 Lec");

    // Second row inherits the group's subject and course.
    assert_eq!(entries[1].subject, "CS");
    assert_eq!(entries[1].course, "180");
    assert_eq!(entries[1].schedule_type, ScheduleType::Laboratory);
    assert_eq!(entries[1].crn, "12346");
    assert_eq!(entries[1].days, "T");
}

#[test]
fn new_subject_starts_new_group() {
    let html = page(&[
        lecture_row("CS", "180", "Lec"),
        lecture_row("MA", "261", "Lec"),
        row(&[
            "", "", "", "Rec", "23456", "5", "R", "8:30a", "9:20a",
            "08/22 - 12/10", "REC 113", "Staff", "", "", "0", "Letter",
        ]),
    ]);

    let entries = ScheduleExtractor::new().extract(&html).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].subject, "MA");
    assert_eq!(entries[2].subject, "MA");
    assert_eq!(entries[2].course, "261");
}

#[test]
fn unrecognized_type_is_discarded_even_with_subject() {
    let html = page(&[
        lecture_row("CS", "180", "Lec"),
        lecture_row("PHYS", "172", "Xyz"),
    ]);

    let entries = ScheduleExtractor::new().extract(&html).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].subject, "CS");
}

#[test]
fn header_and_empty_rows_are_skipped() {
    let html = format!(
        "<html><body><table class=\"unitime-WebTable\">\
         <tr><th>Subject</th><th>Course</th></tr>{}</table></body></html>",
        lecture_row("CS", "180", "Lec")
    );
    let entries = ScheduleExtractor::new().extract(&html).unwrap();
    assert_eq!(entries.len(), 1);
}

#[test]
fn wrong_view_is_distinct_from_empty() {
    let wrong = "<html><body>Selected tab Time Grid<table class=\"unitime-WebTable\">\
                 </table></body></html>";
    assert!(matches!(
        ScheduleExtractor::new().extract(wrong),
        Err(Error::WrongView)
    ));

    let empty = "<html><body><table class=\"unitime-WebTable\"></table></body></html>";
    let entries = ScheduleExtractor::new().extract(empty).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn no_schedule_table_yields_no_entries() {
    let html = "<html><body><table><tr><td>not a schedule</td></tr></table></body></html>";
    let entries = ScheduleExtractor::new().extract(html).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn multiple_tables_in_document_order() {
    let html = format!(
        "<html><body><table class=\"unitime-WebTable\">{}</table>\
         <table class=\"unitime-WebTable\">{}</table></body></html>",
        lecture_row("CS", "180", "Lec"),
        lecture_row("MA", "261", "Lec"),
    );
    let entries = ScheduleExtractor::new().extract(&html).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].subject, "CS");
    assert_eq!(entries[1].subject, "MA");
}

#[test]
fn typed_row_before_any_group_is_discarded() {
    let html = page(&[row(&[
        "", "", "", "Lab", "12346", "10", "T", "2:30p", "4:20p",
        "08/22 - 12/10", "HAAS G040", "Staff", "", "", "0", "Letter",
    ])]);
    let entries = ScheduleExtractor::new().extract(&html).unwrap();
    assert!(entries.is_empty());
}
