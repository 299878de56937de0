//! Schedule extraction from the timetabling page's HTML.

use scraper::{ElementRef, Html, Selector};

use crate::{
    Error, Result,
    types::{ScheduleEntry, ScheduleType},
};

/// Marker text present when the page is showing the Time Grid view instead
/// of the List of Classes view the extractor understands.
pub const WRONG_VIEW_MARKER: &str = "Selected tab Time Grid";

/// CSS selector identifying schedule-grid tables.
const SCHEDULE_TABLE_SELECTOR: &str = "table.unitime-WebTable, .unitime-WebTable";

/// Fixed positional column contract with the source page.
///
/// The page renders a leading decoration cell, so data columns start at
/// index 1. This is configuration, not logic; if the page layout shifts,
/// only these indices change.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    /// Subject code column.
    pub subject: usize,
    /// Course number column.
    pub course: usize,
    /// Schedule-type code column.
    pub schedule_type: usize,
    /// CRN column.
    pub crn: usize,
    /// Availability column.
    pub availability: usize,
    /// Weekday letters column.
    pub days: usize,
    /// Start-time token column.
    pub start_time: usize,
    /// End-time token column.
    pub end_time: usize,
    /// Date-range token column.
    pub date_range: usize,
    /// Room column.
    pub room: usize,
    /// Instructor column.
    pub instructor: usize,
    /// Requirements column.
    pub requires: usize,
    /// Credits column.
    pub credits: usize,
    /// Grade-mode column.
    pub grade_mode: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            subject: 1,
            course: 2,
            schedule_type: 3,
            crn: 4,
            availability: 5,
            days: 6,
            start_time: 7,
            end_time: 8,
            date_range: 9,
            room: 10,
            instructor: 11,
            requires: 12,
            credits: 14,
            grade_mode: 15,
        }
    }
}

/// Parses schedule-grid tables into an ordered sequence of entries.
#[derive(Debug, Clone, Default)]
pub struct ScheduleExtractor {
    columns: ColumnMap,
}

impl ScheduleExtractor {
    /// Extractor with the default column contract.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor with a custom column contract.
    pub fn with_columns(columns: ColumnMap) -> Self {
        Self { columns }
    }

    /// Extracts all schedule entries from the page, in document order.
    ///
    /// Returns [`Error::WrongView`] when the page is showing the Time Grid
    /// view; that signal is distinct from an empty schedule, which yields
    /// `Ok` with an empty sequence.
    pub fn extract(&self, html: &str) -> Result<Vec<ScheduleEntry>> {
        if html.contains(WRONG_VIEW_MARKER) {
            return Err(Error::WrongView);
        }

        let document = Html::parse_document(html);
        let table_selector =
            Selector::parse(SCHEDULE_TABLE_SELECTOR).expect("static selector is valid");
        let row_selector = Selector::parse("tr").expect("static selector is valid");
        let cell_selector = Selector::parse("td").expect("static selector is valid");

        let mut entries = Vec::new();
        for table in document.select(&table_selector) {
            self.extract_table(table, &row_selector, &cell_selector, &mut entries);
        }

        tracing::debug!(count = entries.len(), "extracted schedule entries");
        Ok(entries)
    }

    fn extract_table(
        &self,
        table: ElementRef<'_>,
        row_selector: &Selector,
        cell_selector: &Selector,
        entries: &mut Vec<ScheduleEntry>,
    ) {
        // Subject/course carry down from the row that opened the group.
        let mut current_subject = String::new();
        let mut current_course = String::new();

        for row in table.select(row_selector) {
            let cells: Vec<String> = row
                .select(cell_selector)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect();
            if cells.is_empty() {
                continue;
            }
            let col = |index: usize| cells.get(index).cloned().unwrap_or_default();

            // Rows whose type code is outside the recognized set are not
            // schedule rows (headers, filter rows), regardless of subject.
            let Some(schedule_type) = ScheduleType::from_code(&col(self.columns.schedule_type))
            else {
                continue;
            };

            let subject = col(self.columns.subject);
            if !subject.is_empty() {
                current_subject = subject;
                current_course = col(self.columns.course);
            } else if current_subject.is_empty() {
                // A typed row before any group has opened has nothing to
                // inherit from.
                tracing::warn!("schedule row with no subject outside a course group, discarding");
                continue;
            }

            let mut entry = ScheduleEntry {
                subject: current_subject.clone(),
                course: current_course.clone(),
                schedule_type,
                name: String::new(),
                crn: col(self.columns.crn),
                availability: col(self.columns.availability),
                days: col(self.columns.days),
                start_time: col(self.columns.start_time),
                end_time: col(self.columns.end_time),
                date_range: col(self.columns.date_range),
                room: col(self.columns.room),
                instructor: col(self.columns.instructor),
                requires: col(self.columns.requires),
                credits: col(self.columns.credits),
                grade_mode: col(self.columns.grade_mode),
            };
            entry.name = entry.display_name();
            entries.push(entry);
        }
    }
}

#[cfg(test)]
mod tests;
