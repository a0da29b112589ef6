//! The table engine ties the view stages together.
//!
//! It owns the current records, the registered columns and the view state.
//! The state is only changed through the setters below, each of them builds
//! the next [`ViewState`] and hands it to [`TableEngine::transition`], which
//! re-runs the stages that are affected and keeps the page index in range.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::column::ColumnSet;
use crate::domain::TVError;
use crate::export;
use crate::record::{FIELD_ORDER, Field, Record};
use crate::view::{
    CaseSensitivity, Direction, PageWindow, PaginationState, SortState, ViewState, filter,
    pagination, sort,
};

/// Header information for one column, as needed to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    pub field: Field,
    pub label: String,
    pub width: Option<u16>,
    pub sortable: bool,
    pub filterable: bool,
    pub sort: Direction,
    pub filter: Option<String>,
}

pub struct TableEngine {
    columns: ColumnSet,
    records: Arc<Vec<Record>>,
    state: ViewState,
    filtered: Arc<Vec<usize>>, // Rows passing the filters, in record order
    rows: Arc<Vec<usize>>,     // Filtered rows in sort order
}

impl TableEngine {
    pub fn new(columns: ColumnSet) -> Self {
        Self::with_state(columns, ViewState::default())
    }

    pub fn with_state(columns: ColumnSet, state: ViewState) -> Self {
        let mut engine = TableEngine {
            columns,
            records: Arc::new(Vec::new()),
            state: ViewState::default(),
            filtered: Arc::new(Vec::new()),
            rows: Arc::new(Vec::new()),
        };
        engine.state = engine.sanitize(state);
        engine.refilter();
        engine.state.pagination = engine.state.pagination.clamped(engine.rows.len());
        engine
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Replaces all records. Filters and sort stay active.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        debug!("Replacing {} records with {}", self.records.len(), records.len());
        self.records = Arc::new(records);
        self.refilter();
        self.state.pagination = self.state.pagination.clamped(self.rows.len());
    }

    // -------------------- Setters ---------------------- //

    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        let next = self.state.clone().with_global_filter(text);
        self.transition(next);
    }

    /// Sets the filter value of a column. Returns false, without changing
    /// anything, if the column is unknown or can not be filtered.
    pub fn set_column_filter(&mut self, field: Field, value: impl Into<String>) -> bool {
        match self.columns.get(field) {
            Some(column) if column.is_filterable() => {
                let next = self.state.clone().with_column_filter(field, value);
                self.transition(next);
                true
            }
            _ => {
                trace!("Ignoring filter on column {field}");
                false
            }
        }
    }

    pub fn clear_column_filter(&mut self, field: Field) {
        let next = self.state.clone().without_column_filter(field);
        self.transition(next);
    }

    pub fn clear_filters(&mut self) {
        let next = self.state.clone().without_filters();
        self.transition(next);
    }

    /// Advances the sort of a column through none, ascending and descending.
    /// Returns the new direction of that column.
    pub fn toggle_sort(&mut self, field: Field) -> Direction {
        if !self.is_sortable(field) {
            trace!("Ignoring sort on column {field}");
            return self.state.sort.direction_of(field);
        }
        let next = self.state.clone().with_sort(self.state.sort.toggled(field));
        self.transition(next);
        self.state.sort.direction_of(field)
    }

    pub fn set_sort(&mut self, field: Field, direction: Direction) {
        if !self.is_sortable(field) {
            trace!("Ignoring sort on column {field}");
            return;
        }
        let sort = match direction {
            Direction::None => SortState::default(),
            _ => SortState::new(field, direction),
        };
        let next = self.state.clone().with_sort(sort);
        self.transition(next);
    }

    pub fn clear_sort(&mut self) {
        let next = self.state.clone().with_sort(SortState::default());
        self.transition(next);
    }

    pub fn set_case_sensitivity(&mut self, case: CaseSensitivity) {
        let next = self.state.clone().with_case(case);
        self.transition(next);
    }

    pub fn first_page(&mut self) {
        self.set_pagination(self.state.pagination.first());
    }

    pub fn previous_page(&mut self) {
        self.set_pagination(self.state.pagination.previous());
    }

    pub fn next_page(&mut self) {
        self.set_pagination(self.state.pagination.next(self.rows.len()));
    }

    pub fn last_page(&mut self) {
        self.set_pagination(self.state.pagination.last(self.rows.len()));
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.set_pagination(
            self.state
                .pagination
                .with_page_size(page_size, self.rows.len()),
        );
    }

    // -------------------- Queries ---------------------- //

    pub fn filtered_count(&self) -> usize {
        self.rows.len()
    }

    /// Filtered rows in sort order, spanning all pages.
    pub fn filtered_rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn filtered_records(&self) -> impl Iterator<Item = &Record> {
        self.rows.iter().map(|&idx| &self.records[idx])
    }

    pub fn page(&self) -> PageWindow {
        pagination::apply(&self.rows, self.state.pagination)
    }

    pub fn page_records(&self) -> Vec<&Record> {
        self.page()
            .rows
            .iter()
            .map(|&idx| &self.records[idx])
            .collect()
    }

    pub fn headers(&self) -> Vec<HeaderInfo> {
        self.columns
            .iter()
            .map(|c| HeaderInfo {
                field: c.field,
                label: c.label.clone(),
                width: c.width,
                sortable: c.sortable,
                filterable: c.is_filterable(),
                sort: self.state.sort.direction_of(c.field),
                filter: self.state.column_filters.get(&c.field).cloned(),
            })
            .collect()
    }

    /// Csv export of all filtered rows, independent of the current page.
    pub fn export_csv(&self) -> Result<Vec<u8>, TVError> {
        export::to_csv(&self.records, &self.rows, &FIELD_ORDER)
    }

    // -------------------- State handling ---------------------- //

    fn is_sortable(&self, field: Field) -> bool {
        self.columns.get(field).is_some_and(|c| c.sortable)
    }

    fn set_pagination(&mut self, pagination: PaginationState) {
        let next = self.state.clone().with_pagination(pagination);
        self.transition(next);
    }

    // Drops settings that refer to unknown, non sortable or non filterable
    // columns.
    fn sanitize(&self, mut state: ViewState) -> ViewState {
        state
            .column_filters
            .retain(|field, _| self.columns.get(*field).is_some_and(|c| c.is_filterable()));
        if let Some(field) = state.sort.column
            && !self.is_sortable(field)
        {
            state.sort = SortState::default();
        }
        state.pagination.page_size = state.pagination.page_size.max(1);
        state
    }

    fn transition(&mut self, next: ViewState) {
        let previous = std::mem::replace(&mut self.state, next);
        if previous.filters_differ(&self.state) {
            self.refilter();
        } else if previous.sort != self.state.sort {
            self.resort();
        }
        self.state.pagination = self.state.pagination.clamped(self.rows.len());
        trace!(
            "View: {} of {} rows, page {}/{}",
            self.rows.len(),
            self.records.len(),
            self.state.pagination.page_index + 1,
            self.state.pagination.page_count(self.rows.len())
        );
    }

    fn refilter(&mut self) {
        self.filtered = Arc::new(filter::apply(
            &self.records,
            &self.state.global_filter,
            &self.state.column_filters,
            &self.columns,
            self.state.case,
        ));
        self.resort();
    }

    fn resort(&mut self) {
        self.rows = Arc::new(sort::apply(
            &self.records,
            self.filtered.as_ref().clone(),
            &self.state.sort,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDescriptor;

    fn records(n: u64) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                let category = if i % 2 == 0 { "beauty" } else { "groceries" };
                Record::new(i, format!("Brand {i}"), format!("Title {i:03}"), category, 4.0, i as f64)
            })
            .collect()
    }

    fn engine(n: u64) -> TableEngine {
        let mut engine = TableEngine::new(ColumnSet::products());
        engine.replace_records(records(n));
        engine
    }

    #[test]
    fn filter_change_clamps_the_page() {
        let mut engine = engine(45);
        engine.last_page();
        assert_eq!(engine.state().pagination.page_index, 4);

        engine.set_column_filter(Field::Category, "beauty");
        assert_eq!(engine.filtered_count(), 22);
        assert_eq!(engine.state().pagination.page_index, 2);

        engine.set_global_filter("no such product");
        assert_eq!(engine.filtered_count(), 0);
        let page = engine.page();
        assert_eq!(engine.state().pagination.page_index, 0);
        assert_eq!(page.page_count, 1);
        assert!(page.is_empty());
    }

    #[test]
    fn rejects_filters_on_plain_columns() {
        let mut engine = engine(5);
        assert!(!engine.set_column_filter(Field::Price, "3"));
        assert!(engine.state().column_filters.is_empty());
        assert!(engine.set_column_filter(Field::Title, "00"));
        assert_eq!(engine.filtered_count(), 5);
    }

    #[test]
    fn non_sortable_columns_ignore_sort_requests() {
        let columns = ColumnSet::new([
            ColumnDescriptor::new(Field::Id, "Id"),
            ColumnDescriptor::new(Field::Title, "Title").sortable(false),
        ]);
        let mut engine = TableEngine::new(columns);
        engine.replace_records(records(3));
        assert_eq!(engine.toggle_sort(Field::Title), Direction::None);
        assert_eq!(engine.toggle_sort(Field::Price), Direction::None);
        assert_eq!(engine.toggle_sort(Field::Id), Direction::Ascending);
        assert_eq!(engine.toggle_sort(Field::Id), Direction::Descending);
        assert_eq!(engine.filtered_rows(), &[2, 1, 0]);
    }

    #[test]
    fn sort_survives_record_replacement() {
        let mut engine = engine(3);
        engine.set_sort(Field::Price, Direction::Descending);
        engine.replace_records(records(4));
        let ids: Vec<u64> = engine.filtered_records().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }

    #[test]
    fn page_records_follow_the_page_window() {
        let mut engine = engine(25);
        engine.set_page_size(20);
        engine.next_page();
        let ids: Vec<u64> = engine.page_records().iter().map(|r| r.id).collect();
        assert_eq!(ids, (21..=25).collect::<Vec<_>>());
        engine.next_page();
        assert_eq!(engine.state().pagination.page_index, 1);
        engine.previous_page();
        engine.previous_page();
        assert_eq!(engine.state().pagination.page_index, 0);
    }

    #[test]
    fn headers_report_sort_and_filter() {
        let mut engine = engine(4);
        engine.toggle_sort(Field::Title);
        engine.set_column_filter(Field::Category, "beauty");
        let headers = engine.headers();
        assert_eq!(headers.len(), 6);
        let title = headers.iter().find(|h| h.field == Field::Title).unwrap();
        assert_eq!(title.sort, Direction::Ascending);
        assert!(title.filterable);
        let category = headers.iter().find(|h| h.field == Field::Category).unwrap();
        assert_eq!(category.filter.as_deref(), Some("beauty"));
        let id = headers.iter().find(|h| h.field == Field::Id).unwrap();
        assert!(!id.filterable);
        assert_eq!(id.width, Some(5));
    }

    #[test]
    fn initial_state_is_sanitized() {
        let state = ViewState::default()
            .with_column_filter(Field::Price, "9")
            .with_pagination(PaginationState {
                page_index: 7,
                page_size: 0,
            });
        let engine = TableEngine::with_state(ColumnSet::products(), state);
        assert!(engine.state().column_filters.is_empty());
        assert_eq!(engine.state().pagination.page_size, 1);
        assert_eq!(engine.state().pagination.page_index, 0);
    }
}
