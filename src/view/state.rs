use std::collections::BTreeMap;

use crate::domain::DEFAULT_PAGE_SIZE;
use crate::record::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    None,
    Ascending,
    Descending,
}

impl Direction {
    /// Next step of the `none -> ascending -> descending -> none` cycle.
    pub fn cycle(self) -> Self {
        match self {
            Direction::None => Direction::Ascending,
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::None,
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Direction::None => "",
            Direction::Ascending => "▲",
            Direction::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub column: Option<Field>,
    pub direction: Direction,
}

impl SortState {
    pub fn new(column: Field, direction: Direction) -> Self {
        SortState {
            column: Some(column),
            direction,
        }
    }

    pub fn is_active(&self) -> bool {
        self.column.is_some() && self.direction != Direction::None
    }

    pub fn direction_of(&self, field: Field) -> Direction {
        match self.column {
            Some(column) if column == field => self.direction,
            _ => Direction::None,
        }
    }

    /// Toggling the sorted column advances its direction, any other column
    /// starts out ascending.
    pub fn toggled(self, field: Field) -> Self {
        let direction = self.direction_of(field).cycle();
        if direction == Direction::None {
            SortState::default()
        } else {
            SortState::new(field, direction)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        PaginationState {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    Sensitive,
    #[default]
    Insensitive,
}

/// Complete filter, sort and paging configuration of a table view.
///
/// The state is a plain value. Every change produces a new state which the
/// engine swaps in, so a state can be kept and compared freely.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub global_filter: String,
    /// Only columns with an active filter have an entry.
    pub column_filters: BTreeMap<Field, String>,
    pub sort: SortState,
    pub pagination: PaginationState,
    pub case: CaseSensitivity,
}

impl ViewState {
    pub fn with_global_filter(mut self, text: impl Into<String>) -> Self {
        self.global_filter = text.into();
        self
    }

    /// An empty value removes the filter of that column.
    pub fn with_column_filter(mut self, field: Field, value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            self.column_filters.remove(&field);
        } else {
            self.column_filters.insert(field, value);
        }
        self
    }

    pub fn without_column_filter(mut self, field: Field) -> Self {
        self.column_filters.remove(&field);
        self
    }

    pub fn without_filters(mut self) -> Self {
        self.global_filter.clear();
        self.column_filters.clear();
        self
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationState) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_case(mut self, case: CaseSensitivity) -> Self {
        self.case = case;
        self
    }

    pub fn has_filters(&self) -> bool {
        !self.global_filter.is_empty() || !self.column_filters.is_empty()
    }

    /// True if `other` selects a different set of rows than `self`.
    pub(crate) fn filters_differ(&self, other: &ViewState) -> bool {
        self.global_filter != other.global_filter
            || self.column_filters != other.column_filters
            || self.case != other.case
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_toggle_cycles_through_all_directions() {
        let sort = SortState::default().toggled(Field::Title);
        assert_eq!(sort, SortState::new(Field::Title, Direction::Ascending));
        let sort = sort.toggled(Field::Title);
        assert_eq!(sort, SortState::new(Field::Title, Direction::Descending));
        let sort = sort.toggled(Field::Title);
        assert!(!sort.is_active());
        assert_eq!(sort.column, None);
    }

    #[test]
    fn toggling_another_column_starts_ascending() {
        let sort = SortState::new(Field::Title, Direction::Descending).toggled(Field::Price);
        assert_eq!(sort, SortState::new(Field::Price, Direction::Ascending));
        assert_eq!(sort.direction_of(Field::Title), Direction::None);
    }

    #[test]
    fn empty_column_filter_value_removes_the_entry() {
        let state = ViewState::default().with_column_filter(Field::Category, "beauty");
        assert_eq!(state.column_filters.len(), 1);
        let state = state.with_column_filter(Field::Category, "");
        assert!(state.column_filters.is_empty());
        assert!(!state.has_filters());
    }

    #[test]
    fn defaults_match_a_fresh_table() {
        let state = ViewState::default();
        assert_eq!(state.pagination.page_index, 0);
        assert_eq!(state.pagination.page_size, 10);
        assert_eq!(state.sort.direction, Direction::None);
        assert_eq!(state.case, CaseSensitivity::Insensitive);
    }
}
