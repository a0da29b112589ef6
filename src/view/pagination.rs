use crate::view::PaginationState;

/// Number of pages needed for `total` rows. Never less than one, an empty
/// table still shows a single (empty) page.
pub fn page_count(total: usize, page_size: usize) -> usize {
    std::cmp::max(1, total.div_ceil(page_size.max(1)))
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        PaginationState {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_count(&self, total: usize) -> usize {
        page_count(total, self.page_size)
    }

    /// Moves the page index back into `[0, page_count - 1]`.
    pub fn clamped(self, total: usize) -> Self {
        let last = self.page_count(total) - 1;
        PaginationState {
            page_index: self.page_index.min(last),
            page_size: self.page_size.max(1),
        }
    }

    pub fn first(self) -> Self {
        PaginationState {
            page_index: 0,
            ..self
        }
    }

    pub fn previous(self) -> Self {
        PaginationState {
            page_index: self.page_index.saturating_sub(1),
            ..self
        }
    }

    pub fn next(self, total: usize) -> Self {
        PaginationState {
            page_index: self.page_index.saturating_add(1),
            ..self
        }
        .clamped(total)
    }

    pub fn last(self, total: usize) -> Self {
        PaginationState {
            page_index: self.page_count(total) - 1,
            ..self
        }
    }

    /// Changes the page size. The page index is only clamped, not reset.
    pub fn with_page_size(self, page_size: usize, total: usize) -> Self {
        PaginationState {
            page_index: self.page_index,
            page_size: page_size.max(1),
        }
        .clamped(total)
    }
}

/// One page of a row mapping together with its navigation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub rows: Vec<usize>,
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total: usize,
    pub can_previous: bool,
    pub can_next: bool,
}

impl PageWindow {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of the first row of this page within all rows.
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }
}

/// Slices the page selected by `pagination` out of `rows`.
pub fn apply(rows: &[usize], pagination: PaginationState) -> PageWindow {
    let page_size = pagination.page_size.max(1);
    let page_count = page_count(rows.len(), page_size);
    let begin = pagination.page_index.saturating_mul(page_size);
    let window = if begin < rows.len() {
        let end = std::cmp::min(begin + page_size, rows.len());
        rows[begin..end].to_vec()
    } else {
        Vec::new()
    };

    PageWindow {
        rows: window,
        page_index: pagination.page_index,
        page_size,
        page_count,
        total: rows.len(),
        can_previous: pagination.page_index > 0,
        can_next: pagination.page_index < page_count - 1,
    }
}
