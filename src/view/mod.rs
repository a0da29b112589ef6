//! The stages of the table view: filtering, sorting and paging.
//!
//! Each stage is a pure function over a slice of records and a list of row
//! indices into it. The stages never copy records, they only produce new row
//! mappings, which are chained as `filter -> sort -> pagination`.

pub mod filter;
pub mod pagination;
pub mod sort;
mod state;

pub use pagination::{PageWindow, page_count};
pub use state::{CaseSensitivity, Direction, PaginationState, SortState, ViewState};
