use std::path::PathBuf;
use std::time::Duration;

use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

use crate::fetcher::FetchOutcome;
use crate::record::Field;
use crate::source::{CategoryQuery, DEFAULT_CATALOG_URL, FetchError};
use crate::view::{CaseSensitivity, Direction};

/// Page sizes offered by the page size selector.
pub const PAGE_SIZES: [usize; 3] = [10, 20, 30];

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_EXPORT_FILE: &str = "sample.csv";

pub const HELP_TEXT: &str = "\
q        quit
?        show this help
Esc      close popup / cancel input
Left     select previous column
Right    select next column
s        toggle sort of selected column (none, asc, desc)
/        global filter
f        filter selected column
c        fetch products of a category
x        clear all filters
n / p    next / previous page
g / G    first / last page
+ / -    larger / smaller page size
e        export filtered rows as csv
r        reload products";

#[derive(Debug, thiserror::Error)]
pub enum TVError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),

    #[error("Fetching products failed: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Logging setup failed: {0}")]
    LoggingFailed(String),
}

#[derive(Debug)]
pub enum Message {
    Quit,
    Help,
    Exit,
    Enter,
    MoveLeft,
    MoveRight,
    ToggleSort,
    GlobalFilter,
    ColumnFilter,
    CategoryQuery,
    ClearFilters,
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    IncreasePageSize,
    DecreasePageSize,
    Export,
    Reload,
    RawKey(KeyEvent),
    Fetched(FetchOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    GlobalFilter,
    ColumnFilter(Field),
    Category,
}

#[derive(Debug, Clone)]
pub struct TVConfig {
    pub catalog_url: String,
    pub request_timeout: Option<Duration>,
    pub debounce: Duration,
    pub event_poll_time: u64,
    pub page_size: usize,
    pub case: CaseSensitivity,
    pub category: CategoryQuery,
    pub global_filter: String,
    pub sort: Option<(Field, Direction)>,
    pub export_path: PathBuf,
}

impl Default for TVConfig {
    fn default() -> Self {
        TVConfig {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            request_timeout: None,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            event_poll_time: 100,
            page_size: DEFAULT_PAGE_SIZE,
            case: CaseSensitivity::default(),
            category: CategoryQuery::All,
            global_filter: String::new(),
            sort: None,
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
        }
    }
}
