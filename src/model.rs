use std::time::Instant;

use ratatui::crossterm::event::KeyEvent;
use tracing::{error, info, trace};

use crate::column::FilterKind;
use crate::domain::{CMDMode, HELP_TEXT, Message, PAGE_SIZES, TVConfig, TVError};
use crate::engine::{HeaderInfo, TableEngine};
use crate::export;
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::inputter::{InputResult, Inputter};
use crate::record::Field;
use crate::source::CategoryQuery;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    FAILED,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

/// Everything the ui needs to draw one frame.
#[derive(Debug, Clone)]
pub struct UIData {
    pub name: String,
    pub headers: Vec<HeaderInfo>,
    pub rows: Vec<Vec<String>>, // Cells of the current page, in column order
    pub selected_column: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub nrows: usize, // Filtered rows over all pages
    pub total_records: usize,
    pub can_previous: bool,
    pub can_next: bool,
    pub status: Status,
    pub load_error: Option<String>,
    pub global_filter: String,
    pub category: String,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

pub struct Model {
    config: TVConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    engine: TableEngine,
    fetcher: Fetcher,
    query: CategoryQuery,
    load_error: Option<String>,
    selected_column: usize,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    show_popup: bool,
    popup_message: String,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    /// Creates the model and issues the initial fetch.
    pub fn init(config: &TVConfig, engine: TableEngine, fetcher: Fetcher) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::LOADING,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            engine,
            fetcher,
            query: config.category.clone(),
            load_error: None,
            selected_column: 0,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            show_popup: false,
            popup_message: String::new(),
            status_message: "Started ctv!".to_string(),
            last_status_message_update: Instant::now(),
        };
        model.reload();
        model
    }

    pub fn engine(&self) -> &TableEngine {
        &self.engine
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn get_uidata(&self) -> UIData {
        let page = self.engine.page();
        let fields = self.engine.columns().fields();
        let records = self.engine.records();
        let rows = page
            .rows
            .iter()
            .map(|&idx| {
                fields
                    .iter()
                    .map(|&f| records[idx].display(f).into_owned())
                    .collect()
            })
            .collect();
        let state = self.engine.state();

        UIData {
            name: match &self.query {
                CategoryQuery::All => "Products".to_string(),
                CategoryQuery::Category(c) => format!("Products [{c}]"),
            },
            headers: self.engine.headers(),
            rows,
            selected_column: self.selected_column,
            page_index: page.page_index,
            page_count: page.page_count,
            page_size: page.page_size,
            nrows: page.total,
            total_records: records.len(),
            can_previous: page.can_previous,
            can_next: page.can_next,
            status: self.status,
            load_error: self.load_error.clone(),
            global_filter: state.global_filter.clone(),
            category: self.query.as_input().to_string(),
            show_popup: self.show_popup,
            popup_message: self.popup_message.clone(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        }
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), TVError> {
        let Some(msg) = message else {
            return Ok(());
        };

        // Fetch results are handled in every modus
        let msg = match msg {
            Message::Fetched(outcome) => {
                self.handle_fetched(outcome);
                return Ok(());
            }
            other => other,
        };

        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::Help => self.show_help(),
                Message::MoveLeft => self.select_column(-1),
                Message::MoveRight => self.select_column(1),
                Message::ToggleSort => self.toggle_sort(),
                Message::GlobalFilter => self.enter_cmd_mode(CMDMode::GlobalFilter),
                Message::ColumnFilter => self.filter_selected_column(),
                Message::CategoryQuery => self.enter_cmd_mode(CMDMode::Category),
                Message::ClearFilters => self.clear_filters(),
                Message::NextPage => self.engine.next_page(),
                Message::PreviousPage => self.engine.previous_page(),
                Message::FirstPage => self.engine.first_page(),
                Message::LastPage => self.engine.last_page(),
                Message::IncreasePageSize => self.cycle_page_size(true),
                Message::DecreasePageSize => self.cycle_page_size(false),
                Message::Export => self.export(),
                Message::Reload => self.reload(),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter | Message::Help => self.exit(),
                _ => (),
            },
            Modus::CMDINPUT => {
                if let Message::RawKey(key) = msg {
                    self.raw_input(key)
                }
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    fn selected_field(&self) -> Option<Field> {
        self.engine
            .columns()
            .at(self.selected_column)
            .map(|c| c.field)
    }

    fn handle_fetched(&mut self, outcome: FetchOutcome) {
        let Some((query, result)) = self.fetcher.accept(outcome) else {
            return;
        };
        match result {
            Ok(records) => {
                let count = records.len();
                self.engine.replace_records(records);
                self.load_error = None;
                self.status = Status::READY;
                info!("Loaded {count} products for {query:?}");
                self.set_status_message(format!("Loaded {count} products"));
            }
            Err(e) => {
                error!("Loading products for {query:?} failed: {e}");
                // A failed fetch never shows partial or outdated data
                self.engine.replace_records(Vec::new());
                self.load_error = Some(e.to_string());
                self.status = Status::FAILED;
                self.set_status_message("Error loading products");
            }
        }
    }

    fn reload(&mut self) {
        self.status = Status::LOADING;
        self.fetcher.request(self.query.clone());
        self.set_status_message("Loading ...");
    }

    fn exit(&mut self) {
        if self.modus == Modus::POPUP {
            trace!("Close popup ...");
            self.modus = self.previous_modus;
            self.previous_modus = Modus::POPUP;
            self.show_popup = false;
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.popup_message = HELP_TEXT.to_string();
        self.show_popup = true;
    }

    fn select_column(&mut self, step: i32) {
        let ncolumns = self.engine.columns().len();
        if ncolumns == 0 {
            return;
        }
        self.selected_column = if step < 0 {
            self.selected_column.saturating_sub(1)
        } else {
            std::cmp::min(self.selected_column + 1, ncolumns - 1)
        };
        trace!("Selected column {}", self.selected_column);
    }

    fn toggle_sort(&mut self) {
        let Some(field) = self.selected_field() else {
            return;
        };
        let direction = self.engine.toggle_sort(field);
        self.set_status_message(format!("Sort {field}: {direction:?}"));
    }

    fn filter_selected_column(&mut self) {
        let Some(column) = self.engine.columns().at(self.selected_column).cloned() else {
            return;
        };
        match column.filter {
            FilterKind::NoFilter => {
                self.set_status_message(format!("Column {} can not be filtered", column.label));
            }
            FilterKind::FreeText => self.enter_cmd_mode(CMDMode::ColumnFilter(column.field)),
            FilterKind::SingleSelect { options } => {
                // Cycle "All" -> options[0] -> ... -> options[n-1] -> "All"
                let current = self.engine.state().column_filters.get(&column.field);
                let next = match current.and_then(|c| options.iter().position(|o| o == c)) {
                    None => options.first().cloned().unwrap_or_default(),
                    Some(idx) => options.get(idx + 1).cloned().unwrap_or_default(),
                };
                self.engine.set_column_filter(column.field, next.as_str());
                let shown = if next.is_empty() { "All" } else { next.as_str() };
                self.set_status_message(format!("{}: {shown}", column.label));
            }
        }
    }

    fn clear_filters(&mut self) {
        self.engine.clear_filters();
        self.set_status_message("Cleared all filters");
    }

    fn cycle_page_size(&mut self, larger: bool) {
        let current = self.engine.state().pagination.page_size;
        let next = match PAGE_SIZES.iter().position(|&s| s == current) {
            Some(idx) if larger => PAGE_SIZES[std::cmp::min(idx + 1, PAGE_SIZES.len() - 1)],
            Some(idx) => PAGE_SIZES[idx.saturating_sub(1)],
            None => PAGE_SIZES[0],
        };
        self.engine.set_page_size(next);
        self.set_status_message(format!("Show {next}"));
    }

    fn export(&mut self) {
        let path = self.config.export_path.clone();
        let result = self
            .engine
            .export_csv()
            .and_then(|bytes| export::write_file(&path, &bytes));
        match result {
            Ok(()) => self.set_status_message(format!(
                "Exported {} rows to {}",
                self.engine.filtered_count(),
                path.display()
            )),
            Err(e) => {
                error!("Export to {} failed: {e}", path.display());
                self.set_status_message(format!("Export failed: {e}"));
            }
        }
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {mode:?} ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);
        self.active_cmdinput = true;

        // Global filter and category query exclude each other
        match mode {
            CMDMode::GlobalFilter if self.query != CategoryQuery::All => {
                self.query = CategoryQuery::All;
                self.status = Status::LOADING;
                self.fetcher.request_debounced(CategoryQuery::All);
            }
            CMDMode::Category if !self.engine.state().global_filter.is_empty() => {
                self.engine.set_global_filter("");
            }
            _ => (),
        }

        self.input.clear();
        let current = match mode {
            CMDMode::GlobalFilter => self.engine.state().global_filter.clone(),
            CMDMode::ColumnFilter(field) => self
                .engine
                .state()
                .column_filters
                .get(&field)
                .cloned()
                .unwrap_or_default(),
            CMDMode::Category => self.query.as_input().to_string(),
        };
        self.input.set(&current);
        self.last_input = self.input.get();
    }

    fn leave_cmd_mode(&mut self) {
        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        self.cmd_mode = None;
    }

    // Every edit is applied right away, Enter keeps the text and Esc clears it.
    fn raw_input(&mut self, key: KeyEvent) {
        if !self.active_cmdinput {
            return;
        }
        self.last_input = self.input.read(key);
        let text = self.last_input.input.clone();

        if self.last_input.changed {
            match self.cmd_mode {
                Some(CMDMode::GlobalFilter) => self.engine.set_global_filter(text.as_str()),
                Some(CMDMode::ColumnFilter(field)) => {
                    self.engine.set_column_filter(field, text.as_str());
                }
                Some(CMDMode::Category) => {
                    let query = CategoryQuery::from_input(&text);
                    if query != self.query {
                        self.query = query.clone();
                        self.status = Status::LOADING;
                        self.fetcher.request_debounced(query);
                    }
                }
                None => info!("Cmd mode is none!"),
            }
        }

        if self.last_input.finished {
            if self.cmd_mode == Some(CMDMode::GlobalFilter) {
                self.set_status_message(format!(
                    "Found {} results",
                    self.engine.filtered_count()
                ));
            }
            self.leave_cmd_mode();
        }
    }
}
