use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use catalog_tv::column::ColumnSet;
use catalog_tv::controller::Controller;
use catalog_tv::domain::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_EXPORT_FILE, DEFAULT_PAGE_SIZE, Message, TVConfig, TVError,
};
use catalog_tv::engine::TableEngine;
use catalog_tv::export;
use catalog_tv::fetcher::Fetcher;
use catalog_tv::logging::{LogTarget, init_logging};
use catalog_tv::model::{Model, Status};
use catalog_tv::record::Field;
use catalog_tv::source::{CatalogClient, CategoryQuery, DEFAULT_CATALOG_URL, RecordSource};
use catalog_tv::ui::TableUI;
use catalog_tv::view::{CaseSensitivity, Direction, PaginationState, SortState, ViewState};

/// Browse a remote product catalog in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Products endpoint
    #[arg(long, env = "CTV_URL", default_value = DEFAULT_CATALOG_URL)]
    url: String,

    /// Only fetch products of this category
    #[arg(long, env = "CTV_CATEGORY", default_value = "")]
    category: String,

    #[arg(long, env = "CTV_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Initial global filter
    #[arg(long, default_value = "")]
    filter: String,

    /// Initial sort, e.g. `price:desc`
    #[arg(long, value_name = "FIELD[:asc|desc]")]
    sort: Option<String>,

    /// Match the global filter case sensitive
    #[arg(long)]
    case_sensitive: bool,

    /// Write the filtered products as csv to PATH and exit
    #[arg(long, value_name = "PATH")]
    export: Option<String>,

    /// Timeout of a single request
    #[arg(long, env = "CTV_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Quiet interval of the category input before fetching
    #[arg(long, env = "CTV_DEBOUNCE_MS", default_value_t = DEFAULT_DEBOUNCE_MS)]
    debounce_ms: u64,

    /// Log file used while the table is shown
    #[arg(long, env = "CTV_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn parse_sort(raw: &str) -> Result<(Field, Direction), TVError> {
    let (field, direction) = match raw.split_once(':') {
        Some((field, direction)) => (field, direction),
        None => (raw, "asc"),
    };
    let direction = match direction.trim().to_ascii_lowercase().as_str() {
        "asc" => Direction::Ascending,
        "desc" => Direction::Descending,
        other => {
            return Err(TVError::InvalidArgument(format!(
                "Unknown sort direction \"{other}\""
            )));
        }
    };
    Ok((field.parse()?, direction))
}

impl Args {
    fn config(&self) -> Result<TVConfig, TVError> {
        let sort = self.sort.as_deref().map(parse_sort).transpose()?;
        let export_path = match &self.export {
            Some(path) => export::expand_path(path)?,
            None => PathBuf::from(DEFAULT_EXPORT_FILE),
        };
        Ok(TVConfig {
            catalog_url: self.url.clone(),
            request_timeout: self.timeout_secs.map(Duration::from_secs),
            debounce: Duration::from_millis(self.debounce_ms),
            page_size: self.page_size.max(1),
            case: if self.case_sensitive {
                CaseSensitivity::Sensitive
            } else {
                CaseSensitivity::Insensitive
            },
            category: CategoryQuery::from_input(&self.category),
            global_filter: self.filter.clone(),
            sort,
            export_path,
            ..TVConfig::default()
        })
    }
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run() -> Result<(), TVError> {
    let args = Args::parse();
    let config = args.config()?;
    let headless = args.export.is_some();

    let log_target = match (&args.log_file, headless) {
        (_, true) => LogTarget::Stderr,
        (Some(path), false) => LogTarget::File(path.as_path()),
        (None, false) => LogTarget::Disabled,
    };
    init_logging(log_target)?;
    debug!("Config: {config:?}");

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let mut client = CatalogClient::new(&config.catalog_url)?;
    if let Some(timeout) = config.request_timeout {
        client = client.with_timeout(timeout);
    }

    if headless {
        export_headless(&runtime, &client, &config)
    } else {
        run_tui(&runtime, client, &config)
    }
}

fn initial_engine(config: &TVConfig) -> TableEngine {
    let mut state = ViewState::default()
        .with_global_filter(config.global_filter.as_str())
        .with_pagination(PaginationState::new(config.page_size))
        .with_case(config.case);
    if let Some((field, direction)) = config.sort {
        state = state.with_sort(SortState::new(field, direction));
    }
    TableEngine::with_state(ColumnSet::products(), state)
}

fn export_headless(
    runtime: &Runtime,
    client: &CatalogClient,
    config: &TVConfig,
) -> Result<(), TVError> {
    let records = runtime.block_on(client.fetch(&config.category))?;
    let mut engine = initial_engine(config);
    engine.replace_records(records);
    let bytes = engine.export_csv()?;
    export::write_file(&config.export_path, &bytes)?;
    info!(
        "Wrote {} of {} products to {}",
        engine.filtered_count(),
        engine.records().len(),
        config.export_path.display()
    );
    Ok(())
}

fn run_tui(runtime: &Runtime, client: CatalogClient, config: &TVConfig) -> Result<(), TVError> {
    let (fetcher, mut outcomes) =
        Fetcher::new(Arc::new(client), runtime.handle().clone(), config.debounce);
    let mut model = Model::init(config, initial_engine(config), fetcher);
    let mut ui = TableUI::new();
    let controller = Controller::new(config);

    let mut terminal = ratatui::init();
    let result = (|| -> Result<(), TVError> {
        while model.status != Status::QUITTING {
            // Render the current view
            terminal.draw(|f| ui.draw(&model, f))?;

            // Handle events and map to a Message
            let message = controller.handle_event(&model)?;
            model.update(message)?;

            // Fetch results arrive from the runtime
            while let Ok(outcome) = outcomes.try_recv() {
                model.update(Some(Message::Fetched(outcome)))?;
            }
        }
        Ok(())
    })();
    ratatui::restore();
    result
}
