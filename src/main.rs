//! sitedesk - pagination and view preferences for the back office.
//!
//! Usage:
//!   sitedesk window --page 2 --size 20 --total 45   Page selector for a list
//!   sitedesk prefs show admin-users                 Stored preferences of a page
//!   sitedesk prefs view admin-users grid            Switch a page to grid view
//!   sitedesk query admin-users --total 45           Backend query for a page
//!   sitedesk --help                                 Show help

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use itertools::Itertools;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sitedesk_core::{
    Filters, PageWindow, PaginationConfig, SortOrder, ViewMode, compute_window, should_render,
};
use sitedesk_store::{FileStorage, PagePreferences, PreferenceStore, UserSettings};

#[derive(Parser)]
#[command(
    name = "sitedesk",
    version,
    about = "Pagination and per-page view preferences for the sitedesk back office",
    long_about = "sitedesk keeps the view preferences of back-office listing pages \
                  (view mode, page size, current page, sort, filters) and computes \
                  the page selector shown under each list."
)]
struct Cli {
    /// Directory holding stored preferences (overrides settings)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log store activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the page selector for a list
    Window {
        /// Current page (1-based)
        #[arg(short, long, default_value = "1")]
        page: u64,

        /// Items per page
        #[arg(short, long, default_value = "20")]
        size: u64,

        /// Total items reported by the backend
        #[arg(short, long)]
        total: u64,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Inspect or change stored page preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsCommand,
    },

    /// Print the list endpoint query for a page
    Query {
        /// Page id (e.g. admin-users)
        page_id: String,

        /// Total items, to also print the page selector
        #[arg(short, long)]
        total: Option<u64>,
    },
}

#[derive(Subcommand)]
enum PrefsCommand {
    /// List pages with stored preferences
    List,

    /// Show preferences of a page
    Show {
        page_id: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Set list or grid view (returns to page 1)
    View { page_id: String, mode: ViewModeArg },

    /// Set rows per page (returns to page 1)
    Size { page_id: String, size: u64 },

    /// Jump to a page
    Page { page_id: String, page: u64 },

    /// Go to the next page
    Next {
        page_id: String,

        /// Total items reported by the backend
        #[arg(short, long)]
        total: u64,
    },

    /// Go to the previous page
    Prev {
        page_id: String,

        /// Total items reported by the backend
        #[arg(short, long)]
        total: u64,
    },

    /// Set the sort field and direction (keeps the page)
    Sort {
        page_id: String,

        /// Field to sort on; omit to clear the sort
        field: Option<String>,

        /// Sort direction
        #[arg(short, long, default_value = "asc")]
        order: SortOrderArg,
    },

    /// Replace the filters of a page (returns to page 1)
    Filter {
        page_id: String,

        /// Filters as KEY=VALUE; none clears all filters
        filters: Vec<String>,
    },

    /// Forget the preferences of a page
    Reset { page_id: String },

    /// Forget the preferences of every page
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ViewModeArg {
    List,
    Grid,
}

impl From<ViewModeArg> for ViewMode {
    fn from(arg: ViewModeArg) -> Self {
        match arg {
            ViewModeArg::List => ViewMode::List,
            ViewModeArg::Grid => ViewMode::Grid,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortOrderArg {
    Asc,
    Desc,
}

impl From<SortOrderArg> for SortOrder {
    fn from(arg: SortOrderArg) -> Self {
        match arg {
            SortOrderArg::Asc => SortOrder::Asc,
            SortOrderArg::Desc => SortOrder::Desc,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Window {
            page,
            size,
            total,
            format,
        } => run_window(page, size, total, format)?,
        Command::Prefs { action } => {
            let (store, config) = open_store(cli.store, cli.config)?;
            run_prefs(&store, &config, action)?;
        }
        Command::Query { page_id, total } => {
            let (store, _) = open_store(cli.store, cli.config)?;
            run_query(&store, &page_id, total);
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Open the file-backed store described by settings and flags.
fn open_store(
    store_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<(PreferenceStore, PaginationConfig)> {
    let settings = match config_path {
        Some(path) => UserSettings::load_from(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => UserSettings::load(),
    };

    let config = settings
        .pagination_config()
        .context("Invalid pagination settings")?;
    let options = settings.store_options()?;
    let dir = match store_dir {
        Some(dir) => dir,
        None => settings
            .resolved_storage_dir()
            .context("Cannot locate preference storage")?,
    };

    let storage = FileStorage::new(&dir)
        .with_context(|| format!("Cannot open preference storage in {}", dir.display()))?;
    let store = PreferenceStore::open(Arc::new(storage), options);
    debug!(
        dir = %dir.display(),
        key = %store.options().key,
        pages = store.page_ids().len(),
        "Opened preference store"
    );
    Ok((store, config))
}

/// Print the page selector for explicit numbers.
fn run_window(page: u64, size: u64, total: u64, format: OutputFormat) -> Result<()> {
    if size == 0 {
        bail!("Page size must be positive");
    }

    if !should_render(total) {
        match format {
            OutputFormat::Text => println!("No items."),
            OutputFormat::Json => println!("null"),
        }
        return Ok(());
    }

    let window = compute_window(page, size, total);
    match format {
        OutputFormat::Text => print_window(&window),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&window)?),
    }
    Ok(())
}

fn run_prefs(
    store: &PreferenceStore,
    config: &PaginationConfig,
    action: PrefsCommand,
) -> Result<()> {
    match action {
        PrefsCommand::List => {
            let snapshot = store.snapshot();
            if snapshot.is_empty() {
                println!("No stored preferences.");
            }
            for page_id in snapshot.page_ids() {
                println!(" {:<24} {}", page_id, summarize(&snapshot.get(page_id.as_str())));
            }
        }
        PrefsCommand::Show { page_id, format } => {
            let prefs = store.get_page_preferences(&page_id);
            match format {
                OutputFormat::Text => print_preferences(&page_id, &prefs),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&prefs)?),
            }
        }
        PrefsCommand::View { page_id, mode } => {
            store.set_view_mode(page_id.as_str(), mode.into())?;
            print_preferences(&page_id, &store.get_page_preferences(&page_id));
        }
        PrefsCommand::Size { page_id, size } => {
            config.check_page_size(size)?;
            store.set_page_size(page_id.as_str(), size)?;
            print_preferences(&page_id, &store.get_page_preferences(&page_id));
        }
        PrefsCommand::Page { page_id, page } => {
            if page == 0 {
                bail!("Pages start at 1");
            }
            store.set_current_page(page_id.as_str(), page)?;
            print_preferences(&page_id, &store.get_page_preferences(&page_id));
        }
        PrefsCommand::Next { page_id, total } => {
            let page = store.next_page(page_id.as_str(), total)?;
            println!("{page_id}: page {page}");
        }
        PrefsCommand::Prev { page_id, total } => {
            let page = store.previous_page(page_id.as_str(), total)?;
            println!("{page_id}: page {page}");
        }
        PrefsCommand::Sort {
            page_id,
            field,
            order,
        } => {
            store.set_sort(page_id.as_str(), field, order.into())?;
            print_preferences(&page_id, &store.get_page_preferences(&page_id));
        }
        PrefsCommand::Filter { page_id, filters } => {
            let filters = Filters::parse_assignments(&filters)?;
            store.set_filters(page_id.as_str(), filters)?;
            print_preferences(&page_id, &store.get_page_preferences(&page_id));
        }
        PrefsCommand::Reset { page_id } => {
            store.reset_page_preferences(page_id.as_str())?;
            println!("Reset preferences for {page_id}.");
        }
        PrefsCommand::Clear => {
            store.clear_all_preferences()?;
            println!("Cleared all stored preferences.");
        }
    }

    Ok(())
}

fn run_query(store: &PreferenceStore, page_id: &str, total: Option<u64>) {
    println!("?{}", store.list_query(page_id).to_query_string());

    if let Some(total) = total {
        match store.window(page_id, total) {
            Some(window) => print_window(&window),
            None => println!("No items."),
        }
    }
}

fn print_window(window: &PageWindow) {
    println!("{window}");
    println!(
        "{}  (page {} of {})",
        window.selector_line(),
        window.current_page,
        window.total_pages
    );
}

fn print_preferences(page_id: &str, prefs: &PagePreferences) {
    println!("{}", "─".repeat(40));
    println!(" {page_id}");
    println!("{}", "─".repeat(40));
    println!(" View:      {}", prefs.view_mode);
    println!(" Page size: {}", prefs.page_size);
    println!(" Page:      {}", prefs.current_page);
    println!(
        " Sort:      {}",
        prefs
            .sort_by
            .as_deref()
            .map_or_else(|| "none".to_string(), |field| format!("{field} {}", prefs.sort_order))
    );
    if prefs.filters.is_empty() {
        println!(" Filters:   none");
    } else {
        println!(
            " Filters:   {}",
            prefs
                .filters
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .join(", ")
        );
    }
}

/// One-line summary for `prefs list`.
fn summarize(prefs: &PagePreferences) -> String {
    format!(
        "{} view, {} per page, page {}{}",
        prefs.view_mode,
        prefs.page_size,
        prefs.current_page,
        if prefs.filters.is_empty() {
            String::new()
        } else {
            format!(", {} filter(s)", prefs.filters.len())
        }
    )
}
