// Spellbook - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation
// 3. Loading the spell export
// 4. Applying filters and printing the listing, detail, or export

use clap::Parser;
use spellbook::app::fetch::FetchConfig;
use spellbook::app::state::AppState;
use spellbook::core::classify::Classifier;
use spellbook::core::export::{export, ExportFormat};
use spellbook::core::filter::QueryMode;
use spellbook::platform::config::{load_config, load_explicit_config, AppConfig, PlatformPaths};
use spellbook::util::{
    self,
    error::{Result, SpellbookError},
};
use std::io::Write;
use std::path::PathBuf;

/// Spellbook - browse, filter and export spell records from a flat text export.
///
/// Classes are default-closed: nothing is listed until at least one class
/// is selected with --class or --all-classes, or a search is run.
#[derive(Parser, Debug)]
#[command(name = "spellbook", version, about)]
struct Cli {
    /// Spell export to load: an http(s) URL or a local file path.
    source: String,

    /// Select a class label (repeatable).
    #[arg(short = 'c', long = "class")]
    classes: Vec<String>,

    /// Select every enabled class.
    #[arg(short = 'a', long = "all-classes")]
    all_classes: bool,

    /// Hide spells whose name contains "passive".
    #[arg(long = "hide-passives")]
    hide_passives: bool,

    /// Hide spells whose name contains "hidden".
    #[arg(long = "hide-hidden")]
    hide_hidden: bool,

    /// Case-insensitive search over spell names and ids.
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Query path: class, search or combined.
    #[arg(short = 'm', long = "mode")]
    mode: Option<QueryMode>,

    /// Class membership strategy: direct or spell-family.
    #[arg(long = "classifier")]
    classifier: Option<Classifier>,

    /// Print class labels with eligible record counts instead of spells.
    #[arg(short = 'l', long = "list-classes")]
    list_classes: bool,

    /// Show the detail and copy string of the spell with this id.
    #[arg(long = "select")]
    select: Option<String>,

    /// Write the listed spells to this file.
    #[arg(short = 'o', long = "export")]
    export: Option<PathBuf>,

    /// Export format: csv, json or lines.
    #[arg(long = "format", default_value = "csv")]
    format: ExportFormat,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Query path for this run: explicit flag, then a search implying the
/// search path, then config.
fn resolve_mode(cli: &Cli, config: &AppConfig) -> QueryMode {
    match (cli.mode, cli.search.is_some(), config.query_mode) {
        (Some(mode), _, _) => mode,
        (None, true, QueryMode::Class) => QueryMode::Search,
        (None, _, configured) => configured,
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    let classifier = cli.classifier.unwrap_or(config.classifier);
    let mut state = AppState::new(classifier, resolve_mode(cli, config));
    state.set_max_records(config.max_records);
    state.set_hide_passives(cli.hide_passives || config.hide_passives);
    state.set_hide_hidden(cli.hide_hidden || config.hide_hidden);

    let fetch_config = FetchConfig {
        timeout_secs: config.fetch_timeout_secs,
        max_bytes: config.max_source_bytes,
        allow_files: config.allow_files,
    };
    state.load_source(&cli.source, &fetch_config)?;
    tracing::info!("{}", state.status_message);

    for warning in &state.warnings {
        tracing::warn!("{}", warning);
    }

    for label in &cli.classes {
        if !state.class_index().is_enabled(label) {
            tracing::warn!(class = %label, "Class has no eligible spells");
        }
        state.set_class_selected(label, true);
    }
    if cli.all_classes {
        state.toggle_select_all();
    }
    if let Some(ref term) = cli.search {
        state.set_search(term);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let io_err = |source| SpellbookError::Io {
        path: PathBuf::from("<stdout>"),
        operation: "write",
        source,
    };

    if cli.list_classes {
        for bucket in &state.class_index().buckets {
            let marker = if bucket.is_enabled() { "" } else { " (disabled)" };
            writeln!(
                out,
                "{}: {}{marker}",
                bucket.label,
                bucket.record_indices.len()
            )
            .map_err(io_err)?;
        }
        return Ok(());
    }

    if let Some(ref id) = cli.select {
        if state.select_id(id).is_none() {
            tracing::warn!(id = %id, "No spell with this id");
        }
        let detail = state.selected_detail();
        writeln!(out, "{}", detail.display_text).map_err(io_err)?;
        writeln!(out).map_err(io_err)?;
        writeln!(out, "Name: {}", detail.sanitized_token).map_err(io_err)?;
        writeln!(out, "Id: {}", detail.id).map_err(io_err)?;
        writeln!(out, "Copy: {}", detail.export_line()).map_err(io_err)?;
        return Ok(());
    }

    if let Some(ref path) = cli.export {
        let file = std::fs::File::create(path).map_err(|source| SpellbookError::Io {
            path: path.clone(),
            operation: "create export file",
            source,
        })?;
        export(
            cli.format,
            state.filtered_records(),
            std::io::BufWriter::new(file),
            path,
        )?;
        return Ok(());
    }

    for record in state.filtered_records() {
        writeln!(out, "{}", record.list_label()).map_err(io_err)?;
    }
    tracing::info!(
        listed = state.filtered_indices().len(),
        total = state.records().len(),
        mode = %state.query_mode(),
        "Query complete"
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config {
        Some(ref path) => load_explicit_config(path).map_err(SpellbookError::from),
        None => Ok(load_config(&PlatformPaths::resolve().config_file())),
    };
    let (config, config_warnings) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            util::logging::init(cli.debug, None);
            tracing::error!(error = %e, "Spellbook failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "Spellbook starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    if let Err(e) = run(&cli, &config) {
        tracing::error!(error = %e, "Spellbook failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
