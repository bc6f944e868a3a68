use clap::Parser;
use color_eyre::Result;
use distdash::{
    render::render_text, AppConfig, Args, ConfigManager, Dashboard, DashboardSelection,
    DimensionSelection, FileFormat, LoadOptions, OutputFormat, ResolvedColumns, Table,
    APP_NAME, DEFAULT_DATA_FILE,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn data_path(args: &Args, config: &AppConfig) -> PathBuf {
    args.path
        .clone()
        .or_else(|| config.dashboard.data_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

/// Config file values first, then command-line flags on top.
fn load_options(args: &Args, config: &AppConfig, path: &std::path::Path) -> LoadOptions {
    let mut opts = config.load_options();
    let format = args.format.or_else(|| FileFormat::from_path(path));
    if opts.delimiter.is_none() {
        if let Some(format) = format {
            opts = opts.with_delimiter(format.delimiter());
        }
    }
    if let Some(delimiter) = args.delimiter {
        opts = opts.with_delimiter(delimiter);
    }
    if let Some(no_header) = args.no_header {
        opts = opts.with_has_header(!no_header);
    }
    if let Some(rows) = args.infer_schema_length {
        opts = opts.with_infer_schema_length(rows);
    }
    opts
}

fn dashboard_selection(args: &Args) -> DashboardSelection {
    let districts = if args.no_districts {
        DimensionSelection::values(Vec::<String>::new())
    } else if args.districts.is_empty() {
        DimensionSelection::All
    } else {
        DimensionSelection::values(args.districts.iter().cloned())
    };
    DashboardSelection {
        districts,
        pillar: args.pillar.clone(),
    }
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let config_manager = ConfigManager::new(APP_NAME)?;
        let path = config_manager.write_default_config(args.force)?;
        println!("Configuration file written to {}", path.display());
        return Ok(Some(()));
    }
    Ok(None)
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let path = data_path(args, config);
    let table = Table::from_csv(&path, &load_options(args, config, &path))?;

    let mut overrides: BTreeMap<String, String> = config.columns.clone();
    overrides.extend(args.column_overrides());
    let columns = ResolvedColumns::resolve(&table, &overrides);
    columns.require_essential()?;

    let mut options = config.dashboard_options();
    if let Some(top_n) = args.top_n {
        options.top_n = top_n;
    }

    let selection = dashboard_selection(args).to_selection(&columns)?;
    let report = Dashboard::new(&columns, options).compute(&table, &selection)?;
    info!(rows = report.rows, "dashboard computed");

    match args.output.unwrap_or_default() {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    let config = AppConfig::load(APP_NAME)?;
    let level = if args.debug {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    init_tracing(level, args.log_json || config.logging.json);

    run(&args, &config)
}
