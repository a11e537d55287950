//! Binary entry point for the plantree CLI.
#![forbid(unsafe_code)]

mod config;
mod ui;

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use plantree::{
    source::{DumpSource, SqliteSource},
    AnalyserOptions, PlanAnalyser, PlanError, PlanForest, PlanSource, PlanStepCollector,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;
use crate::ui::{Theme, Ui};

#[derive(Parser, Debug)]
#[command(
    name = "plantree",
    version,
    about = "Rebuild query execution plan trees from EXPLAIN output",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "PLANTREE_CONFIG",
        value_name = "FILE",
        help = "Path to the CLI config file"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        help = "Output format for structured responses [default: text]"
    )]
    format: Option<OutputFormat>,

    #[arg(long, global = true, value_enum, help = "Color theme [default: auto]")]
    theme: Option<ThemeArg>,

    #[arg(long, short, global = true, help = "Suppress headings and notices")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ExplainCmd {
    #[arg(value_name = "QUERY", help = "SELECT statement to explain")]
    query: String,

    #[arg(
        long,
        value_name = "FILE",
        conflicts_with = "sqlite",
        required_unless_present = "sqlite",
        help = "Recorded EXPLAIN result (.csv or .json) to replay"
    )]
    dump: Option<PathBuf>,

    #[arg(long, value_name = "DB", help = "SQLite database to run the plan query on")]
    sqlite: Option<PathBuf>,

    #[arg(long, value_name = "TEXT", help = "Override the explain directive")]
    explain_prefix: Option<String>,

    #[arg(long, value_name = "COLUMN", help = "Override the group identifier column")]
    group_column: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ConfigCmd {
    #[command(about = "Print effective configuration")]
    Show,
    #[command(about = "Set a configuration value and save the file")]
    Set {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Explain a query and print its plan tree")]
    Explain(ExplainCmd),

    #[command(subcommand, about = "Inspect or edit the CLI config")]
    Config(ConfigCmd),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum ThemeArg {
    Auto,
    Light,
    Dark,
    Plain,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Auto => Theme::Auto,
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Plain => Theme::Plain,
        }
    }
}

#[derive(Serialize)]
struct ExplainReport<'a> {
    query: &'a str,
    plan_query: &'a str,
    plan: &'a PlanForest,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        let code = match err.downcast_ref::<PlanError>() {
            Some(PlanError::UnsupportedStatementKind { .. }) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PLANTREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.clone())?;
    let format = cli.format.or(config.format()?).unwrap_or(OutputFormat::Text);
    let theme = cli.theme.or(config.theme()?).unwrap_or(ThemeArg::Auto);
    let ui = Ui::new(theme.into(), cli.quiet);

    match cli.command {
        Command::Explain(cmd) => {
            let options = build_analyser_options(&cmd, config.analyser_options());
            run_explain(&cmd, options, format, &ui)?;
        }
        Command::Config(ConfigCmd::Show) => {
            let path = config
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".into());
            let mut rows = vec![("path", path)];
            rows.extend(config.entries());
            ui.section("Configuration", rows);
        }
        Command::Config(ConfigCmd::Set { key, value }) => {
            config.set(&key, &value)?;
            let path = config.persist()?;
            ui.success(&format!("Saved {key} to {}", path.display()));
        }
    }

    Ok(())
}

fn build_analyser_options(cmd: &ExplainCmd, mut options: AnalyserOptions) -> AnalyserOptions {
    if let Some(prefix) = &cmd.explain_prefix {
        options.explain_prefix = prefix.clone();
    }
    if let Some(column) = &cmd.group_column {
        options.group_column = column.clone();
    }
    options
}

fn open_source(cmd: &ExplainCmd) -> Result<Box<dyn PlanSource>, PlanError> {
    match (&cmd.dump, &cmd.sqlite) {
        (Some(path), _) => Ok(Box::new(DumpSource::load(path)?)),
        (None, Some(path)) => Ok(Box::new(SqliteSource::open(path)?)),
        (None, None) => Err(PlanError::Dump {
            path: PathBuf::new(),
            message: "pass --dump or --sqlite".into(),
        }),
    }
}

fn run_explain(
    cmd: &ExplainCmd,
    options: AnalyserOptions,
    format: OutputFormat,
    ui: &Ui,
) -> Result<(), Box<dyn Error>> {
    let mut analyser = PlanAnalyser::with_options(cmd.query.as_str(), options);
    // Validate before opening the source.
    PlanStepCollector::validate(analyser.query_string())?;
    let mut source = open_source(cmd)?;
    analyser.explain(&mut source)?;
    let forest = analyser
        .plan_forest()
        .ok_or("plan analysis produced no forest")?;

    match format {
        OutputFormat::Json => {
            let report = ExplainReport {
                query: analyser.query_string(),
                plan_query: analyser.plan_query_string(),
                plan: forest,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            ui.info(&format!("plan query: {}", analyser.plan_query_string()));
            ui.plan(&format!("Execution plan ({} roots)", forest.len()), forest);
        }
    }
    Ok(())
}
