use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use mrename_core::{
    app_paths, dump_metadata, encoding_for_label, load_config, rename_directory, save_config,
    AppConfig, BatchResult, DumpOptions, DumpReport, FileFailure, RenameOptions,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset; keeps per-file warnings visible.
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "mrename", version)]
#[command(about = "Rename photos and videos after the date and time they were taken")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rename JPEG, HEIC, TIFF and MOV files in a folder
    Rename(RenameArgs),
    /// Save or display the metadata of a file or folder
    Dump(DumpArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    /// Write the default configuration file
    Init {
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct RenameArgs {
    directory: PathBuf,
    /// New file name prefix
    #[arg(short, long)]
    prefix: Option<String>,
    /// New file name postfix
    #[arg(short = 'f', long)]
    postfix: Option<String>,
    /// strftime pattern for the new file name
    #[arg(short = 's', long = "time-stamp")]
    time_stamp: Option<String>,
    /// Only simulate renaming
    #[arg(short, long, default_value_t = false)]
    dry: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Args)]
struct DumpArgs {
    path: PathBuf,
    /// Save metadata for all files in a folder
    #[arg(short, long, default_value_t = false)]
    folder: bool,
    /// Only display metadata, do not create files
    #[arg(short, long, default_value_t = false)]
    display: bool,
    /// Code page for string values
    #[arg(short, long, default_value = "utf_8")]
    encoding: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Dump(args) => cmd_dump(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Init { force } => cmd_config_init(force),
        },
    }
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let config = load_config()?;
    let options = RenameOptions {
        directory: args.directory,
        prefix: args.prefix.unwrap_or(config.prefix),
        postfix: args.postfix.unwrap_or(config.postfix),
        time_stamp: args.time_stamp.unwrap_or(config.time_stamp),
        dry_run: args.dry,
    };
    tracing::debug!("rename options: {:?}", options);

    let result = rename_directory(options)?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table => print_rename_report(&result),
    }
    Ok(())
}

fn cmd_dump(args: DumpArgs) -> Result<()> {
    let report = dump_metadata(&DumpOptions {
        target: args.path,
        folder: args.folder,
        display: args.display,
        encoding: encoding_for_label(&args.encoding)?,
    })?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_dump_report(&report),
    }
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_config_init(force: bool) -> Result<()> {
    let paths = app_paths()?;
    if paths.config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite it",
            paths.config_path.display()
        );
    }
    let path = save_config(&AppConfig::default())?;
    println!("wrote {}", path.display());
    Ok(())
}

fn print_failures(failures: &[FileFailure]) {
    for failure in failures {
        println!(
            "File {} cannot be processed. {}.",
            failure.path.display(),
            failure.reason
        );
    }
}

fn print_rename_report(result: &BatchResult) {
    print_failures(&result.failures);

    if result.dry_run {
        for rename in &result.renames {
            println!(
                "{}\t{}",
                rename.source.display(),
                rename.destination.display()
            );
        }
        println!();
        println!("Note: an index will be appended to the resulting file names if they are the same.");
    } else {
        println!("{}", summary_line(result));
    }
}

fn summary_line(result: &BatchResult) -> String {
    format!(
        "Done. {} files renamed (already named {}, failed {}, skipped {}).",
        result.renamed,
        result.unchanged,
        result.failures.len(),
        result.filtered
    )
}

fn print_dump_report(report: &DumpReport) {
    print_failures(&report.failures);

    for entry in &report.entries {
        match &entry.sidecar {
            Some(sidecar) => println!("{} -> {}", entry.path.display(), sidecar.display()),
            None => {
                println!("{}", entry.path.display());
                print!("{}", entry.text);
                println!("{}", "-".repeat(10));
            }
        }
    }
}
