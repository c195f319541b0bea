use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, error};

use err_x509::constants::{TOOL_NAME, TOOL_VERSION};
use err_x509::interfaces::{FileFixer, FileReport, FixOptions};
use err_x509::models::{Classification, FixWarning};
use err_x509::utils::file::file_exists;
use err_x509::Settings;

const DEFAULT_SETTINGS_FILES: [&str; 3] = ["err_x509.toml", "err_x509.yaml", "err_x509.yml"];

/// Fix Clash x509 certificate errors by adding skip-cert-verify to every proxy
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a settings file (YAML or TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fix certificate errors in one configuration file
    Fix {
        /// Input file; defaults to the first of x509_no_fix.yaml, config.yaml, clash.yaml found
        input: Option<PathBuf>,

        /// Output file; defaults to x509_fixed.yaml or <input>_fixed.yaml
        output: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Copy the original file to <input>.backup first
        #[arg(short, long)]
        backup: bool,

        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,

        /// Show what would be done without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fix every configuration file in a directory
    Batch {
        directory: PathBuf,

        /// File pattern to match; `*.yaml` also selects the other configured YAML extensions
        #[arg(short, long, value_name = "PATTERN")]
        pattern: Option<String>,

        #[arg(short, long)]
        verbose: bool,

        #[arg(short, long)]
        force: bool,

        #[arg(long)]
        dry_run: bool,
    },
    /// List the proxies of a file and what would change
    Preview { input: PathBuf },
    /// Show version, platform and settings information
    Check,
}

impl Command {
    fn verbose(&self) -> bool {
        match self {
            Command::Fix { verbose, .. } | Command::Batch { verbose, .. } => *verbose,
            Command::Preview { .. } | Command::Check => false,
        }
    }
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    if let Some(path) = path {
        return Settings::load_from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()));
    }
    for candidate in DEFAULT_SETTINGS_FILES {
        if file_exists(candidate) {
            return Settings::load_from_file(candidate)
                .with_context(|| format!("failed to load settings from {}", candidate));
        }
    }
    debug!("No settings file found, using defaults");
    Ok(Settings::default())
}

fn print_file_report(file: &FileReport) {
    let summary = &file.report.summary;
    println!();
    println!("Statistics:");
    println!("   Fixed proxies:                 {}", summary.rewritten_count);
    println!("   Already had skip-cert-verify:  {}", summary.already_compliant_count);
    println!("   Total proxies found:           {}", summary.proxy_count());

    match file.report.warning {
        Some(FixWarning::EmptyDocument) => {
            println!();
            println!("WARNING: {} is empty", file.input.display());
        }
        Some(FixWarning::NoProxiesFound) => {
            println!();
            println!("WARNING: no proxies found in {}", file.input.display());
            println!("Possible reasons:");
            println!("  1. The file has no 'proxies:' section");
            println!("  2. The proxy format was not recognized");
            println!("Supported formats:");
            println!("  - flow:  - {{ name: ..., server: ..., port: ... }}");
            println!("  - block: - name: ...  (fields on the following indented lines)");
        }
        None => {}
    }

    println!();
    println!("Input:  {}", file.input.display());
    if file.written {
        println!("Output: {}", file.output.display());
    } else {
        println!("Output: {} (dry run, not written)", file.output.display());
    }
    if let Some(backup) = &file.backup {
        println!("Backup: {}", backup.display());
    }

    if let Some(change) = &summary.first_change {
        println!();
        println!("Example change:");
        println!("BEFORE: {}", change.before.trim());
        println!("AFTER:  {}", change.after.trim());
    }
}

fn run_fix(
    settings: Settings,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    options: FixOptions,
    json: bool,
) -> anyhow::Result<()> {
    let fixer = FileFixer::new(settings, options);
    let input = match input {
        Some(input) => input,
        None => match fixer.find_default_input(Path::new(".")) {
            Some(found) => {
                println!("Using default file: {}", found.display());
                found
            }
            None => bail!(
                "no input file specified and none of {} found",
                fixer.settings().default_input_files.join(", ")
            ),
        },
    };

    let file = fixer.fix_file(&input, output.as_deref())?;
    if json {
        let value = serde_json::json!({
            "input": file.input,
            "output": file.output,
            "written": file.written,
            "summary": file.report.summary,
            "warning": file.report.warning,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_file_report(&file);
    }
    Ok(())
}

fn run_batch(
    settings: Settings,
    directory: &Path,
    pattern: Option<&str>,
    options: FixOptions,
) -> anyhow::Result<()> {
    let fixer = FileFixer::new(settings, options);

    if options.dry_run {
        for input in fixer.batch_inputs(directory, pattern)? {
            println!(
                "   {} -> {}",
                input.display(),
                fixer.output_path_for(&input).display()
            );
        }
        return Ok(());
    }

    let results = fixer.fix_directory(directory, pattern)?;
    let mut succeeded = 0;
    let mut total_fixed = 0;
    for entry in &results {
        match &entry.result {
            Ok(file) => {
                succeeded += 1;
                total_fixed += file.report.summary.rewritten_count;
                println!(
                    "   OK   {} -> {} ({} fixed)",
                    entry.input.display(),
                    file.output.display(),
                    file.report.summary.rewritten_count
                );
            }
            Err(err) => println!("   FAIL {}: {}", entry.input.display(), err),
        }
    }

    println!();
    println!("Successful: {}/{}", succeeded, results.len());
    println!("Total proxies fixed: {}", total_fixed);
    if succeeded != results.len() {
        bail!("{} files failed", results.len() - succeeded);
    }
    Ok(())
}

fn run_preview(settings: Settings, input: &Path) -> anyhow::Result<()> {
    let fixer = FileFixer::new(settings, FixOptions::default());
    let entries = fixer.preview(input)?;
    if entries.is_empty() {
        println!("No proxies found in {}", input.display());
        return Ok(());
    }

    println!("Found {} proxies:", entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let status = match entry.classification {
            Classification::NeedsFix => "will add skip-cert-verify: true",
            Classification::AlreadyCompliant => "already has skip-cert-verify",
            Classification::NotAProxy => continue,
        };
        println!(
            "  {}. {} -> {} [{}] {}",
            i + 1,
            entry.name,
            entry.server,
            entry.syntax,
            status
        );
    }
    Ok(())
}

fn run_check(settings: &Settings) {
    println!("{} v{}", TOOL_NAME, TOOL_VERSION);
    println!(
        "Platform: {} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    if settings.pref_path.is_empty() {
        println!("Settings: defaults");
    } else {
        println!("Settings: {}", settings.pref_path);
    }
    println!(
        "Default inputs: {}",
        settings.default_input_files.join(", ")
    );
    for name in &settings.default_input_files {
        if file_exists(name) {
            println!("  found {}", name);
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let settings = load_settings(args.config.as_deref())?;

    match args.command {
        Command::Fix {
            input,
            output,
            backup,
            force,
            dry_run,
            json,
            ..
        } => run_fix(
            settings,
            input,
            output,
            FixOptions {
                backup,
                force,
                dry_run,
            },
            json,
        ),
        Command::Batch {
            directory,
            pattern,
            force,
            dry_run,
            ..
        } => run_batch(
            settings,
            &directory,
            pattern.as_deref(),
            FixOptions {
                backup: false,
                force,
                dry_run,
            },
        ),
        Command::Preview { input } => run_preview(settings, &input),
        Command::Check => {
            run_check(&settings);
            Ok(())
        }
    }
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize the logger
    let default_level = if args.command.verbose() { "debug" } else { "info" };
    env_logger::init_from_env(Env::default().default_filter_or(default_level));

    if let Err(err) = run(args) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
