use clap::{ArgAction, Args, Parser, Subcommand};
use pathclip::clipboard::{ClipboardSink, StdoutSink, SystemClipboard};
use pathclip::config::{Config, ConfigStore, CONFIG_ENV_VAR};
use pathclip::copy::{BasicClipboardCopier, ClipboardCopier, CopyOptions};
use pathclip::errors::PathClipError;
use pathclip::formatter::OutputFormat;
use pathclip::ignore::ExcludePatterns;
use pathclip::logger::initialize_logger;
use pathclip::range::{apply_removal, parse_removal};
use pathclip::reporting::summarize;
use pathclip::resolver::PathResolver;
use pathclip::validator::stat_path;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Use this config file instead of the per-user default
    #[arg(long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: SubCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum SubCommands {
    /// Add files, directories or glob patterns to the list
    Add(AddArgs),
    /// Remove entries by 1-based index, range (2-4) or path
    Remove(RemoveArgs),
    /// Show the stored list
    List,
    /// Empty the stored list
    Clear,
    /// Copy the contents of the stored list (or the given inputs)
    Copy(CopyArgs),
    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug, Clone)]
struct AddArgs {
    #[arg(required = true)]
    inputs: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct RemoveArgs {
    #[arg(required = true)]
    identifiers: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct CopyArgs {
    /// Copy these instead of the stored list
    inputs: Vec<String>,
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
    #[arg(long, conflicts_with = "no_headers")]
    headers: bool,
    #[arg(long)]
    no_headers: bool,
    /// Per-file size limit in bytes
    #[arg(long)]
    max_size: Option<u64>,
    /// Number of files read in parallel
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Print to stdout instead of the clipboard
    #[arg(long)]
    stdout: bool,
    /// Skip the per-file size and token summary
    #[arg(short = 's', long)]
    no_stats: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum ConfigCommand {
    Show,
    Set(ConfigSetArgs),
}

#[derive(Args, Debug, Clone)]
struct ConfigSetArgs {
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
    #[arg(long)]
    headers: Option<bool>,
    #[arg(long)]
    max_size: Option<u64>,
    /// Replace the exclude patterns (repeatable)
    #[arg(long = "exclude")]
    exclude: Option<Vec<String>>,
    #[arg(long)]
    clear_excludes: bool,
    #[arg(long)]
    tokenizer_model: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli_args = CliArgs::parse();
    initialize_logger(cli_args.verbose, cli_args.quiet);

    if let Err(e) = run(cli_args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli_args: CliArgs) -> Result<(), PathClipError> {
    let store = match cli_args.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::default_location()?,
    };
    debug!("Using config file {}", store.path().display());
    let mut config = store.load()?;

    match cli_args.cmd {
        SubCommands::Add(args) => add(&store, &mut config, &args.inputs),
        SubCommands::Remove(args) => remove(&store, &mut config, &args.identifiers),
        SubCommands::List => {
            list(&config);
            Ok(())
        }
        SubCommands::Clear => {
            let count = config.file_paths.len();
            config.file_paths.clear();
            store.save(&config)?;
            println!("Cleared {} paths", count);
            Ok(())
        }
        SubCommands::Copy(args) => copy(&config, args, cli_args.quiet).await,
        SubCommands::Config(ConfigCommand::Show) => {
            println!("# {}", store.path().display());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        SubCommands::Config(ConfigCommand::Set(args)) => set_config(&store, &mut config, args),
    }
}

fn resolver_for(config: &Config) -> Result<PathResolver, PathClipError> {
    Ok(PathResolver::new()?.exclude(ExcludePatterns::new(&config.exclude_patterns)))
}

fn add(store: &ConfigStore, config: &mut Config, inputs: &[String]) -> Result<(), PathClipError> {
    let resolution = resolver_for(config)?.resolve_inputs(inputs);
    for item in &resolution.unresolved {
        eprintln!("Skipped {}: {}", item.input, item.reason);
    }
    if resolution.paths.is_empty() {
        return Err(PathClipError::NoContent(
            "no files matched the given inputs".to_owned(),
        ));
    }

    let added = config.add_paths(&resolution.paths);
    store.save(config)?;
    for path in &added {
        info!("Added {}", path.display());
    }
    println!(
        "Added {} paths ({} already present, {} total)",
        added.len(),
        resolution.paths.len() - added.len(),
        config.file_paths.len()
    );
    Ok(())
}

fn remove(
    store: &ConfigStore,
    config: &mut Config,
    identifiers: &[String],
) -> Result<(), PathClipError> {
    let spec = parse_removal(identifiers, config.file_paths.len());
    for token in &spec.invalid_inputs {
        eprintln!("Invalid index or range: {}", token);
    }
    for index in &spec.out_of_range {
        eprintln!(
            "Index {} is out of range (list has {} entries)",
            index,
            config.file_paths.len()
        );
    }

    let resolver = resolver_for(config)?;
    let paths: Vec<PathBuf> = spec.paths.iter().map(|p| resolver.to_absolute(p)).collect();
    for (token, path) in spec.paths.iter().zip(&paths) {
        if !config.file_paths.contains(path) {
            eprintln!("Not in list: {}", token);
        }
    }

    let removed = apply_removal(&mut config.file_paths, &spec.indices, &paths);
    if removed.is_empty() {
        return Err(PathClipError::InvalidPath(format!(
            "nothing matched: {}",
            identifiers.join(" ")
        )));
    }

    store.save(config)?;
    for path in &removed {
        println!("Removed {}", path.display());
    }
    println!("{} paths remain", config.file_paths.len());
    Ok(())
}

fn list(config: &Config) {
    if config.file_paths.is_empty() {
        println!("No paths stored. Add some with `pathclip add <path>`.");
        return;
    }
    for (i, path) in config.file_paths.iter().enumerate() {
        let marker = match stat_path(path) {
            Ok(stats) if stats.is_file => "",
            Ok(stats) if stats.exists => " [not a file]",
            Ok(_) => " [missing]",
            Err(_) => " [unreadable]",
        };
        println!("{:>4}. {}{}", i + 1, path.display(), marker);
    }
}

async fn copy(config: &Config, args: CopyArgs, quiet: bool) -> Result<(), PathClipError> {
    let mut options = CopyOptions::from_config(config);
    if let Some(format) = args.format {
        options.format = format;
    }
    if args.headers {
        options.include_headers = true;
    }
    if args.no_headers {
        options.include_headers = false;
    }
    if let Some(max_size) = args.max_size {
        options.max_file_size = max_size;
    }
    if let Some(jobs) = args.jobs {
        options.concurrency = jobs.max(1);
    }
    if args.no_stats || quiet {
        options.tokenizer_model = None;
    }

    if args.inputs.is_empty() && config.file_paths.is_empty() {
        return Err(PathClipError::NoContent(
            "the path list is empty; add files with `pathclip add`".to_owned(),
        ));
    }

    let mut sink: Box<dyn ClipboardSink> = if args.stdout {
        Box::new(StdoutSink)
    } else {
        Box::new(SystemClipboard)
    };

    let copier = BasicClipboardCopier::new(options)?;
    let outcome = if args.inputs.is_empty() {
        copier
            .copy_entries(&config.file_paths, sink.as_mut())
            .await?
    } else {
        copier
            .copy_files_to_clipboard(args.inputs, sink.as_mut())
            .await?
    };

    if !quiet {
        eprint!(
            "{}",
            summarize(&outcome.aggregation.result, &outcome.resolution.unresolved)
        );
        if let Some(stats) = &outcome.stats {
            eprint!("{}", stats);
        }
    }

    if !outcome.delivered {
        return Err(PathClipError::NoContent(
            "none of the files could be read".to_owned(),
        ));
    }
    if !args.stdout && !quiet {
        eprintln!("Copied to clipboard.");
    }
    Ok(())
}

fn set_config(
    store: &ConfigStore,
    config: &mut Config,
    args: ConfigSetArgs,
) -> Result<(), PathClipError> {
    if let Some(format) = args.format {
        config.output_format = format;
    }
    if let Some(headers) = args.headers {
        config.include_headers = headers;
    }
    if let Some(max_size) = args.max_size {
        config.max_file_size = max_size;
    }
    if args.clear_excludes {
        config.exclude_patterns.clear();
    }
    if let Some(exclude) = args.exclude {
        config.exclude_patterns = exclude;
    }
    if let Some(model) = args.tokenizer_model {
        config.tokenizer_model = model;
    }
    store.save(config)?;
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
