//! k2merge: CLI tool for merging rule sources into a Shadowrocket config.

use clap::{Parser, Subcommand};
use k2merge::converter::Dialect;
use k2merge::{pipeline, ExactDomainMode, HttpFetcher, MergeConfig, RuleOrder, SourceConfig};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "k2merge")]
#[command(author = "Kaitu.io")]
#[command(version)]
#[command(about = "Merge whitelist and block list sources into a Shadowrocket config", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sources and write the merged config
    Generate {
        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Whitelist location (URL, file:// URL or path)
        #[arg(short, long)]
        whitelist: Option<String>,

        /// Format of the whitelist source
        #[arg(long)]
        whitelist_dialect: Option<Dialect>,

        /// Block list location (URL, file:// URL or path)
        #[arg(short, long)]
        blocklist: Option<String>,

        /// Skip the block list entirely
        #[arg(long, conflicts_with = "blocklist")]
        no_blocklist: bool,

        /// Output config file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the config to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,

        /// Sort rules within each tier
        #[arg(long)]
        sorted: bool,

        /// Emit plain domains as DOMAIN-SUFFIX instead of DOMAIN
        #[arg(long)]
        exact_as_suffix: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Parse a local source file and report what would be imported
    Check {
        /// Source file
        #[arg(short, long)]
        input: PathBuf,

        /// Format of the source file
        #[arg(short, long, default_value = "whitelist")]
        dialect: Dialect,

        /// List every accepted rule
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Options of the `generate` subcommand that override the config file.
struct GenerateArgs {
    config: Option<PathBuf>,
    whitelist: Option<String>,
    whitelist_dialect: Option<Dialect>,
    blocklist: Option<String>,
    no_blocklist: bool,
    output: Option<PathBuf>,
    sorted: bool,
    exact_as_suffix: bool,
}

fn main() {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Generate { verbose, .. } | Commands::Check { verbose, .. } => *verbose,
    };
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Generate {
            config,
            whitelist,
            whitelist_dialect,
            blocklist,
            no_blocklist,
            output,
            stdout,
            sorted,
            exact_as_suffix,
            json,
            verbose: _,
        } => {
            let args = GenerateArgs {
                config,
                whitelist,
                whitelist_dialect,
                blocklist,
                no_blocklist,
                output,
                sorted,
                exact_as_suffix,
            };
            generate(args, stdout, json)
        }
        Commands::Check {
            input,
            dialect,
            verbose,
        } => check(&input, dialect, verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_config(args: GenerateArgs) -> k2merge::Result<MergeConfig> {
    let mut config = match &args.config {
        Some(path) => MergeConfig::load(path)?,
        None => MergeConfig::default(),
    };

    if let Some(url) = args.whitelist {
        config.whitelist.url = url;
    }
    if let Some(dialect) = args.whitelist_dialect {
        config.whitelist.dialect = Some(dialect);
    }
    if args.no_blocklist {
        config.blocklist = None;
    } else if let Some(url) = args.blocklist {
        config.blocklist = Some(SourceConfig::new(url, Dialect::Blocklist));
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if args.sorted {
        config.order = RuleOrder::Sorted;
    }
    if args.exact_as_suffix {
        config.exact_domain = ExactDomainMode::DomainSuffix;
    }

    config.validate()?;
    Ok(config)
}

fn generate(args: GenerateArgs, stdout: bool, json: bool) -> k2merge::Result<()> {
    let config = build_config(args)?;
    let fetcher = HttpFetcher::with_options(config.timeout(), &config.user_agent)?;

    let output = if stdout {
        let output = pipeline::run(&config, &fetcher)?;
        print!("{}", output.text);
        output
    } else {
        pipeline::run_to_file(&config, &fetcher)?
    };

    if json {
        let summary = output.summary.to_json()?;
        if stdout {
            eprintln!("{}", summary);
        } else {
            println!("{}", summary);
        }
    } else if stdout {
        eprintln!("{}", output.summary);
    } else {
        println!("{}", output.summary);
        println!("Successfully wrote {:?}", config.output);
    }

    Ok(())
}

fn check(input: &Path, dialect: Dialect, verbose: bool) -> k2merge::Result<()> {
    let text = fs::read_to_string(input)?;
    let parsed = dialect.parse(&text, &Default::default());

    if verbose {
        for rule in &parsed.rules {
            println!("{}", rule);
        }
    }

    let stats = &parsed.stats;
    println!(
        "{:?} ({}): {} lines, {} accepted, {} parse errors, {} validation errors, {} ignored",
        input,
        dialect,
        stats.lines,
        stats.accepted,
        stats.parse_errors,
        stats.validation_errors,
        stats.ignored
    );
    if !parsed.header_comments.is_empty() {
        println!("Header comments: {}", parsed.header_comments.len());
    }

    Ok(())
}
