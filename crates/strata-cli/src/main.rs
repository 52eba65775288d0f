use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use strata::manifest::StrataManifest;
use strata::output::OutputFormat;
use strata::{build_program, check_program, run_compile, CompileSettings};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Resolve component sources into platform-neutral schema programs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Project manifest (defaults to ./strata.toml when present)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Directory containing component sources
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Entry source file, relative to the source directory
    #[arg(short, long)]
    entry: Option<PathBuf>,

    /// Fail when any property type is ambiguous
    #[arg(long)]
    deny_ambiguous: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the program and print or write it
    Compile {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the program and report ambiguous property types
    Check {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Print components in dependency order
    Order {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(cli.debug)
            .with_writer(std::io::stderr)
            .init();
    }

    let base = base_settings(cli.manifest.as_ref())?;

    match cli.command {
        Commands::Compile {
            sources,
            format,
            output,
        } => {
            let mut settings = apply_source_args(base, &sources);
            if let Some(format) = format {
                settings.format = format;
            }
            if output.is_some() {
                settings.output = output;
            }
            if let Some(rendered) = run_compile(&settings)? {
                println!("{}", rendered);
            }
            Ok(())
        }
        Commands::Check { sources } => {
            let settings = apply_source_args(base, &sources);
            let program = build_program(&settings)?;
            check_program(&program, settings.deny_ambiguous)?;
            println!("{}", program.diagnostics());
            Ok(())
        }
        Commands::Order { sources } => {
            let settings = apply_source_args(base, &sources);
            let program = build_program(&settings)?;
            for name in program.dependency_order() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

fn base_settings(manifest: Option<&PathBuf>) -> Result<CompileSettings> {
    match manifest {
        Some(path) => {
            let manifest = StrataManifest::from_file(path)?;
            let base_dir = path.parent().map(PathBuf::from).unwrap_or_default();
            Ok(CompileSettings::from_manifest(&manifest, &base_dir))
        }
        None => {
            let cwd = std::env::current_dir()?;
            Ok(match StrataManifest::discover(&cwd)? {
                Some(manifest) => CompileSettings::from_manifest(&manifest, &cwd),
                None => CompileSettings::default(),
            })
        }
    }
}

fn apply_source_args(mut settings: CompileSettings, args: &SourceArgs) -> CompileSettings {
    if let Some(dir) = &args.source_dir {
        settings.source_dir = dir.clone();
    }
    if let Some(entry) = &args.entry {
        settings.entry = entry.clone();
    }
    settings.deny_ambiguous |= args.deny_ambiguous;
    settings
}
