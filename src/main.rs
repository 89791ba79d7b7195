use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;

use tagpack::{probe, ArchiveProcessor, Compressor, DockerEngine, ImageEngine, NerdctlEngine, Notifier};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Engine {
    Docker,
    Nerdctl,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long,
        global = true,
        help = "Also append log output to this file (e.g. manage.log)"
    )]
    log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Verbose mode (-v for debug, -vv for trace)"
    )]
    verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        value_enum,
        default_value = "docker",
        help = "Container engine to use"
    )]
    engine: Engine,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Save every local image with the given tag as a compressed archive
    Save {
        #[arg(long, help = "Image tag to save (e.g. 1.0.2v)")]
        tag: String,

        #[arg(
            long,
            default_value = ".",
            help = "Directory to write .tag.gz archives to"
        )]
        out_dir: PathBuf,
    },
    /// Load every .tag.gz archive found in a directory
    Load {
        #[arg(
            long,
            default_value = ".",
            help = "Directory to read .tag.gz archives from"
        )]
        in_dir: PathBuf,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let notifier = match Notifier::new(cli.verbose, cli.log_file.as_deref()) {
        Ok(notifier) => notifier,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    notifier.debug(&format!("Debug logging enabled. Arguments: {:?}", cli));

    let result = match cli.engine {
        Engine::Docker => run(DockerEngine::new(), &cli.command, &notifier),
        Engine::Nerdctl => run(NerdctlEngine::new(), &cli.command, &notifier),
    };

    if let Err(e) = result {
        notifier.error(&format!("{:#}", e));
        process::exit(1);
    }
}

fn run<E: ImageEngine>(engine: E, command: &Commands, notifier: &Notifier) -> Result<()> {
    probe::ensure_available(&[engine.program()], notifier)?;

    let compressor = Compressor::detect(notifier);

    match command {
        Commands::Save { tag, out_dir } => {
            probe::ensure_available(&[compressor.compress_program()], notifier)?;
            let processor = ArchiveProcessor::new(engine, compressor, notifier);
            processor.save(tag, out_dir)?;
        }
        Commands::Load { in_dir } => {
            probe::ensure_available(&[compressor.decompress_program()], notifier)?;
            let processor = ArchiveProcessor::new(engine, compressor, notifier);
            processor.load(in_dir)?;
        }
    }

    Ok(())
}
