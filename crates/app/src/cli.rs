use clap::{Parser, Subcommand, ValueEnum};
use companion_core::ProjectFormat;
use std::path::PathBuf;

/// Inspect and maintain nested tile projects
#[derive(Parser, Debug)]
#[command(name = "companion", author, version, about, long_about = None)]
pub struct Args {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print project metadata and the tile tree
    Inspect {
        #[arg(value_name = "PROJECT")]
        project: PathBuf,
    },
    /// Load a project against the sound-file catalog and report offline references
    Validate {
        #[arg(value_name = "PROJECT")]
        project: PathBuf,

        /// Directory to scan for sound files (defaults to the configured catalog_dir)
        #[arg(short = 'c', long = "catalog", value_name = "DIR")]
        catalog: Option<PathBuf>,
    },
    /// Rewrite a project in another file format
    Convert {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        #[arg(short = 'f', long = "format", value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
    },
    /// Write an empty project
    New {
        #[arg(value_name = "PATH")]
        path: PathBuf,

        #[arg(short = 'n', long = "name", default_value = "Untitled")]
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Msgpack,
}

impl From<FormatArg> for ProjectFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => ProjectFormat::Json,
            FormatArg::Msgpack => ProjectFormat::MessagePack,
        }
    }
}
