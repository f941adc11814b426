use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docforge")]
#[command(author, version, about = "Document and image conversion service")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Convert a single local file
    Convert {
        /// Input file to convert
        #[arg(required = true)]
        input: PathBuf,

        /// Target format extension (e.g. pdf, docx, png)
        #[arg(long = "to")]
        to: String,

        /// Compress the converted file
        #[arg(long)]
        compress: bool,

        /// Directory for the result (defaults to the input's directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Delete expired uploads and converted files once
    Sweep,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
