//! Command line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::model::Color;

#[derive(Parser, Debug)]
#[command(name = "redactor")]
#[command(about = "Batch-redact images by drawing filled rectangles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redact every image in a folder and save the metadata file
    Edit {
        /// Folder containing the images
        #[arg(required = true)]
        folder: PathBuf,

        /// Output metadata JSON file
        #[arg(short, long)]
        json: Option<PathBuf>,

        /// Folder for the rendered images
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Rectangle colour as #RRGGBB
        #[arg(long)]
        color: Option<Color>,

        /// Read input commands from a file instead of stdin
        #[arg(short, long)]
        script: Option<PathBuf>,
    },

    /// Regenerate rendered images from a metadata file
    Render {
        /// Metadata JSON file written by `edit`
        #[arg(required = true)]
        input: PathBuf,

        /// Folder for the rendered images
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Show or initialize the configuration file
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}
