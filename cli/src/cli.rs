use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "hannou")]
#[command(about = "Command-line client for the Hannou image board", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server address, e.g. http://127.0.0.1:8000
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// CSRF token sent with uploads, tag edits and deletes
    #[arg(long, global = true)]
    pub csrf_token: Option<String>,

    /// Browser cookie string to take the CSRF token from (its `csrftoken`)
    #[arg(long, global = true, env = "HANNOU_COOKIE")]
    pub cookie: Option<String>,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the gallery
    List {
        /// Only images without tags
        #[arg(long)]
        tagless: bool,
    },
    /// Search images by tag (no query shows everything)
    Search {
        /// Query, sent to the server as typed
        query: Vec<String>,
    },
    /// Upload an image from a file or the clipboard
    Upload {
        /// Image to upload; the clipboard is pasted when omitted
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        /// Caption/tags for the image
        #[arg(long, short = 't')]
        text: Option<String>,

        /// Write the upload preview to this PNG file
        #[arg(long)]
        thumbnail: Option<PathBuf>,
    },
    /// Replace the tags of an image
    Tag {
        /// Image ID (file name)
        id: String,

        /// New tags, separated by spaces, commas or semicolons
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Delete an image
    Delete {
        /// Image ID (file name)
        id: String,
    },
    /// Copy an image to the system clipboard as PNG
    Copy {
        /// Image ID (file name)
        id: String,
    },
    /// List tags
    Tags {
        /// Only tags no image uses
        #[arg(long)]
        imageless: bool,
    },
    /// Save server settings to the config file
    Config {
        #[arg(long)]
        base_url: Option<String>,

        #[arg(long)]
        csrf_token: Option<String>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
