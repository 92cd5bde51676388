//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line client for the Scribd document API.
///
/// Credentials come from `SCRIBD_API_KEY` and `SCRIBD_API_SECRET`; results are
/// printed to stdout as JSON.
#[derive(Parser, Debug)]
#[command(name = "scribd")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API endpoint (overrides SCRIBD_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Session key from an earlier login
    #[arg(long, global = true)]
    pub session_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Upload a local file
    Upload {
        file: PathBuf,

        /// Document type (pdf, doc, txt, ppt, ...)
        #[arg(long)]
        doc_type: Option<String>,

        #[arg(long, value_parser = ["public", "private"])]
        access: Option<String>,

        /// Id of the document this upload revises
        #[arg(long)]
        rev_id: Option<i64>,

        /// Wait for server-side conversion to finish
        #[arg(short, long)]
        wait: bool,
    },

    /// Upload a document from a URL
    UploadUrl {
        url: String,

        #[arg(long)]
        doc_type: Option<String>,

        #[arg(long, value_parser = ["public", "private"])]
        access: Option<String>,

        #[arg(short, long)]
        wait: bool,
    },

    /// Show a document's conversion status
    Status { doc_id: String },

    /// Search documents
    Search {
        query: String,

        /// Number of results (1-1000)
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=1000))]
        num_results: Option<u32>,

        /// Offset of the first result
        #[arg(long)]
        start: Option<u32>,

        #[arg(long, value_parser = ["all", "user"])]
        scope: Option<String>,
    },

    /// Log in and print the session
    Login {
        username: String,

        /// Password (falls back to SCRIBD_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Show a document's settings
    Settings { doc_id: String },

    /// Show a document's thumbnail URL
    Thumbnail {
        doc_id: String,

        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=4096))]
        width: u32,

        /// Defaults to the width
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=4096))]
        height: Option<u32>,
    },

    /// Show a document's download link
    DownloadUrl {
        doc_id: String,

        /// Format to download (defaults to the original upload)
        #[arg(long)]
        doc_type: Option<String>,
    },
}
