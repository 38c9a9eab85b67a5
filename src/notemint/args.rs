use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nm")]
#[command(about = "Curation tool for markdown notes spread across directories", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Answer Y to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Corpus overview: per-index totals and missing-attribute report
    Summary {
        /// Sample paths to list per problem
        #[arg(short = 'n', long = "count", default_value_t = 5)]
        count: usize,
    },

    /// Manage the registered note directories
    Index {
        #[command(subcommand)]
        command: Option<IndexCommands>,
    },

    /// Report or repair missing note attributes
    Fix {
        #[command(subcommand)]
        command: Option<FixCommands>,

        /// Sample paths to list per problem in the report
        #[arg(short = 'n', long = "count")]
        count: Option<usize>,
    },

    /// Maintain generated backlink sections
    Backlink {
        #[command(subcommand)]
        command: BacklinkCommands,
    },

    /// Get or set configuration
    Config {
        /// Default author, used by 'fix author' when none is given
        #[arg(long)]
        author: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum IndexCommands {
    /// Register the current directory under the given name
    Create { name: String },

    /// Unregister an index, leaving its notes alone
    Delete { name: String },

    /// Rescan every index with checksums, catching stat-preserving edits
    Reload,

    /// Pack indices into <name>-<stamp>.tar.gz files in the current directory
    Archive {
        /// Index names (defaults to every registered index)
        names: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum FixCommands {
    /// Fill a missing creation time from the filename stamp or file stats
    Created {
        /// Specific note files (defaults to the notes under the current directory)
        files: Vec<PathBuf>,

        /// Limit the number of notes processed
        #[arg(short = 'n', long = "count")]
        count: Option<usize>,
    },

    /// Derive a missing id from the creation time
    Id {
        files: Vec<PathBuf>,

        #[arg(short = 'n', long = "count")]
        count: Option<usize>,

        /// Shift the creation time forward until the derived id is free
        #[arg(long)]
        resolve: bool,
    },

    /// Lift a missing title from the first markdown heading
    Title {
        files: Vec<PathBuf>,

        #[arg(short = 'n', long = "count")]
        count: Option<usize>,
    },

    /// Set a missing author
    Author {
        files: Vec<PathBuf>,

        #[arg(short = 'n', long = "count")]
        count: Option<usize>,

        /// Author to set (defaults to the configured author)
        #[arg(long)]
        author: Option<String>,
    },

    /// Put the note id into the filename
    Filename {
        files: Vec<PathBuf>,

        #[arg(short = 'n', long = "count")]
        count: Option<usize>,

        /// Rebuild the whole name as <id>-<title-slug>.md
        #[arg(long)]
        complete: bool,

        /// With --complete, rename even names that already carry the id
        #[arg(long)]
        force: bool,
    },

    /// Run every fixer in sequence over at most five notes
    All {
        files: Vec<PathBuf>,

        #[arg(short = 'n', long = "count")]
        count: Option<usize>,

        /// Shift creation times forward when a derived id is taken
        #[arg(long)]
        resolve: bool,

        /// Author to set (defaults to the configured author)
        #[arg(long)]
        author: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BacklinkCommands {
    /// Turn the backlink section flag on or off for the working set
    Set {
        /// on or off
        #[arg(value_parser = ["on", "off"])]
        mode: String,

        /// Specific note files (defaults to the notes under the current directory)
        files: Vec<PathBuf>,
    },

    /// Regenerate the referenced-by sections across the whole corpus
    Gen,
}
