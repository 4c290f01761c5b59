use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rosterbot")]
#[command(author, version, about = "Telegram group roster bot backed by an Appwrite collection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot in normal mode
    Run {
        /// Use webhook mode instead of long polling
        #[arg(long)]
        webhook: bool,
    },

    /// Fetch rows from a Google Sheet using service account credentials
    FetchSheet {
        /// Spreadsheet ID (the long token in the sheet URL)
        #[arg(short, long)]
        spreadsheet: String,

        /// A1-style range to fetch
        #[arg(short, long, default_value = "Sheet1")]
        range: String,

        /// Save the fetched rows to a JSON file
        #[arg(short, long)]
        out: Option<String>,

        /// Also print spreadsheet metadata (title, sheet names)
        #[arg(long)]
        info: bool,
    },

    /// Inspect the Appwrite collection and report missing member attributes
    CheckCollection,

    /// Create the member schema attributes on the Appwrite collection
    InitCollection,

    /// List stored member documents and print a per-status summary
    VerifyMembers,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
