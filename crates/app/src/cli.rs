//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use courier_domain::HttpMethod;
use courier_infrastructure::CollectionFormat;

/// Courier - run and manage HTTP API request collections.
#[derive(Debug, Parser)]
#[command(name = "courier", version, about)]
pub struct Cli {
    /// Directory holding collections, history, contexts and settings.
    #[arg(long, env = "COURIER_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Per-request timeout in milliseconds (overrides settings.json).
    #[arg(long = "timeout-ms", env = "COURIER_TIMEOUT_MS", global = true)]
    pub timeout_ms: Option<u64>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import collections from a native, Postman or Bruno JSON file.
    Import {
        /// File to import.
        file: PathBuf,
    },

    /// Export collections.
    Export {
        /// Output format.
        #[arg(long, short, value_enum, default_value_t = FormatArg::Native)]
        format: FormatArg,
        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Only export these collections (name or id). Defaults to all.
        collections: Vec<String>,
    },

    /// List collections and their requests.
    List,

    /// Manage collections.
    #[command(subcommand)]
    Collection(CollectionCommand),

    /// Manage saved requests.
    #[command(subcommand)]
    Request(RequestCommand),

    /// Run every request of a collection in order, stopping at the first failure.
    Run {
        /// Collection name or id.
        collection: String,
    },

    /// Send one saved request.
    Send {
        /// Collection name or id.
        collection: String,
        /// Request name or id.
        request: String,
        /// Print response headers too.
        #[arg(long, short)]
        verbose: bool,
    },

    /// Show or clear request history.
    History(HistoryArgs),

    /// Show or clear a collection's script context.
    Context {
        /// Collection name or id.
        collection: String,
        /// Remove every key.
        #[arg(long)]
        clear: bool,
    },

    /// Show or set collection variables.
    Vars {
        /// Collection name or id.
        collection: String,
        /// Assignments of the form KEY=VALUE.
        assignments: Vec<String>,
        /// Variables to remove.
        #[arg(long = "unset", value_name = "KEY")]
        unset: Vec<String>,
    },

    /// Show storage usage or delete all stored data.
    Storage {
        /// Delete collections, history and contexts.
        #[arg(long)]
        clear: bool,
    },
}

/// Collection management commands.
#[derive(Debug, Subcommand)]
pub enum CollectionCommand {
    /// Create an empty collection.
    New {
        /// Collection name.
        name: String,
    },
    /// Rename a collection.
    Rename {
        /// Collection name or id.
        collection: String,
        /// New name.
        name: String,
    },
    /// Delete a collection and its context.
    Delete {
        /// Collection name or id.
        collection: String,
    },
}

/// Request management commands.
#[derive(Debug, Subcommand)]
pub enum RequestCommand {
    /// Add a request to a collection.
    Add {
        /// Collection name or id.
        collection: String,
        /// Request name.
        name: String,
        /// Request fields.
        #[command(flatten)]
        fields: RequestFields,
    },
    /// Change fields of a saved request.
    Edit {
        /// Collection name or id.
        collection: String,
        /// Request name or id.
        request: String,
        /// New name.
        #[arg(long)]
        rename: Option<String>,
        /// Fields to change.
        #[command(flatten)]
        fields: RequestFields,
    },
    /// Delete a saved request.
    Delete {
        /// Collection name or id.
        collection: String,
        /// Request name or id.
        request: String,
    },
    /// Move a request before another one, possibly into another collection.
    Move {
        /// Collection holding the request.
        collection: String,
        /// Request name or id.
        request: String,
        /// Destination collection (defaults to the source collection).
        #[arg(long = "to")]
        target_collection: Option<String>,
        /// Place before this request; appended when omitted or not found.
        #[arg(long)]
        before: Option<String>,
    },
}

/// Editable request fields.
#[derive(Debug, Clone, Default, Args)]
pub struct RequestFields {
    /// HTTP method.
    #[arg(long, short = 'X', value_parser = parse_method)]
    pub method: Option<HttpMethod>,
    /// Target URL; may contain ${variable} placeholders.
    #[arg(long)]
    pub url: Option<String>,
    /// Header in the form "Name: value". Repeatable; replaces all headers.
    #[arg(long = "header", short = 'H')]
    pub headers: Vec<String>,
    /// Body text.
    #[arg(long)]
    pub body: Option<String>,
    /// Pre-request script.
    #[arg(long = "pre")]
    pub pre_request_script: Option<String>,
    /// Post-request script.
    #[arg(long = "post")]
    pub post_request_script: Option<String>,
}

/// History query options.
#[derive(Debug, Clone, Default, Args)]
pub struct HistoryArgs {
    /// Only failed requests.
    #[arg(long, conflicts_with = "succeeded")]
    pub failed: bool,
    /// Only successful requests.
    #[arg(long)]
    pub succeeded: bool,
    /// Only collection-run entries.
    #[arg(long, conflicts_with = "single")]
    pub runs: bool,
    /// Only single sends.
    #[arg(long)]
    pub single: bool,
    /// Only requests with this method.
    #[arg(long, value_parser = parse_method)]
    pub method: Option<HttpMethod>,
    /// Delete every entry.
    #[arg(long)]
    pub clear: bool,
}

/// Export formats accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Courier native JSON.
    Native,
    /// Postman Collection v2.1.
    Postman,
    /// Bruno JSON.
    Bruno,
}

impl From<FormatArg> for CollectionFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Native => Self::Native,
            FormatArg::Postman => Self::Postman,
            FormatArg::Bruno => Self::Bruno,
        }
    }
}

fn parse_method(value: &str) -> Result<HttpMethod, String> {
    value.parse().map_err(|e: courier_domain::DomainError| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli =
            Cli::try_parse_from(["courier", "--data-dir", "/tmp/c", "run", "Users API"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/c")));
        assert!(matches!(cli.command, Command::Run { collection } if collection == "Users API"));
    }

    #[test]
    fn test_parse_request_add() {
        let cli = Cli::try_parse_from([
            "courier", "request", "add", "API", "Login", "-X", "post", "--url", "${base}/login",
            "-H", "Content-Type: application/json",
        ])
        .unwrap();
        let Command::Request(RequestCommand::Add { fields, .. }) = cli.command else {
            unreachable!("parsed as request add");
        };
        assert_eq!(fields.method, Some(HttpMethod::Post));
        assert_eq!(fields.headers, vec!["Content-Type: application/json"]);
    }

    #[test]
    fn test_history_filters_conflict() {
        assert!(Cli::try_parse_from(["courier", "history", "--failed", "--succeeded"]).is_err());
    }

    #[test]
    fn test_export_format() {
        let cli = Cli::try_parse_from(["courier", "export", "--format", "bruno", "A"]).unwrap();
        let Command::Export { format, collections, .. } = cli.command else {
            unreachable!("parsed as export");
        };
        assert_eq!(CollectionFormat::from(format), CollectionFormat::Bruno);
        assert_eq!(collections, vec!["A"]);
    }
}
