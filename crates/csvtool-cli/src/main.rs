//! csvtool CLI
//!
//! Merge, compare, filter, sort and split CSV files, either from flags or
//! through a guided interactive session.

mod commands;
mod interactive;
mod prompt;
mod request;

use clap::{Parser, Subcommand};
use csvtool_core::{
    FilterOperator, FilterSpec, SortOrder, SortSpec, SortType, SplitMode, SplitSpec,
};
use interactive::Session;
use prompt::{Prompter, TerminalPrompter};
use request::{Request, DEFAULT_SPLIT_PATTERN};
use std::io;
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "csvtool")]
#[command(about = "Row-set operations on CSV files", long_about = None)]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge CSV files under the union of their columns
    Merge {
        /// Files to merge, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long, default_value = "merged.csv")]
        output: PathBuf,
    },

    /// Rows of LEFT whose key is absent from RIGHT
    Diff {
        left: PathBuf,
        right: PathBuf,

        /// Key column
        #[arg(short, long)]
        key: String,

        #[arg(short, long, default_value = "diff.csv")]
        output: PathBuf,
    },

    /// Rows of LEFT whose key is present in RIGHT
    Intersect {
        left: PathBuf,
        right: PathBuf,

        /// Key column
        #[arg(short, long)]
        key: String,

        #[arg(short, long, default_value = "intersect.csv")]
        output: PathBuf,
    },

    /// Repeated occurrences of a key within one file
    Duplicates {
        file: PathBuf,

        /// Key column
        #[arg(short, long)]
        key: String,

        #[arg(short, long, default_value = "duplicates.csv")]
        output: PathBuf,
    },

    /// Split a file into <pattern>_<n>.csv parts
    Split {
        file: PathBuf,

        /// fileCount or maxLines
        #[arg(short, long)]
        mode: SplitMode,

        /// Number of files, or rows per file
        #[arg(long, allow_hyphen_values = true)]
        value: i64,

        /// Base name for the generated files
        #[arg(short, long, default_value = DEFAULT_SPLIT_PATTERN)]
        pattern: String,
    },

    /// Keep rows where COLUMN satisfies OPERATOR
    Filter {
        file: PathBuf,

        /// Column to test
        #[arg(short, long)]
        column: String,

        /// equals, not_equals, contains, not_contains, starts_with, ends_with,
        /// greater_than, less_than, empty, not_empty
        #[arg(long = "op")]
        operator: FilterOperator,

        /// Comparison value (not needed for empty/not_empty)
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        value: String,

        #[arg(short, long, default_value = "filtered.csv")]
        output: PathBuf,
    },

    /// Sort rows by one column
    Sort {
        file: PathBuf,

        /// Column to sort by
        #[arg(short, long)]
        column: String,

        /// asc or desc
        #[arg(long, default_value = "asc")]
        order: SortOrder,

        /// auto, string, number or date
        #[arg(long = "type", default_value = "auto")]
        data_type: SortType,

        #[arg(short, long, default_value = "sorted.csv")]
        output: PathBuf,
    },

    /// Guided session (default when no subcommand is given)
    Interactive,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Option<Commands>) -> csvtool_core::Result<()> {
    let request = match command {
        None | Some(Commands::Interactive) => return cmd_interactive(),
        Some(command) => build_request(command)?,
    };

    let report = commands::execute(&request)?;
    report.print(&mut io::stdout().lock())?;
    Ok(())
}

fn build_request(command: Commands) -> csvtool_core::Result<Request> {
    let request = match command {
        Commands::Merge { files, output } => Request::Merge {
            inputs: files,
            output,
        },
        Commands::Diff {
            left,
            right,
            key,
            output,
        } => Request::Diff {
            left,
            right,
            key,
            output,
        },
        Commands::Intersect {
            left,
            right,
            key,
            output,
        } => Request::Intersect {
            left,
            right,
            key,
            output,
        },
        Commands::Duplicates { file, key, output } => Request::Duplicates {
            input: file,
            key,
            output,
        },
        Commands::Split {
            file,
            mode,
            value,
            pattern,
        } => Request::Split {
            input: file,
            spec: SplitSpec::new(mode, value)?,
            pattern,
        },
        Commands::Filter {
            file,
            column,
            operator,
            value,
            output,
        } => Request::Filter {
            input: file,
            spec: FilterSpec::new(column, operator, value),
            output,
        },
        Commands::Sort {
            file,
            column,
            order,
            data_type,
            output,
        } => Request::Sort {
            input: file,
            spec: SortSpec::new(column, order, data_type),
            output,
        },
        Commands::Interactive => {
            return Err(csvtool_core::Error::invalid_parameter(
                "interactive mode takes no request flags",
            ))
        }
    };
    Ok(request)
}

fn cmd_interactive() -> csvtool_core::Result<()> {
    let root = std::env::current_dir()?;
    let mut session = Session::new(TerminalPrompter::stdio(), root);

    let request = session.collect_request()?;
    info!(operation = request.operation().name(), "request collected");

    let report = commands::execute(&request)?;
    let mut prompter = session.into_prompter();
    let mut shown = Vec::new();
    report.print(&mut shown)?;
    prompter.message(String::from_utf8_lossy(&shown).trim_end())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use csvtool_core::ErrorKind;

    fn request(args: &[&str]) -> csvtool_core::Result<Request> {
        let cli = Cli::try_parse_from(args).unwrap();
        build_request(cli.command.unwrap())
    }

    #[test]
    fn test_no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["csvtool"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_filter_flags() {
        let req = request(&[
            "csvtool", "filter", "in.csv", "-c", "age", "--op", "greater-than", "--value", "18",
        ])
        .unwrap();
        assert_eq!(
            req,
            Request::Filter {
                input: PathBuf::from("in.csv"),
                spec: FilterSpec::new("age", FilterOperator::GreaterThan, "18"),
                output: PathBuf::from("filtered.csv"),
            }
        );
    }

    #[test]
    fn test_sort_defaults() {
        let req = request(&["csvtool", "-vv", "sort", "in.csv", "-c", "name"]).unwrap();
        assert_eq!(
            req,
            Request::Sort {
                input: PathBuf::from("in.csv"),
                spec: SortSpec::new("name", SortOrder::Asc, SortType::Auto),
                output: PathBuf::from("sorted.csv"),
            }
        );
    }

    #[test]
    fn test_split_rejects_non_positive_value() {
        let err = request(&["csvtool", "split", "in.csv", "-m", "maxLines", "--value", "0"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let req = request(&["csvtool", "split", "in.csv", "-m", "file_count", "--value", "3"])
            .unwrap();
        assert_eq!(
            req,
            Request::Split {
                input: PathBuf::from("in.csv"),
                spec: SplitSpec::new(SplitMode::FileCount, 3).unwrap(),
                pattern: DEFAULT_SPLIT_PATTERN.to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        assert!(Cli::try_parse_from([
            "csvtool", "filter", "in.csv", "-c", "age", "--op", "between"
        ])
        .is_err());
    }

    #[test]
    fn test_merge_requires_files() {
        assert!(Cli::try_parse_from(["csvtool", "merge"]).is_err());
        let req = request(&["csvtool", "merge", "a.csv", "b.csv", "-o", "all.json"]).unwrap();
        assert_eq!(
            req,
            Request::Merge {
                inputs: vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")],
                output: PathBuf::from("all.json"),
            }
        );
    }
}
