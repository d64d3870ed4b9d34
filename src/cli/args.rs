//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::SelectionMode;

/// Category tree selector: hierarchical category/product selection with tri-state propagation
#[derive(Parser, Debug)]
#[command(name = "catsel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Selection mode: categories-only, products-only or both
    #[arg(short, long, global = true)]
    pub mode: Option<SelectionMode>,

    /// Machine readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the category tree with selection markers
    Tree {
        /// Catalog JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        catalog: PathBuf,
        /// Selection state file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        state: Option<PathBuf>,
    },

    /// List root categories
    Roots {
        /// Catalog JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        catalog: PathBuf,
    },

    /// List a category and all categories below it
    Descendants {
        /// Catalog JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        catalog: PathBuf,
        /// Category id
        id: String,
    },

    /// List products in the selected categories
    Filter {
        /// Catalog JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        catalog: PathBuf,
        /// Category id to filter by (repeatable, default: stored selection)
        #[arg(short = 'c', long = "category")]
        categories: Vec<String>,
        /// Selection state file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        state: Option<PathBuf>,
    },

    /// Select or deselect a category and everything below it
    Toggle {
        /// Catalog JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        catalog: PathBuf,
        /// Category id
        id: String,
        /// Deselect instead of select
        #[arg(long)]
        off: bool,
        /// Selection state file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        state: Option<PathBuf>,
    },

    /// Select or deselect a single product
    Pick {
        /// Catalog JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        catalog: PathBuf,
        /// Product id
        id: String,
        /// Deselect instead of select
        #[arg(long)]
        off: bool,
        /// Selection state file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        state: Option<PathBuf>,
    },

    /// Report malformed category hierarchies
    Check {
        /// Catalog JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        catalog: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show {
        /// Catalog whose local .catsel.toml to include
        #[arg(value_hint = ValueHint::FilePath)]
        catalog: Option<PathBuf>,
    },
    /// Print a commented config template
    Template,
    /// Show config file locations
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_toggle_args_when_parsing_then_fields_are_set() {
        let cli = Cli::try_parse_from([
            "catsel", "-dd", "--mode", "both", "toggle", "catalog.json", "A", "--off", "-s",
            "sel.json",
        ])
        .unwrap();

        assert_eq!(cli.debug, 2);
        assert_eq!(cli.mode, Some(SelectionMode::Both));
        match cli.command {
            Some(Commands::Toggle { id, off, state, .. }) => {
                assert_eq!(id, "A");
                assert!(off);
                assert_eq!(state, Some(PathBuf::from("sel.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_repeated_category_flags_when_parsing_then_collects_all() {
        let cli = Cli::try_parse_from([
            "catsel",
            "filter",
            "catalog.json",
            "-c",
            "A",
            "-c",
            "B",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Filter { categories, .. }) => assert_eq!(categories, vec!["A", "B"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_unknown_mode_when_parsing_then_errors() {
        let result = Cli::try_parse_from(["catsel", "--mode", "all", "roots", "catalog.json"]);
        assert!(result.is_err());
    }
}
