//! CLI argument definitions using clap

use crate::commands::models::{ModelChoice, SearchChoice};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "foldwise")]
#[command(about = "Run cross-validated experiments and publish them to OpenML")]
#[command(
    long_about = r#"Run cross-validated experiments and publish them to OpenML

USAGE:
  foldwise runs list --task 59          # Runs on task 59
  foldwise runs get 473350              # One run with its evaluations
  foldwise tasks get 59                 # Task description and splits
  foldwise run 59 --model logistic      # Execute locally
  foldwise config init                  # Create config file"#
)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (defaults to ~/.config/foldwise/config.toml)
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

    /// Server API root, overriding config and environment
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// API key, overriding config and environment
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List and inspect published runs
    Runs {
        #[command(subcommand)]
        action: RunsAction,
    },

    /// Inspect tasks
    Tasks {
        #[command(subcommand)]
        action: TasksAction,
    },

    /// Execute a model on a task, optionally publishing the run
    Run(RunArgs),

    /// Manage configuration files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum RunsAction {
    /// List runs matching a filter
    List {
        /// Run ids
        #[arg(long = "id", value_delimiter = ',')]
        ids: Vec<u64>,
        /// Task ids
        #[arg(long = "task", value_delimiter = ',')]
        tasks: Vec<u64>,
        /// Uploader ids
        #[arg(long = "uploader", value_delimiter = ',')]
        uploaders: Vec<u64>,
        /// Flow ids
        #[arg(long = "flow", value_delimiter = ',')]
        flows: Vec<u64>,
        /// Tag
        #[arg(long)]
        tag: Option<String>,
        /// Offset of the first result
        #[arg(long)]
        offset: Option<u64>,
        /// Page size
        #[arg(long)]
        size: Option<u64>,
        /// Follow pages until the listing is exhausted
        #[arg(long, conflicts_with = "offset")]
        all: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one run
    Get {
        id: u64,
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TasksAction {
    /// Download a task and show its shape
    Get { id: u64 },
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Task to run on
    pub task_id: u64,

    /// Estimator to run
    #[arg(long, value_enum, default_value = "logistic")]
    pub model: ModelChoice,

    /// Wrap the estimator in a hyperparameter search
    #[arg(long, value_enum)]
    pub search: Option<SearchChoice>,

    /// Iterations for random search
    #[arg(long, default_value_t = 10)]
    pub n_iter: usize,

    /// Seed for stochastic estimators and random search
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Trace rows per search iteration or per inner split
    #[arg(long, value_enum, default_value = "iteration")]
    pub trace: TraceChoice,

    /// Fit folds in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Write the prediction ARFF file here
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Publish the run after execution
    #[arg(long)]
    pub publish: bool,

    /// Tags to attach when publishing
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceChoice {
    Iteration,
    InnerSplit,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Display the effective configuration
    Show,

    /// Create a new configuration file with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_list_filters() {
        let cli = Cli::try_parse_from([
            "foldwise", "runs", "list", "--task", "20,21", "--uploader", "29", "--size", "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Runs {
                action:
                    RunsAction::List {
                        tasks,
                        uploaders,
                        size,
                        ids,
                        ..
                    },
            } => {
                assert_eq!(tasks, vec![20, 21]);
                assert_eq!(uploaders, vec![29]);
                assert_eq!(size, Some(5));
                assert!(ids.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["foldwise", "run", "59"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.task_id, 59);
        assert_eq!(args.model, ModelChoice::Logistic);
        assert_eq!(args.search, None);
        assert_eq!(args.trace, TraceChoice::Iteration);
        assert!(!args.publish);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "foldwise",
            "run",
            "59",
            "--model",
            "sgd-hinge",
            "--search",
            "random",
            "--server",
            "http://localhost:8080/api/v1/json",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.server.as_deref(), Some("http://localhost:8080/api/v1/json"));
    }

    #[test]
    fn test_all_conflicts_with_offset() {
        let result = Cli::try_parse_from([
            "foldwise", "runs", "list", "--tag", "x", "--all", "--offset", "10",
        ]);
        assert!(result.is_err());
    }
}
