use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tiling_core::{SolverOptions, SuggestionStrategy};

/// Global log level for the application.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Everything, including per-observation solver traces.
    Trace,
    /// Solver progress and vote counts.
    Debug,
    /// Suggestions and results.
    #[default]
    Info,
    /// Failures only.
    Warn,
    /// Errors only.
    Error,
}

/// Configuration for the meso-tiler application.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Path to the RON tileset file.
    #[arg(short, long, value_name = "FILE")]
    pub tileset: PathBuf,

    /// OBJ file whose quad faces are the slots. A grid is used when absent.
    #[arg(short, long, value_name = "FILE")]
    pub mesh: Option<PathBuf>,

    /// Width of the slot grid, without --mesh.
    #[arg(long, default_value_t = 10)]
    pub width: usize,

    /// Height of the slot grid, without --mesh.
    #[arg(long, default_value_t = 10)]
    pub height: usize,

    /// Seed of the first solve attempt.
    #[arg(long, env = "MESO_TILER_SEED")]
    pub seed: Option<u64>,

    /// Attempts per solve.
    #[arg(long, default_value_t = 20)]
    pub max_attempts: usize,

    /// Observations per attempt.
    #[arg(long, default_value_t = 100_000)]
    pub max_steps: usize,

    /// How to suggest a tile when the solve fails.
    #[arg(long, value_enum, default_value_t = SuggestionStrategy::Voting)]
    pub strategy: SuggestionStrategy,

    /// Suggested tiles to add before giving up.
    #[arg(long, default_value_t = 10)]
    pub max_suggestions: usize,

    /// Compare suggestion strategies instead of tiling once.
    #[arg(long, default_value_t = false)]
    pub experiment: bool,

    /// Iterations per strategy in experiment mode.
    #[arg(long, default_value_t = 10)]
    pub iterations: usize,

    /// Strategies to compare in experiment mode, comma separated. All when absent.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub strategies: Vec<SuggestionStrategy>,

    /// Path to save the experiment report as JSON.
    #[arg(long, value_name = "JSON_FILE")]
    pub report: Option<PathBuf>,

    /// Path to save the experiment summary as CSV.
    #[arg(long, value_name = "CSV_FILE")]
    pub report_csv: Option<PathBuf>,

    /// Path to save the slot assignments.
    #[arg(short, long, value_name = "FILE", default_value = "output.txt")]
    pub output_path: PathBuf,

    /// Path to dump the votes behind each voting suggestion as JSON.
    #[arg(long, value_name = "JSON_FILE")]
    pub suggestion_debug_path: Option<PathBuf>,

    /// Run extra consistency checks while solving.
    #[arg(long, default_value_t = false)]
    pub debug_checks: bool,

    /// Global log level. `RUST_LOG`, when set, takes precedence.
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl AppConfig {
    /// Solver options of the first solve.
    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions::builder()
            .max_attempts(self.max_attempts)
            .max_steps(self.max_steps)
            .random_seed(self.seed.unwrap_or_default())
            .debug(self.debug_checks)
            .build()
    }

    /// Strategies to compare, all of them when none was given.
    pub fn experiment_strategies(&self) -> Vec<SuggestionStrategy> {
        if self.strategies.is_empty() {
            SuggestionStrategy::ALL.to_vec()
        } else {
            self.strategies.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_args() {
        let args = vec![
            "meso-tiler",
            "--tileset",
            "tiles.ron",
            "--width",
            "20",
            "--output-path",
            "out.txt",
        ];
        let config = AppConfig::try_parse_from(args).unwrap();
        assert_eq!(config.tileset, PathBuf::from("tiles.ron"));
        assert_eq!(config.width, 20);
        assert_eq!(config.height, 10); // Default
        assert_eq!(config.mesh, None);
        assert_eq!(config.output_path, PathBuf::from("out.txt"));
        assert_eq!(config.strategy, SuggestionStrategy::Voting);
        assert_eq!(config.max_suggestions, 10);
        assert!(!config.experiment);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_tileset_is_required() {
        assert!(AppConfig::try_parse_from(["meso-tiler", "--width", "3"]).is_err());
    }

    #[test]
    fn test_strategy_parsing() {
        let config =
            AppConfig::try_parse_from(["meso-tiler", "-t", "t.ron", "--strategy", "brute-force"]).unwrap();
        assert_eq!(config.strategy, SuggestionStrategy::BruteForce);

        let args_err = ["meso-tiler", "-t", "t.ron", "--strategy", "invalid-strategy"];
        assert!(AppConfig::try_parse_from(args_err).is_err());
    }

    #[test]
    fn test_experiment_strategies() {
        let config = AppConfig::try_parse_from([
            "meso-tiler",
            "-t",
            "t.ron",
            "--experiment",
            "--strategies",
            "random,voting-greedy-sanity-check",
        ])
        .unwrap();
        assert!(config.experiment);
        assert_eq!(
            config.experiment_strategies(),
            vec![SuggestionStrategy::Random, SuggestionStrategy::VotingGreedySanityCheck]
        );

        let all = AppConfig::try_parse_from(["meso-tiler", "-t", "t.ron"]).unwrap();
        assert_eq!(all.experiment_strategies().len(), SuggestionStrategy::ALL.len());
    }

    #[test]
    fn test_solver_options() {
        let config = AppConfig::try_parse_from([
            "meso-tiler",
            "-t",
            "t.ron",
            "--seed",
            "5",
            "--max-attempts",
            "3",
            "--debug-checks",
        ])
        .unwrap();
        let options = config.solver_options();
        assert_eq!(options.random_seed, 5);
        assert_eq!(options.max_attempts, 3);
        assert_eq!(options.max_steps, 100_000);
        assert!(options.debug);
    }

    #[test]
    fn test_report_paths() {
        let config = AppConfig::try_parse_from([
            "meso-tiler",
            "-t",
            "t.ron",
            "--report",
            "report.json",
            "--report-csv",
            "report.csv",
            "--suggestion-debug-path",
            "votes.json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(config.report, Some(PathBuf::from("report.json")));
        assert_eq!(config.report_csv, Some(PathBuf::from("report.csv")));
        assert_eq!(config.suggestion_debug_path, Some(PathBuf::from("votes.json")));
        assert_eq!(config.log_level, LogLevel::Debug);
    }
}
