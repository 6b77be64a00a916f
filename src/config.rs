//! Command-line arguments and the configuration resolved from them.
//!
//! Settings are resolved once at startup into an immutable `Config`; the
//! rest of the binary only reads from it.

use std::path::PathBuf;

use clap::Parser as ClapParser;

/// Environment variable holding the default log filter.
pub const LOG_ENV: &str = "LUMEN_LOG";

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(ClapParser, Debug)]
#[command(name = "lumen", about = "Interpreter for the lumen scripting language")]
pub struct Args {
    /// Script to run. Starts an interactive session when omitted.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Print the lowered program before evaluating it.
    #[arg(long = "show-program")]
    pub show_program: bool,

    /// Print the syntax tree before binding it.
    #[arg(long = "show-tree")]
    pub show_tree: bool,

    /// Write the control-flow graph in dot format to this path.
    #[arg(long, value_name = "PATH")]
    pub graph: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `lumen::binder=trace`.
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Stop any evaluation after this many loop iterations.
    #[arg(long = "max-loop-iterations", value_name = "N")]
    pub max_loop_iterations: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub file: Option<PathBuf>,
    pub show_program: bool,
    pub show_tree: bool,
    pub graph: Option<PathBuf>,
    pub log_filter: String,
    pub max_loop_iterations: Option<u64>,
}

impl Config {
    /// Resolves the configuration from parsed arguments and the environment.
    pub fn from_args(args: Args) -> Self {
        let env_filter = std::env::var(LOG_ENV).ok();
        Config::resolve(args, env_filter)
    }

    /// `--log-level` wins over `LUMEN_LOG`, which wins over the default.
    pub fn resolve(args: Args, env_filter: Option<String>) -> Self {
        let log_filter = args
            .log_level
            .or(env_filter)
            .filter(|filter| !filter.trim().is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_LOG_LEVEL));

        Config {
            file: args.file,
            show_program: args.show_program,
            show_tree: args.show_tree,
            graph: args.graph,
            log_filter,
            max_loop_iterations: args.max_loop_iterations,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.file.is_none()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as ClapParser;
    use pretty_assertions::assert_eq;

    use super::{Args, Config};

    #[test]
    fn test_defaults_start_interactive_session() {
        let args = Args::parse_from(["lumen"]);
        let config = Config::resolve(args, None);

        assert!(config.is_interactive());
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.max_loop_iterations, None);
    }

    #[test]
    fn test_log_level_flag_overrides_environment() {
        let args = Args::parse_from(["lumen", "--log-level", "debug", "script.lm"]);
        let config = Config::resolve(args, Some(String::from("trace")));

        assert_eq!(config.log_filter, "debug");
        assert!(!config.is_interactive());
    }

    #[test]
    fn test_environment_filter_used_without_flag() {
        let args = Args::parse_from(["lumen", "--show-program", "--max-loop-iterations", "10"]);
        let config = Config::resolve(args, Some(String::from("lumen::binder=trace")));

        assert_eq!(config.log_filter, "lumen::binder=trace");
        assert!(config.show_program);
        assert_eq!(config.max_loop_iterations, Some(10));
    }
}
