use std::{
    env,
    path::{Path, PathBuf},
};

use log::LevelFilter;
use metric_tsp_derive::{CliOptions, CliValue, KvDisplay};

use crate::{EngineConfig, Error, Result, Strategy, engine::DEFAULT_EXACT_THRESHOLD};

/// File name looked up in the input directory when `--manifest` is not given.
pub const DEFAULT_MANIFEST: &str = "main.txt";

/// Runtime options for a batch run.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct RunOptions {
    /// Job manifest: a job count followed by job names. Defaults to `main.txt`
    /// in the input directory.
    #[cli(value = "<path>")]
    #[kv(fmt = "or-dash")]
    pub manifest: String,
    /// Directory holding one `<job>.<input-ext>` file per job.
    #[cli(value = "<dir>")]
    #[kv(fmt = "path")]
    pub input_dir: PathBuf,
    /// Directory receiving one `<job>.<output-ext>` file per job.
    #[cli(value = "<dir>")]
    #[kv(fmt = "path")]
    pub output_dir: PathBuf,
    /// Extension of job input files.
    #[cli(value = "<ext>")]
    pub input_ext: String,
    /// Extension of job output files.
    #[cli(value = "<ext>")]
    pub output_ext: String,
    /// Tour construction strategy.
    #[cli(
        value = "<exact|christofides|double-tree|auto>",
        parse_with = "Strategy::parse"
    )]
    pub strategy: Strategy,
    /// Largest vertex count handed to the exact solver.
    #[cli(value = "<usize>")]
    pub exact_threshold: usize,
    /// Reject non-metric graphs before running an approximation.
    #[cli(flag)]
    pub verify_metric: bool,
    /// Structured logging level.
    #[cli(
        value = "<error|warn|info|debug|trace|off>",
        parse_with = "LogLevel::parse"
    )]
    pub log_level: LogLevel,
    /// Logging output format.
    #[cli(value = "<compact|pretty>", parse_with = "LogFormat::parse")]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    #[cli(flag)]
    pub log_timestamp: bool,
    /// Log file path. Empty means stderr.
    #[cli(value = "<path>")]
    #[kv(fmt = "or-dash")]
    pub log_output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            manifest: String::new(),
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            input_ext: String::from("in"),
            output_ext: String::from("out"),
            strategy: Strategy::Auto,
            exact_threshold: DEFAULT_EXACT_THRESHOLD,
            verify_metric: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
        }
    }
}

impl RunOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    pub fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);
            if !options.apply_cli_option(&name, value)? {
                return Err(Error::invalid_input(format!(
                    "Unknown option: --{name}\n\n{}",
                    Self::usage()
                )));
            }
        }

        options.engine_config().validate()?;
        if options.input_ext.trim().is_empty() || options.output_ext.trim().is_empty() {
            return Err(Error::invalid_input("File extensions must not be empty"));
        }
        Ok(options)
    }

    pub fn usage() -> String {
        let mut out = String::from(concat!(
            "Usage:\n",
            "  metric-tsp [options]\n\n",
            "Reads a manifest of job names, solves <input-dir>/<job>.<input-ext> for each\n",
            "job and writes the tour labels to <output-dir>/<job>.<output-ext>.\n\n",
            "Options:\n",
        ));
        for (shape, about) in Self::CLI_HELP {
            out.push_str(&format!("  {shape}\n"));
            if !about.is_empty() {
                out.push_str(&format!("      {about}\n"));
            }
        }
        out.push_str(concat!(
            "  --help\n",
            "\n",
            "Examples:\n",
            "  metric-tsp --input-dir jobs --output-dir tours\n",
            "  metric-tsp --manifest jobs/main.txt --input-dir jobs --strategy christofides\n",
            "  metric-tsp --input-dir jobs --strategy exact --exact-threshold 20 --log-level=debug\n",
            "  metric-tsp --input-dir jobs --verify-metric --log-format=pretty --log-output run.log\n",
        ));
        out
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            exact_threshold: self.exact_threshold,
            verify_metric: self.verify_metric,
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        let manifest = self.manifest.trim();
        if manifest.is_empty() {
            self.input_dir.join(DEFAULT_MANIFEST)
        } else {
            PathBuf::from(manifest)
        }
    }

    pub fn job_input_path(&self, job: &str) -> PathBuf {
        self.input_dir.join(format!("{job}.{}", self.input_ext))
    }

    pub fn job_output_path(&self, job: &str) -> PathBuf {
        self.output_dir.join(format!("{job}.{}", self.output_ext))
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        let log_output = self.log_output.trim();
        if log_output.is_empty() || log_output == "-" {
            None
        } else {
            Some(Path::new(log_output))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use log::LevelFilter;

    use super::{LogFormat, LogLevel, RunOptions};
    use crate::{ErrorKind, Strategy};

    #[test]
    fn log_level_maps_to_expected_filter() {
        assert_eq!(LogLevel::Error.to_filter(), LevelFilter::Error);
        assert_eq!(LogLevel::Warn.to_filter(), LevelFilter::Warn);
        assert_eq!(LogLevel::Info.to_filter(), LevelFilter::Info);
        assert_eq!(LogLevel::Debug.to_filter(), LevelFilter::Debug);
        assert_eq!(LogLevel::Trace.to_filter(), LevelFilter::Trace);
        assert_eq!(LogLevel::Off.to_filter(), LevelFilter::Off);
        assert_eq!(LogLevel::parse("WARNING").expect("alias"), LogLevel::Warn);
    }

    #[test]
    fn parse_from_iter_applies_known_cli_options() {
        let options = RunOptions::parse_from_iter([
            "--manifest=jobs/list.txt",
            "--input-dir",
            "jobs",
            "--output-dir=tours",
            "--input-ext=txt",
            "--output-ext=tour",
            "--strategy=double-tree",
            "--exact-threshold=12",
            "--verify-metric",
            "--log-level=debug",
            "--log-format=pretty",
            "--log-timestamp=false",
            "--log-output=run.log",
        ])
        .expect("parse options");

        assert_eq!(options.manifest, "jobs/list.txt");
        assert_eq!(options.input_dir, PathBuf::from("jobs"));
        assert_eq!(options.output_dir, PathBuf::from("tours"));
        assert_eq!(options.input_ext, "txt");
        assert_eq!(options.output_ext, "tour");
        assert_eq!(options.strategy, Strategy::DoubleTree);
        assert_eq!(options.exact_threshold, 12);
        assert!(options.verify_metric);
        assert_eq!(options.log_level, LogLevel::Debug);
        assert_eq!(options.log_format, LogFormat::Pretty);
        assert!(!options.log_timestamp);
        assert_eq!(options.log_output, "run.log");
    }

    #[test]
    fn flags_do_not_swallow_the_next_option() {
        let options = RunOptions::parse_from_iter(["--verify-metric", "--strategy", "exact"])
            .expect("parse options");
        assert!(options.verify_metric);
        assert_eq!(options.strategy, Strategy::Exact);
    }

    #[test]
    fn parse_from_iter_accepts_no_log_timestamp_flag() {
        let options =
            RunOptions::parse_from_iter(["--no-log-timestamp"]).expect("parse options");
        assert!(!options.log_timestamp);
    }

    #[test]
    fn parse_from_iter_rejects_negated_flag_with_value() {
        let err = RunOptions::parse_from_iter(["--no-verify-metric=true"])
            .expect_err("expected flag value rejection");
        assert!(err.to_string().contains("does not take a value"));
    }

    #[test]
    fn parse_from_iter_rejects_bad_boolean() {
        let err = RunOptions::parse_from_iter(["--log-timestamp=maybe"])
            .expect_err("invalid bool should fail");
        assert!(
            err.to_string()
                .contains("Invalid boolean for --log-timestamp: maybe")
        );
    }

    #[test]
    fn parse_from_iter_rejects_unknown_option() {
        let err = RunOptions::parse_from_iter(["--unknown-opt=1"])
            .expect_err("expected unknown option error");
        assert!(err.to_string().contains("Unknown option: --unknown-opt"));
    }

    #[test]
    fn parse_from_iter_rejects_unexpected_positional_argument() {
        let err = RunOptions::parse_from_iter(["main.txt"]).expect_err("expected positional error");
        assert!(err.to_string().contains("Unexpected argument: main.txt"));
    }

    #[test]
    fn parse_from_iter_requires_value_for_strategy() {
        let err =
            RunOptions::parse_from_iter(["--strategy"]).expect_err("missing value should fail");
        assert!(err.to_string().contains("Missing value for --strategy"));
    }

    #[test]
    fn parse_from_iter_rejects_unknown_strategy() {
        let err = RunOptions::parse_from_iter(["--strategy=greedy"]).expect_err("bad strategy");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("Invalid value for --strategy: greedy"));
    }

    #[test]
    fn parse_from_iter_validates_threshold() {
        let err = RunOptions::parse_from_iter(["--exact-threshold=40"]).expect_err("too high");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err =
            RunOptions::parse_from_iter(["--exact-threshold=many"]).expect_err("not a number");
        assert!(err.to_string().contains("Invalid value for --exact-threshold: many"));
    }

    #[test]
    fn parse_from_iter_help_returns_usage_error() {
        let err = RunOptions::parse_from_iter(["--help"]).expect_err("help should short-circuit");
        let text = err.to_string();
        assert!(text.contains("Usage:"));
        assert!(text.contains("--strategy <exact|christofides|double-tree|auto>"));
        assert!(text.contains("--[no-]verify-metric[=<bool>]"));
    }

    #[test]
    fn defaults_follow_the_batch_layout() {
        let options = RunOptions::default();
        assert_eq!(options.strategy, Strategy::Auto);
        assert_eq!(options.exact_threshold, 24);
        assert_eq!(options.manifest_path(), Path::new("./main.txt"));
        assert_eq!(options.job_input_path("g1"), Path::new("./g1.in"));
        assert_eq!(options.job_output_path("g1"), Path::new("./g1.out"));
        assert!(options.log_output_path().is_none());
    }

    #[test]
    fn explicit_manifest_wins_over_input_dir() {
        let options = RunOptions {
            manifest: "elsewhere/jobs.txt".to_string(),
            input_dir: PathBuf::from("jobs"),
            ..RunOptions::default()
        };
        assert_eq!(options.manifest_path(), Path::new("elsewhere/jobs.txt"));
    }

    #[test]
    fn log_output_path_treats_empty_and_dash_as_stderr() {
        let options = RunOptions {
            log_output: "-".to_string(),
            ..RunOptions::default()
        };
        assert!(options.log_output_path().is_none());

        let options = RunOptions {
            log_output: "out/run.log".to_string(),
            ..RunOptions::default()
        };
        assert_eq!(
            options.log_output_path().expect("path should exist"),
            Path::new("out/run.log")
        );
    }

    #[test]
    fn kv_display_renders_one_line() {
        let line = RunOptions::default().to_string();
        assert!(line.starts_with("manifest=- input_dir=. output_dir=. input_ext=in"));
        assert!(line.contains("strategy=auto exact_threshold=24 verify_metric=false"));
        assert!(!line.contains('\n'));
    }
}
