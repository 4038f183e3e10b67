use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use env_logger::{Builder, Target, WriteStyle, fmt::Formatter};
use log::{Level, Record};

use crate::{
    Error, Result,
    io::options::{LogFormat, RunOptions},
};

/// Installs the process logger described by the `--log-*` options.
pub fn init_logger(options: &RunOptions) -> Result<()> {
    build_logger(options)?
        .try_init()
        .map_err(|e| Error::other(format!("logger init failed: {e}")))
}

fn build_logger(options: &RunOptions) -> Result<Builder> {
    let log_format = options.log_format;
    let log_timestamp = options.log_timestamp;

    let mut builder = Builder::new();
    builder
        .filter_level(options.log_level.to_filter())
        .write_style(WriteStyle::Never)
        .format(move |buf: &mut Formatter, record: &Record<'_>| {
            if log_timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            match log_format {
                LogFormat::Compact => {
                    writeln!(buf, "{} {}", level_tag(record.level()), record.args())
                }
                LogFormat::Pretty => writeln!(
                    buf,
                    "{} [{}] {}",
                    level_tag(record.level()),
                    short_target(record.target()),
                    record.args()
                ),
            }
        });

    match options.log_output_path() {
        Some(path) => {
            builder.target(Target::Pipe(Box::new(open_log_file(path)?)));
        }
        None => {
            builder.target(Target::Stderr);
        }
    }
    Ok(builder)
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    File::create(path).map_err(|e| {
        Error::other(format!(
            "failed to create log output file {}: {e}",
            path.display()
        ))
    })
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// `metric_tsp_core::engine` -> `engine`; other crates keep their full path.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix("metric_tsp_core::")
        .or_else(|| target.strip_prefix("metric_tsp::"))
        .unwrap_or(target)
}
