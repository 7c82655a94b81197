//! Writing of statistic lines with a configurable prefix, casing and closing line.

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io::stdout;
use std::io::Write;
use std::sync::OnceLock;
use std::sync::RwLock;

use convert_case::Case;
use convert_case::Casing;

/// Where and how statistics are written.
pub struct StatisticOptions {
    /// Printed in front of every statistic: `{prefix} {name}={value}`.
    prefix: &'static str,
    /// Printed once a block of statistics is complete.
    after_statistics: Option<&'static str>,
    casing: Option<Case>,
    writer: Box<dyn Write + Send + Sync>,
}

impl Debug for StatisticOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticOptions")
            .field("prefix", &self.prefix)
            .field("after_statistics", &self.after_statistics)
            .field("casing", &self.casing)
            .field("writer", &"<Writer>")
            .finish()
    }
}

static STATISTIC_OPTIONS: OnceLock<RwLock<StatisticOptions>> = OnceLock::new();

/// Enables statistic logging. Without a writer the statistics go to stdout.
///
/// Only the first call has an effect.
pub fn configure_statistic_logging(
    prefix: &'static str,
    after: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send + Sync>>,
) {
    let _ = STATISTIC_OPTIONS.get_or_init(|| {
        RwLock::from(StatisticOptions {
            prefix,
            after_statistics: after,
            casing,
            writer: writer.unwrap_or(Box::new(stdout())),
        })
    });
}

/// Writes `{prefix} {name}={value}` if statistic logging is enabled.
pub fn log_statistic(name: impl Display, value: impl Display) {
    let Some(lock) = STATISTIC_OPTIONS.get() else {
        return;
    };
    if let Ok(mut options) = lock.write() {
        let name = match options.casing {
            Some(casing) => name.to_string().to_case(casing),
            None => name.to_string(),
        };
        let prefix = options.prefix;
        let _ = writeln!(options.writer, "{prefix} {name}={value}");
    }
}

/// Writes the closing line of a block of statistics, if one is configured.
pub fn log_statistic_postfix() {
    let Some(lock) = STATISTIC_OPTIONS.get() else {
        return;
    };
    if let Ok(mut options) = lock.write() {
        if let Some(after) = options.after_statistics {
            let _ = writeln!(options.writer, "{after}");
        }
    }
}

pub fn should_log_statistics() -> bool {
    STATISTIC_OPTIONS.get().is_some()
}
