//! Diagnostics for the render tools.
//!
//! `-v` counts select how chatty the `overstrike*` crates are; records from
//! other crates (image decoding, mostly) only get through at `warn`. Without
//! the `tracing` feature a small stderr logger prints
//! `[  0.012s  INFO] overstrike_render::selector: message`; with it, spans
//! around preparation and rendering are reported when they close.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Target prefix shared by every crate of the renderer.
const OWN_TARGET: &str = "overstrike";

/// Level applied to records from other crates.
const FOREIGN_LEVEL: LevelFilter = LevelFilter::Warn;

/// Map a `-v` count to a level filter: 0 → warn, 1 → info, 2 → debug, 3+ → trace.
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn target_limit(target: &str, own: LevelFilter) -> LevelFilter {
    if target.starts_with(OWN_TARGET) {
        own
    } else {
        own.min(FOREIGN_LEVEL)
    }
}

struct RenderLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for RenderLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        shows(metadata.target(), metadata.level(), self.level)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{:7.3}s {:>5}] {}: {}\n",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        );
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<RenderLogger> = OnceLock::new();

/// Install the stderr logger. Only the first call takes effect.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| RenderLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Whether a record at `level` from `target` passes a logger set to `own`.
fn shows(target: &str, level: Level, own: LevelFilter) -> bool {
    level <= target_limit(target, own)
}

/// How the `tracing` subscriber formats events.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines with uptime stamps.
    #[default]
    Plain,
    /// One flattened JSON object per event.
    Json,
}

/// `EnvFilter` directives equivalent to the stderr logger at `level`.
pub fn filter_directives(level: LevelFilter) -> String {
    let own = level.as_str().to_ascii_lowercase();
    let foreign = level.min(FOREIGN_LEVEL).as_str().to_ascii_lowercase();
    format!("{foreign},{OWN_TARGET}={own}")
}

/// Install a `tracing` subscriber. `RUST_LOG` wins over the `-v` count.
#[cfg(feature = "tracing")]
pub fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level_from_verbosity(verbosity))));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    let _ = match format {
        LogFormat::Json => builder.json().flatten_event(true).finish().try_init(),
        LogFormat::Plain => builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(9), LevelFilter::Trace);
    }

    #[test]
    fn foreign_targets_stay_at_warn() {
        let debug = LevelFilter::Debug;
        assert!(shows("overstrike_render::selector", Level::Debug, debug));
        assert!(!shows("overstrike_render::selector", Level::Trace, debug));
        assert!(!shows("image::codecs::png", Level::Info, debug));
        assert!(shows("image::codecs::png", Level::Warn, debug));
        assert!(!shows("image::codecs::png", Level::Warn, LevelFilter::Error));
    }

    #[test]
    fn directives_mirror_the_stderr_logger() {
        assert_eq!(filter_directives(LevelFilter::Warn), "warn,overstrike=warn");
        assert_eq!(filter_directives(LevelFilter::Trace), "warn,overstrike=trace");
        assert_eq!(filter_directives(LevelFilter::Off), "off,overstrike=off");
    }

    #[test]
    fn repeated_init_is_noop() {
        init_with_level(LevelFilter::Warn).expect("first init");
        init_with_level(LevelFilter::Debug).expect("second init is a no-op");
    }
}
