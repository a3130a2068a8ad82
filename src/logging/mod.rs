//! Structured logging setup (spec component I): a global `tracing`
//! subscriber writing to a size-rotated file, formatted to match the
//! original implementation's `timestamp | LEVEL | message` layout.

mod rotate;

pub use rotate::{SharedRotatingWriter, MAX_BACKUPS, MAX_BYTES};

use crate::types::KopyError;
use std::fmt;
use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

struct KopyFormatter;

impl<S, N> FormatEvent<S, N> for KopyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        write!(writer, "{now} | {:^5} | ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber, writing to `log_path` with size-based
/// rotation. `verbose` raises the default level from INFO to DEBUG; the
/// `RUST_LOG` environment variable always takes precedence when set.
pub fn init(log_path: &Path, verbose: bool) -> Result<(), KopyError> {
    let writer = SharedRotatingWriter::new(log_path)
        .map_err(|e| KopyError::from_io_at(log_path, e))?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(KopyFormatter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| KopyError::Config(format!("failed to install logger: {e}")))
}
