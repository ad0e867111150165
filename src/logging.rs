//! Tracing subscriber setup.

use std::io;

use tracing_subscriber::Layer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::{StderrConfig, TracingConfig};

/// Installs a global tracing subscriber as described by `config`.
///
/// Does nothing if tracing is disabled. Fails if a global subscriber has already been set.
pub fn init(config: &TracingConfig) -> Result<(), TryInitError>
{
	if !config.enable {
		return Ok(());
	}

	tracing_subscriber::registry()
		.with(stderr_layer(&config.stderr).with_filter(config.env_filter()))
		.try_init()?;

	tracing::info!("initialized tracing");

	Ok(())
}

/// Creates a tracing layer that will emit logs to stderr.
fn stderr_layer<S>(config: &StderrConfig) -> Option<impl Layer<S>>
where
	S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
	if !config.enable {
		return None;
	}

	let layer = tracing_subscriber::fmt::layer()
		.with_ansi(config.ansi)
		.with_file(true)
		.with_level(true)
		.with_line_number(true)
		.with_span_events(FmtSpan::CLOSE)
		.with_target(true)
		.with_writer(io::stderr)
		.with_filter(config.env_filter());

	Some(layer)
}
