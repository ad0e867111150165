//! [`tracing`] related configuration.
//!
//! Logs are emitted to stderr; see [`stderr`] for the layer's own options.
//!
//! [`tracing`]: ::tracing

use serde::{Deserialize, Deserializer, de};
use tracing_subscriber::EnvFilter;

pub mod stderr;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct TracingConfig
{
	/// Initialize a tracing subscriber.
	pub enable: bool,

	/// Global filters that apply to all layers.
	pub filters: Vec<Filter>,

	/// Configuration for the layer emitting to stderr.
	pub stderr: stderr::StderrConfig,
}

impl TracingConfig
{
	/// Constructs an [`EnvFilter`] from the filter directives specified in the config.
	pub fn env_filter(&self) -> Option<EnvFilter>
	{
		fold_filters(&self.filters)
	}
}

/// A filter directive such as `memorypack_endpoints=debug`.
#[derive(Debug, Clone)]
pub struct Filter(pub tracing_subscriber::filter::Directive);

impl<'de> Deserialize<'de> for Filter
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer)?
			.parse()
			.map(Self)
			.map_err(de::Error::custom)
	}
}

fn fold_filters(filters: &[Filter]) -> Option<EnvFilter>
{
	(!filters.is_empty()).then(|| {
		filters
			.iter()
			.map(|Filter(directive)| directive.clone())
			.fold(EnvFilter::from_default_env(), EnvFilter::add_directive)
	})
}
