use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use super::Filter;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct StderrConfig
{
	/// Emit traces to stderr.
	pub enable: bool,

	/// Emit ANSI escape codes for colors and other formatting.
	pub ansi: bool,

	/// Filters that apply just to this layer.
	pub filters: Vec<Filter>,
}

impl StderrConfig
{
	pub fn env_filter(&self) -> Option<EnvFilter>
	{
		super::fold_filters(&self.filters)
	}
}
