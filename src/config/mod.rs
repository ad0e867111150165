//! Runtime configuration.
//!
//! The [`Config`] can be read from a TOML file, or constructed in any other way you'd like. Every
//! section is optional; missing keys take their default values.
//!
//! ```toml
//! [tracing]
//! enable = true
//! filters = ["memorypack_endpoints=debug"]
//!
//! [tracing.stderr]
//! enable = true
//! ansi = true
//!
//! [links]
//! public-url = "https://api.example.org/"
//! absolute = true
//!
//! [links.routes]
//! "items.get" = "/items/{id}"
//!
//! [json]
//! pretty = false
//! ```

#![allow(
	missing_copy_implementations,
	reason = "configs won't be copied around"
)]

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::{fs, io};

use serde::Deserialize;
use url::Url;

use crate::serializer::JsonOptions;

mod tracing;

pub use self::tracing::{Filter, TracingConfig, stderr::StderrConfig};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config
{
	pub tracing: TracingConfig,
	pub links: LinksConfig,

	/// Options for [`EncodingSerializer`]s producing JSON.
	///
	/// [`EncodingSerializer`]: crate::EncodingSerializer
	pub json: JsonOptions,
}

/// Configuration for `Location` headers.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct LinksConfig
{
	/// Base URL for absolute links.
	///
	/// Falls back to the scheme and host of the current request.
	pub public_url: Option<Url>,

	/// Whether created-at responses should use absolute links.
	///
	/// The sender never reads this; pass it as the `absolute` argument of
	/// [`ResponseSender::send_created_at()`].
	///
	/// [`ResponseSender::send_created_at()`]: crate::ResponseSender::send_created_at
	pub absolute: bool,

	/// Route templates by route name.
	pub routes: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadConfigError
{
	#[error("failed to read configuration file at {path:?}")]
	Io
	{
		path: Box<Path>,

		#[source]
		source: io::Error,
	},

	#[error("failed to parse configuration file")]
	Parse(#[from] toml::de::Error),
}

impl Config
{
	pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, LoadConfigError>
	{
		let path = path.as_ref();
		let file = fs::read_to_string(path)
			.map_err(|source| LoadConfigError::Io { path: Box::from(path), source })?;

		file.parse()
	}
}

impl FromStr for Config
{
	type Err = LoadConfigError;

	fn from_str(config: &str) -> Result<Self, Self::Err>
	{
		toml::from_str(config).map_err(Into::into)
	}
}
