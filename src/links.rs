//! Reverse URL generation for named routes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use http::uri::Authority;
use url::Url;

use crate::config::LinksConfig;
use crate::context::ResponseContext;

/// Parameter values used to fill in a route template.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RouteValues
{
	values: HashMap<String, String>,
}

impl RouteValues
{
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Sets the value of the parameter `name`, returning its previous value.
	pub fn insert(&mut self, name: impl Into<String>, value: impl fmt::Display) -> Option<String>
	{
		self.values.insert(name.into(), value.to_string())
	}

	/// Builder-style version of [`RouteValues::insert()`].
	#[must_use]
	pub fn with(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self
	{
		self.insert(name, value);
		self
	}

	pub fn get(&self, name: &str) -> Option<&str>
	{
		self.values.get(name).map(String::as_str)
	}

	pub fn len(&self) -> usize
	{
		self.values.len()
	}

	pub fn is_empty(&self) -> bool
	{
		self.values.is_empty()
	}

	pub fn iter(&self) -> RouteValuesIter<'_>
	{
		self.into_iter()
	}
}

impl<'a> IntoIterator for &'a RouteValues
{
	type Item = (&'a str, &'a str);
	type IntoIter = RouteValuesIter<'a>;

	fn into_iter(self) -> Self::IntoIter
	{
		RouteValuesIter { values: self.values.iter() }
	}
}

/// An iterator over the entries of [`RouteValues`].
#[derive(Debug)]
pub struct RouteValuesIter<'a>
{
	values: std::collections::hash_map::Iter<'a, String, String>,
}

impl<'a> Iterator for RouteValuesIter<'a>
{
	type Item = (&'a str, &'a str);

	fn next(&mut self) -> Option<Self::Item>
	{
		self.values
			.next()
			.map(|(name, value)| (name.as_str(), value.as_str()))
	}

	fn size_hint(&self) -> (usize, Option<usize>)
	{
		self.values.size_hint()
	}
}

impl<K, V> FromIterator<(K, V)> for RouteValues
where
	K: Into<String>,
	V: fmt::Display,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self
	{
		let mut values = Self::new();

		for (name, value) in iter {
			values.insert(name, value);
		}

		values
	}
}

impl<K, V, const N: usize> From<[(K, V); N]> for RouteValues
where
	K: Into<String>,
	V: fmt::Display,
{
	fn from(values: [(K, V); N]) -> Self
	{
		values.into_iter().collect()
	}
}

/// Turns route names and [`RouteValues`] into URIs.
///
/// Register an `Arc<dyn LinkGenerator>` in the request extensions to make it available to
/// [`ResponseSender::send_created_at()`].
///
/// [`ResponseSender::send_created_at()`]: crate::ResponseSender::send_created_at
pub trait LinkGenerator: Send + Sync + 'static
{
	/// Generates the path (and query) of the route `route_name`.
	fn path_by_name(&self, route_name: &str, values: &RouteValues) -> Option<String>;

	/// Generates an absolute URI for the route `route_name`.
	fn uri_by_name(
		&self,
		ctx: &ResponseContext,
		route_name: &str,
		values: &RouteValues,
	) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment
{
	Literal(String),
	Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Template
{
	segments: Vec<Segment>,
}

impl Template
{
	fn parse(template: &str) -> Self
	{
		let segments = template
			.split('/')
			.filter(|segment| !segment.is_empty())
			.map(|segment| {
				segment
					.strip_prefix('{')
					.and_then(|segment| segment.strip_suffix('}'))
					.map_or_else(
						|| Segment::Literal(segment.to_owned()),
						|name| Segment::Param(name.to_owned()),
					)
			})
			.collect();

		Self { segments }
	}

	fn has_param(&self, name: &str) -> bool
	{
		self.segments
			.iter()
			.any(|segment| matches!(segment, Segment::Param(param) if param == name))
	}

	/// Renders the template on top of `base`.
	///
	/// Values that aren't used by any placeholder end up in the query string.
	fn render(&self, base: &Url, values: &RouteValues) -> Option<Url>
	{
		let mut url = base.clone();

		{
			let mut path = url.path_segments_mut().ok()?;
			path.pop_if_empty();

			for segment in &self.segments {
				match segment {
					Segment::Literal(literal) => path.push(literal),
					Segment::Param(name) => path.push(values.get(name)?),
				};
			}
		}

		let query = values
			.iter()
			.filter(|(name, _)| !self.has_param(name))
			.collect::<BTreeMap<_, _>>();

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query);
		}

		Some(url)
	}
}

/// A [`LinkGenerator`] backed by path templates like `/items/{id}`.
///
/// Absolute URIs are built on top of the configured public URL. Without one, the scheme and
/// authority of the current request are used.
#[derive(Debug, Default, Clone)]
pub struct RouteTemplates
{
	templates: HashMap<String, Template>,
	public_url: Option<Url>,
}

impl RouteTemplates
{
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Creates a generator from the `[links]` section of the configuration.
	pub fn from_config(config: &LinksConfig) -> Self
	{
		let templates = config
			.routes
			.iter()
			.map(|(name, template)| (name.clone(), Template::parse(template)))
			.collect();

		Self { templates, public_url: config.public_url.clone() }
	}

	/// Registers a route template under `name`.
	#[must_use]
	pub fn route(mut self, name: impl Into<String>, template: &str) -> Self
	{
		self.templates.insert(name.into(), Template::parse(template));
		self
	}

	/// Sets the base URL for absolute URIs.
	#[must_use]
	pub fn public_url(mut self, public_url: Url) -> Self
	{
		self.public_url = Some(public_url);
		self
	}

	/// The scheme and authority of the current request.
	///
	/// The `Host` header is only used if it is a plain `host[:port]` authority.
	fn request_base(ctx: &ResponseContext) -> Option<Url>
	{
		let uri = ctx.uri();

		if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
			return base_url(scheme, authority);
		}

		let host = ctx
			.request_headers()
			.get(http::header::HOST)
			.and_then(|host| host.to_str().ok())?;

		let Ok(authority) = host.parse::<Authority>() else {
			tracing::debug!(%host, "`Host` header is not a valid authority");
			return None;
		};

		base_url("http", &authority)
	}
}

fn base_url(scheme: &str, authority: &Authority) -> Option<Url>
{
	if authority.as_str().contains('@') {
		tracing::debug!(%authority, "refusing to build links for an authority with userinfo");
		return None;
	}

	Url::parse(&format!("{scheme}://{authority}/")).ok()
}

impl LinkGenerator for RouteTemplates
{
	fn path_by_name(&self, route_name: &str, values: &RouteValues) -> Option<String>
	{
		let template = self.templates.get(route_name)?;
		let base = Url::parse("http://localhost/").ok()?;
		let url = template.render(&base, values)?;

		Some(url[url::Position::BeforePath..].to_owned())
	}

	fn uri_by_name(
		&self,
		ctx: &ResponseContext,
		route_name: &str,
		values: &RouteValues,
	) -> Option<String>
	{
		let template = self.templates.get(route_name)?;
		let base = match self.public_url {
			Some(ref public_url) => public_url.clone(),
			None => Self::request_base(ctx)?,
		};

		template.render(&base, values).map(String::from)
	}
}
