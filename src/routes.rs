//! Named routes.
//!
//! Endpoints register their routes under stable names that can later be used for reverse URL
//! generation. An endpoint serving several verbs or several routes registers one name per
//! combination, so a lookup is keyed by the endpoint type, qualified by the verb and the route
//! index when they are given. See [`RouteKey`].

use std::any::{self, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies an endpoint by its Rust type.
#[derive(Clone, Copy)]
pub struct EndpointId
{
	type_id: TypeId,
	path: &'static str,
}

impl EndpointId
{
	/// Returns the ID of the endpoint type `E`.
	pub fn of<E: ?Sized + 'static>() -> Self
	{
		Self { type_id: TypeId::of::<E>(), path: any::type_name::<E>() }
	}

	/// The fully qualified type name.
	pub fn path(&self) -> &'static str
	{
		self.path
	}

	/// The type name without its module path or generic arguments.
	pub fn name(&self) -> &'static str
	{
		let without_generics = self.path.split_once('<').map_or(self.path, |(name, _)| name);

		without_generics
			.rsplit_once("::")
			.map_or(without_generics, |(_, name)| name)
	}
}

impl PartialEq for EndpointId
{
	fn eq(&self, other: &Self) -> bool
	{
		self.type_id == other.type_id
	}
}

impl Eq for EndpointId {}

impl Hash for EndpointId
{
	fn hash<H: Hasher>(&self, state: &mut H)
	{
		self.type_id.hash(state);
	}
}

impl fmt::Debug for EndpointId
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		fmt.debug_tuple("EndpointId").field(&self.path).finish()
	}
}

impl fmt::Display for EndpointId
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		fmt.write_str(self.name())
	}
}

/// The key under which a named route is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey
{
	endpoint: EndpointId,
	verb: Option<http::Method>,
	route_index: Option<u32>,
}

impl RouteKey
{
	/// Creates a key for the given endpoint without any qualifiers.
	pub fn new(endpoint: EndpointId) -> Self
	{
		Self { endpoint, verb: None, route_index: None }
	}

	/// Creates a key for the endpoint type `E` without any qualifiers.
	pub fn of<E: ?Sized + 'static>() -> Self
	{
		Self::new(EndpointId::of::<E>())
	}

	/// Qualifies the key with an HTTP verb.
	#[must_use]
	pub fn with_verb(mut self, verb: http::Method) -> Self
	{
		self.verb = Some(verb);
		self
	}

	/// Qualifies the key with the index of one of the endpoint's routes.
	#[must_use]
	pub fn with_route_index(mut self, route_index: u32) -> Self
	{
		self.route_index = Some(route_index);
		self
	}

	pub fn endpoint(&self) -> EndpointId
	{
		self.endpoint
	}

	pub fn verb(&self) -> Option<&http::Method>
	{
		self.verb.as_ref()
	}

	pub fn route_index(&self) -> Option<u32>
	{
		self.route_index
	}

	/// The name the endpoint layer registers this route under by default.
	///
	/// The verb (if any) is title-cased and prefixed, the route index (if any) is appended:
	/// `(CreateItem, POST, 1)` becomes `PostCreateItem1`.
	pub fn default_name(&self) -> String
	{
		let mut name = String::new();

		if let Some(verb) = self.verb.as_ref().map(http::Method::as_str) {
			let mut chars = verb.chars();

			if let Some(first) = chars.next() {
				name.extend(first.to_uppercase());
				name.extend(chars.flat_map(char::to_lowercase));
			}
		}

		name.push_str(self.endpoint.name());

		if let Some(route_index) = self.route_index {
			name.push_str(&route_index.to_string());
		}

		name
	}
}

/// Resolves [`RouteKey`]s to route names.
///
/// Implementations must be deterministic and fully populated before the first request is
/// served.
pub trait RouteRegistry: Send + Sync + 'static
{
	/// Returns the name registered for `key`.
	fn route_name(&self, key: &RouteKey) -> String;
}

impl<F> RouteRegistry for F
where
	F: Fn(&RouteKey) -> String + Send + Sync + 'static,
{
	fn route_name(&self, key: &RouteKey) -> String
	{
		self(key)
	}
}

/// A [`RouteRegistry`] that only applies the default naming convention.
///
/// See [`RouteKey::default_name()`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRouteNames;

impl RouteRegistry for DefaultRouteNames
{
	fn route_name(&self, key: &RouteKey) -> String
	{
		key.default_name()
	}
}

/// A [`RouteRegistry`] with explicitly registered names.
///
/// Keys that were never registered fall back to [`RouteKey::default_name()`].
#[derive(Debug, Default, Clone)]
pub struct NamedRoutes
{
	names: HashMap<RouteKey, String>,
}

impl NamedRoutes
{
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Registers `name` for `key`, returning the previously registered name.
	pub fn insert(&mut self, key: RouteKey, name: impl Into<String>) -> Option<String>
	{
		self.names.insert(key, name.into())
	}

	/// Builder-style version of [`NamedRoutes::insert()`].
	#[must_use]
	pub fn with(mut self, key: RouteKey, name: impl Into<String>) -> Self
	{
		self.insert(key, name);
		self
	}
}

impl RouteRegistry for NamedRoutes
{
	fn route_name(&self, key: &RouteKey) -> String
	{
		if let Some(name) = self.names.get(key) {
			return name.clone();
		}

		let name = key.default_name();
		tracing::debug!(?key, %name, "no explicit route name registered; using default");
		name
	}
}
