use std::sync::Arc;

use crate::intercept::ResponseInterceptor;
use crate::routes::EndpointId;

/// Per-endpoint configuration consulted while sending responses.
///
/// Register one of these (wrapped in an [`Arc`]) in the request extensions of every route so
/// [`ResponseContext`] can be extracted.
///
/// [`ResponseContext`]: crate::ResponseContext
#[derive(derive_more::Debug, bon::Builder)]
pub struct EndpointDefinition
{
	#[builder(start_fn)]
	id: EndpointId,

	/// A custom display name.
	///
	/// Route names derived from a [`RouteKey`] never take this into account, so endpoints with
	/// a custom name should be targeted by route name when generating links.
	///
	/// [`RouteKey`]: crate::RouteKey
	#[builder(into)]
	display_name: Option<String>,

	/// Takes precedence over the sender's global interceptor.
	#[debug(skip)]
	interceptor: Option<Arc<dyn ResponseInterceptor>>,
}

impl EndpointDefinition
{
	/// Creates a definition for the endpoint type `E` with no further configuration.
	pub fn of<E: ?Sized + 'static>() -> Self
	{
		Self::builder(EndpointId::of::<E>()).build()
	}

	pub fn id(&self) -> EndpointId
	{
		self.id
	}

	/// The display name, falling back to the endpoint's type name.
	pub fn name(&self) -> &str
	{
		self.display_name.as_deref().unwrap_or_else(|| self.id.name())
	}

	pub fn interceptor(&self) -> Option<&Arc<dyn ResponseInterceptor>>
	{
		self.interceptor.as_ref()
	}
}
