//! The response-dispatch protocol.
//!
//! [`ResponseSender`] is the single entry point endpoints use to finalize their responses. All
//! of its operations follow the same rules:
//!
//! - headers (status, `Location`) are set before any part of the body is written
//! - a response is started at most once; whoever starts it first wins
//! - a missing cancellation token means "use the request's abort signal"

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::context::ResponseContext;
use crate::error::{ConfigError, SendError};
use crate::intercept::{ResponseInterceptor, ValidationFailure};
use crate::links::{LinkGenerator, RouteValues};
use crate::routes::{DefaultRouteNames, RouteKey, RouteRegistry};
use crate::serializer::{BINARY_CONTENT_TYPE, ResponseSerializer};

/// Pass this as the `body` of a created-at response that shouldn't have one.
pub const NO_BODY: Option<&'static ()> = None;

/// Sends responses through a [`ResponseSerializer`].
///
/// Construct one at startup and share it (it is cheap to clone) with every endpoint.
pub struct ResponseSender<S>
{
	serializer: Arc<S>,
	routes: Arc<dyn RouteRegistry>,
	interceptor: Option<Arc<dyn ResponseInterceptor>>,
}

#[bon::bon]
impl<S: ResponseSerializer> ResponseSender<S>
{
	/// Creates a new [`ResponseSender`].
	///
	/// `routes` defaults to [`DefaultRouteNames`]; `interceptor` is the global interceptor used
	/// by endpoints that don't configure their own.
	#[builder]
	pub fn new(
		#[builder(start_fn)] serializer: S,
		#[builder(default = Arc::new(DefaultRouteNames) as Arc<dyn RouteRegistry>)]
		routes: Arc<dyn RouteRegistry>,
		interceptor: Option<Arc<dyn ResponseInterceptor>>,
	) -> Self
	{
		Self { serializer: Arc::new(serializer), routes, interceptor }
	}

	pub fn serializer(&self) -> &S
	{
		&self.serializer
	}

	/// Resolves `key` to a route name using the configured [`RouteRegistry`].
	pub fn route_name(&self, key: &RouteKey) -> String
	{
		self.routes.route_name(key)
	}

	/// Sends `payload` with status `200 OK`.
	pub async fn send_ok<T>(
		&self,
		ctx: &mut ResponseContext,
		payload: &T,
		cancellation: Option<CancellationToken>,
	) -> Result<(), SendError>
	where
		T: Serialize + ?Sized + Sync,
	{
		self.send(ctx, payload, StatusCode::OK, cancellation).await
	}

	/// Sends `payload` as a binary response with the given `status`.
	///
	/// Starting the response is idempotent, so this is safe to call on a context that was
	/// already started by someone else; it is up to the caller to check
	/// [`ResponseContext::has_started()`] if that matters.
	#[tracing::instrument(
		level = "debug",
		skip_all,
		fields(endpoint = %ctx.endpoint().name(), %status),
		err(level = "debug"),
	)]
	pub async fn send<T>(
		&self,
		ctx: &mut ResponseContext,
		payload: &T,
		status: StatusCode,
		cancellation: Option<CancellationToken>,
	) -> Result<(), SendError>
	where
		T: Serialize + ?Sized + Sync,
	{
		let cancellation = ctx.resolve_cancellation(cancellation);

		ctx.start();
		ctx.set_status(status);

		self.serializer
			.serialize(ctx, payload, BINARY_CONTENT_TYPE, None, cancellation)
			.await
	}

	/// Sends a `201 Created` response whose `Location` points at the route `route_name`.
	///
	/// The link is generated by the [`LinkGenerator`] registered in the request extensions and
	/// written verbatim; if it can't generate one, the header is left empty. `absolute`
	/// controls whether the link includes scheme and authority; applications usually pass
	/// [`LinksConfig::absolute`] here.
	///
	/// Without a `body` (see [`NO_BODY`]), the response is completed empty.
	///
	/// [`LinksConfig::absolute`]: crate::config::LinksConfig::absolute
	#[tracing::instrument(
		level = "debug",
		skip(self, ctx, route_values, body, cancellation),
		fields(endpoint = %ctx.endpoint().name()),
		err(level = "debug"),
	)]
	pub async fn send_created_at<T>(
		&self,
		ctx: &mut ResponseContext,
		route_name: &str,
		route_values: &RouteValues,
		body: Option<&T>,
		absolute: bool,
		cancellation: Option<CancellationToken>,
	) -> Result<(), SendError>
	where
		T: Serialize + ?Sized + Sync,
	{
		self.created_at(ctx, route_name, route_values, body, absolute, cancellation)
			.await
	}

	/// Like [`ResponseSender::send_created_at()`], but targets the route registered for `key`.
	///
	/// Endpoints with a custom display name may not be registered under the name derived
	/// from their key; use [`ResponseSender::send_created_at()`] with the actual route name for
	/// those.
	#[tracing::instrument(
		level = "debug",
		skip(self, ctx, route_values, body, cancellation),
		fields(endpoint = %ctx.endpoint().name(), route_name = tracing::field::Empty),
		err(level = "debug"),
	)]
	pub async fn send_created_at_endpoint<T>(
		&self,
		ctx: &mut ResponseContext,
		key: &RouteKey,
		route_values: &RouteValues,
		body: Option<&T>,
		absolute: bool,
		cancellation: Option<CancellationToken>,
	) -> Result<(), SendError>
	where
		T: Serialize + ?Sized + Sync,
	{
		let route_name = self.route_name(key);
		tracing::Span::current().record("route_name", route_name.as_str());

		self.created_at(ctx, &route_name, route_values, body, absolute, cancellation)
			.await
	}

	/// Lets the configured [`ResponseInterceptor`] see `response` first, and sends it if the
	/// interceptor didn't start a response of its own.
	///
	/// # Errors
	///
	/// Fails with [`ConfigError::MissingInterceptor`] if neither the endpoint nor this sender
	/// has an interceptor.
	#[tracing::instrument(
		level = "debug",
		skip_all,
		fields(endpoint = %ctx.endpoint().name(), %status, failures = failures.len()),
		err(level = "debug"),
	)]
	pub async fn send_intercepted<T>(
		&self,
		ctx: &mut ResponseContext,
		response: &T,
		status: StatusCode,
		failures: &[ValidationFailure],
		cancellation: Option<CancellationToken>,
	) -> Result<(), SendError>
	where
		T: Serialize + Any + Send + Sync,
	{
		let interceptor = ctx
			.endpoint()
			.interceptor()
			.or(self.interceptor.as_ref())
			.map(Arc::clone)
			.ok_or_else(|| ConfigError::MissingInterceptor { endpoint: ctx.endpoint().id() })?;

		let cancellation = ctx.resolve_cancellation(cancellation);

		interceptor
			.intercept(response, status, ctx, failures, cancellation.clone())
			.await?;

		if ctx.has_started() {
			tracing::debug!("interceptor sent its own response");
			return Ok(());
		}

		self.send(ctx, response, status, Some(cancellation)).await
	}

	async fn created_at<T>(
		&self,
		ctx: &mut ResponseContext,
		route_name: &str,
		route_values: &RouteValues,
		body: Option<&T>,
		absolute: bool,
		cancellation: Option<CancellationToken>,
	) -> Result<(), SendError>
	where
		T: Serialize + ?Sized + Sync,
	{
		let links = ctx
			.service::<Arc<dyn LinkGenerator>>()
			.map(Arc::clone)
			.ok_or(ConfigError::MissingLinkGenerator)?;

		let cancellation = ctx.resolve_cancellation(cancellation);

		ctx.start();
		ctx.set_status(StatusCode::CREATED);

		let location = if absolute {
			links.uri_by_name(ctx, route_name, route_values)
		} else {
			links.path_by_name(route_name, route_values)
		};

		ctx.headers_mut()
			.insert(http::header::LOCATION, location_header(location.as_deref()));

		match body {
			None => ctx.complete(&cancellation),
			Some(body) => {
				self.send(ctx, body, StatusCode::CREATED, Some(cancellation))
					.await
			},
		}
	}
}

/// Turns a generated link into a `Location` value.
///
/// Links are not validated; anything that can't be represented as a header value ends up as
/// an empty header, just like a missing link.
fn location_header(location: Option<&str>) -> http::HeaderValue
{
	let Some(location) = location else {
		tracing::debug!("link generator did not produce a location");
		return http::HeaderValue::from_static("");
	};

	http::HeaderValue::from_str(location).unwrap_or_else(|error| {
		tracing::warn!(%location, %error, "generated location is not a valid header value");
		http::HeaderValue::from_static("")
	})
}

impl<S> Clone for ResponseSender<S>
{
	fn clone(&self) -> Self
	{
		Self {
			serializer: Arc::clone(&self.serializer),
			routes: Arc::clone(&self.routes),
			interceptor: self.interceptor.clone(),
		}
	}
}

impl<S: fmt::Debug> fmt::Debug for ResponseSender<S>
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		fmt.debug_struct("ResponseSender")
			.field("serializer", &self.serializer)
			.field("has_interceptor", &self.interceptor.is_some())
			.finish_non_exhaustive()
	}
}
