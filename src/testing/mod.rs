//! Utilities for unit tests.

use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;
use http::StatusCode;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::context::ResponseContext;
use crate::endpoint::EndpointDefinition;
use crate::error::SendError;
use crate::intercept::{ResponseInterceptor, ValidationFailure};
use crate::links::{LinkGenerator, RouteValues};
use crate::serializer::{EncodingSerializer, JsonCodec, JsonOptions, ResponseSerializer};

mod macros;

pub(crate) use macros::*;

pub type Error = anyhow::Error;
pub type Result<T = (), E = Error> = std::result::Result<T, E>;

/// The endpoint type used by [`endpoint()`].
#[derive(Debug)]
pub struct TestEndpoint;

/// Request parts for a `GET` request to `uri`.
pub fn request_parts(uri: &str) -> Result<http::request::Parts>
{
	let (parts, ()) = http::Request::get(uri).body(())?.into_parts();
	Ok(parts)
}

pub fn endpoint() -> Arc<EndpointDefinition>
{
	Arc::new(EndpointDefinition::of::<TestEndpoint>())
}

/// A fresh context for a `GET /` request to [`TestEndpoint`].
pub fn context() -> ResponseContext
{
	let (parts, ()) = http::Request::new(()).into_parts();
	ResponseContext::new(&parts, endpoint())
}

/// Like [`context()`], but with `links` registered as the request's link generator.
pub fn context_with_links(links: Arc<dyn LinkGenerator>) -> ResponseContext
{
	let (mut parts, ()) = http::Request::new(()).into_parts();
	parts.extensions.insert(links);
	ResponseContext::new(&parts, endpoint())
}

pub fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T>
{
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a [`RecordingSerializer`] observed when it was invoked.
#[derive(Debug, Clone)]
pub struct SerializeCall
{
	pub content_type: &'static str,
	pub json_options: Option<JsonOptions>,
	pub status: StatusCode,
	pub was_started: bool,
	pub cancellation: CancellationToken,
}

/// Encodes payloads as JSON and records every invocation.
#[derive(Debug, Default, Clone)]
pub struct RecordingSerializer
{
	inner: EncodingSerializer<JsonCodec>,
	calls: Arc<Mutex<Vec<SerializeCall>>>,
}

impl RecordingSerializer
{
	pub fn calls(&self) -> Vec<SerializeCall>
	{
		lock(&self.calls).clone()
	}
}

impl ResponseSerializer for RecordingSerializer
{
	async fn serialize<T>(
		&self,
		ctx: &mut ResponseContext,
		payload: &T,
		content_type: &'static str,
		json_options: Option<&JsonOptions>,
		cancellation: CancellationToken,
	) -> Result<(), SendError>
	where
		T: Serialize + ?Sized + Sync,
	{
		lock(&self.calls).push(SerializeCall {
			content_type,
			json_options: json_options.copied(),
			status: ctx.status(),
			was_started: ctx.has_started(),
			cancellation: cancellation.clone(),
		});

		self.inner
			.serialize(ctx, payload, content_type, json_options, cancellation)
			.await
	}
}

/// A link generator returning canned links.
#[derive(Debug, Default)]
pub struct StubLinks
{
	pub path: Option<String>,
	pub uri: Option<String>,
	requests: Mutex<Vec<(String, RouteValues, bool)>>,
}

impl StubLinks
{
	pub fn new(path: Option<&str>, uri: Option<&str>) -> Self
	{
		Self { path: path.map(String::from), uri: uri.map(String::from), ..Self::default() }
	}

	/// Every `(route_name, values, absolute)` this generator was asked for.
	pub fn requests(&self) -> Vec<(String, RouteValues, bool)>
	{
		lock(&self.requests).clone()
	}
}

impl LinkGenerator for StubLinks
{
	fn path_by_name(&self, route_name: &str, values: &RouteValues) -> Option<String>
	{
		lock(&self.requests).push((route_name.to_owned(), values.clone(), false));
		self.path.clone()
	}

	fn uri_by_name(
		&self,
		_: &ResponseContext,
		route_name: &str,
		values: &RouteValues,
	) -> Option<String>
	{
		lock(&self.requests).push((route_name.to_owned(), values.clone(), true));
		self.uri.clone()
	}
}

/// What an interceptor saw.
#[derive(Debug, Clone)]
pub struct InterceptCall
{
	pub payload_type: Option<&'static str>,
	pub status: StatusCode,
	pub failures: Vec<ValidationFailure>,
	pub cancellation: CancellationToken,
}

/// An interceptor that records its invocations and optionally replaces the response with
/// `400 Bad Request` and a fixed body.
#[derive(Debug, Default)]
pub struct RecordingInterceptor
{
	replace: bool,
	calls: Mutex<Vec<InterceptCall>>,
}

impl RecordingInterceptor
{
	pub fn passing() -> Self
	{
		Self::default()
	}

	pub fn replacing() -> Self
	{
		Self { replace: true, ..Self::default() }
	}

	pub fn calls(&self) -> Vec<InterceptCall>
	{
		lock(&self.calls).clone()
	}
}

/// The body written by [`RecordingInterceptor::replacing()`].
pub const REPLACED_BODY: &[u8] = b"intercepted";

impl ResponseInterceptor for RecordingInterceptor
{
	fn intercept<'a>(
		&'a self,
		response: &'a (dyn Any + Send + Sync),
		status: StatusCode,
		ctx: &'a mut ResponseContext,
		failures: &'a [ValidationFailure],
		cancellation: CancellationToken,
	) -> BoxFuture<'a, Result<(), SendError>>
	{
		Box::pin(async move {
			let payload_type = if response.is::<String>() {
				Some("String")
			} else if response.is::<u32>() {
				Some("u32")
			} else {
				None
			};

			lock(&self.calls).push(InterceptCall {
				payload_type,
				status,
				failures: failures.to_vec(),
				cancellation: cancellation.clone(),
			});

			if self.replace {
				ctx.set_status(StatusCode::BAD_REQUEST);
				ctx.write_body(REPLACED_BODY, &cancellation)?;
				ctx.complete(&cancellation)?;
			}

			Ok(())
		})
	}
}
