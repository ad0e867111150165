//! The per-request [`ResponseContext`].

use std::sync::Arc;

use bytes::BytesMut;
use http::{HeaderMap, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::endpoint::EndpointDefinition;
use crate::error::SendError;

mod extract;

type StartedHook = Box<dyn FnOnce(&mut HeaderMap) + Send + Sync + 'static>;

/// The state of a response that is being produced for a single request.
///
/// A context starts out with status `200 OK`, no headers, and an empty body. Once it has been
/// [started](ResponseContext::start), it stays started; this is how the different ways of
/// sending a response detect that someone else already did.
///
/// Status and headers are flushed when the first body chunk is written or the response is
/// completed, whichever comes first. Started-hooks run at that point.
///
/// Contexts are owned by exactly one request handler at a time, so none of this is
/// synchronized.
#[derive(derive_more::Debug)]
pub struct ResponseContext
{
	method: http::Method,
	uri: http::Uri,
	request_headers: HeaderMap,

	#[debug(skip)]
	extensions: http::Extensions,

	endpoint: Arc<EndpointDefinition>,
	status: StatusCode,
	headers: HeaderMap,

	#[debug("{} bytes", body.len())]
	body: BytesMut,

	started: bool,
	flushed: bool,
	completed: bool,

	#[debug("{}", started_hooks.len())]
	started_hooks: Vec<StartedHook>,

	abort_signal: CancellationToken,
}

impl ResponseContext
{
	/// Creates a new context for the request described by `request`.
	///
	/// The request extensions act as the service scope of the request; a
	/// [`CancellationToken`] found in there is used as the request's abort signal.
	pub fn new(request: &http::request::Parts, endpoint: Arc<EndpointDefinition>) -> Self
	{
		let abort_signal = request
			.extensions
			.get::<CancellationToken>()
			.cloned()
			.unwrap_or_default();

		Self {
			method: request.method.clone(),
			uri: request.uri.clone(),
			request_headers: request.headers.clone(),
			extensions: request.extensions.clone(),
			endpoint,
			status: StatusCode::OK,
			headers: HeaderMap::new(),
			body: BytesMut::new(),
			started: false,
			flushed: false,
			completed: false,
			started_hooks: Vec::new(),
			abort_signal,
		}
	}

	pub fn method(&self) -> &http::Method
	{
		&self.method
	}

	pub fn uri(&self) -> &http::Uri
	{
		&self.uri
	}

	pub fn request_headers(&self) -> &HeaderMap
	{
		&self.request_headers
	}

	pub fn extensions(&self) -> &http::Extensions
	{
		&self.extensions
	}

	pub fn extensions_mut(&mut self) -> &mut http::Extensions
	{
		&mut self.extensions
	}

	/// Looks up a service registered for this request.
	pub fn service<T>(&self) -> Option<&T>
	where
		T: Send + Sync + 'static,
	{
		self.extensions.get::<T>()
	}

	pub fn endpoint(&self) -> &Arc<EndpointDefinition>
	{
		&self.endpoint
	}

	pub fn status(&self) -> StatusCode
	{
		self.status
	}

	pub fn set_status(&mut self, status: StatusCode)
	{
		self.status = status;
	}

	pub fn headers(&self) -> &HeaderMap
	{
		&self.headers
	}

	pub fn headers_mut(&mut self) -> &mut HeaderMap
	{
		&mut self.headers
	}

	/// The body written so far.
	pub fn body(&self) -> &[u8]
	{
		&self.body[..]
	}

	/// Whether the response has been started.
	pub fn has_started(&self) -> bool
	{
		self.started
	}

	/// Whether the response has been completed, i.e. no more body can be written.
	pub fn is_completed(&self) -> bool
	{
		self.completed
	}

	/// The request's own abort signal.
	pub fn abort_signal(&self) -> &CancellationToken
	{
		&self.abort_signal
	}

	/// Returns `cancellation`, or the request's abort signal if the caller didn't supply one.
	pub fn resolve_cancellation(&self, cancellation: Option<CancellationToken>) -> CancellationToken
	{
		cancellation.unwrap_or_else(|| self.abort_signal.clone())
	}

	/// Registers a hook that runs right before the status and headers are flushed.
	///
	/// Hooks see the final status and headers and may still modify the headers. Hooks
	/// registered after the headers have been flushed are never run.
	pub fn on_started<F>(&mut self, hook: F)
	where
		F: FnOnce(&mut HeaderMap) + Send + Sync + 'static,
	{
		if self.flushed {
			tracing::warn!("response headers already flushed; hook will never run");
			return;
		}

		self.started_hooks.push(Box::new(hook));
	}

	/// Marks the response as started.
	///
	/// Returns `true` if this call started the response, and `false` if it had already been
	/// started.
	pub fn start(&mut self) -> bool
	{
		if self.started {
			tracing::trace!("response already started");
			return false;
		}

		self.started = true;
		tracing::trace!("response started");

		true
	}

	/// Whether the status and headers have been flushed.
	pub fn is_flushed(&self) -> bool
	{
		self.flushed
	}

	/// Starts the response (if necessary) and runs the started-hooks, exactly once.
	fn flush_headers(&mut self)
	{
		self.start();

		if self.flushed {
			return;
		}

		self.flushed = true;

		for hook in self.started_hooks.drain(..) {
			hook(&mut self.headers);
		}

		tracing::trace!(status = %self.status, "response headers flushed");
	}

	/// Appends `chunk` to the response body, starting the response if necessary.
	pub fn write_body(
		&mut self,
		chunk: &[u8],
		cancellation: &CancellationToken,
	) -> Result<(), SendError>
	{
		if cancellation.is_cancelled() {
			return Err(SendError::Cancelled);
		}

		self.flush_headers();

		if self.completed {
			tracing::warn!(len = chunk.len(), "response already completed; dropping body chunk");
			return Ok(());
		}

		self.body.extend_from_slice(chunk);

		Ok(())
	}

	/// Starts (if necessary) and completes the response.
	///
	/// Completing an empty response is how a response without a body is sent.
	pub fn complete(&mut self, cancellation: &CancellationToken) -> Result<(), SendError>
	{
		if cancellation.is_cancelled() {
			return Err(SendError::Cancelled);
		}

		self.flush_headers();
		self.completed = true;

		Ok(())
	}
}
