//! Response interceptors.
//!
//! An interceptor gets to look at a response before [`ResponseSender::send_intercepted()`]
//! writes it. It may write a completely different response to the context, in which case the
//! original payload is discarded, or do nothing and let the payload through.
//!
//! [`ResponseSender::send_intercepted()`]: crate::ResponseSender::send_intercepted

use std::any::Any;

use futures_util::future::BoxFuture;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::context::ResponseContext;
use crate::error::SendError;

/// A request validation failure reported to interceptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure
{
	/// The request property that failed validation.
	pub property: String,

	/// What was wrong with it.
	pub message: String,
}

impl ValidationFailure
{
	pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self
	{
		Self { property: property.into(), message: message.into() }
	}
}

/// Runs before a response is sent and may replace it.
///
/// Interceptors can be configured per endpoint (see [`EndpointDefinition`]) and globally (see
/// [`ResponseSender`]); the endpoint's interceptor wins.
///
/// [`EndpointDefinition`]: crate::EndpointDefinition
/// [`ResponseSender`]: crate::ResponseSender
pub trait ResponseInterceptor: Send + Sync + 'static
{
	/// Inspects `response` before it is sent.
	///
	/// Starting the response on `ctx` (e.g. by writing a body) suppresses the original one.
	fn intercept<'a>(
		&'a self,
		response: &'a (dyn Any + Send + Sync),
		status: http::StatusCode,
		ctx: &'a mut ResponseContext,
		failures: &'a [ValidationFailure],
		cancellation: CancellationToken,
	) -> BoxFuture<'a, Result<(), SendError>>;
}
