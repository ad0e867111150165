//! Errors returned by the response helpers.

use std::panic::Location;

use axum_core::response::{IntoResponse, Response};
use thiserror::Error;

use crate::problem_details::{Problem, ProblemDetails};
use crate::routes::EndpointId;

/// Type-erased error produced by codecs.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A setup defect.
///
/// These are never the client's fault and retrying will not help; the application has to be
/// configured differently.
#[derive(Debug, Error)]
pub enum ConfigError
{
	/// No [`LinkGenerator`] was registered in the request's extensions.
	///
	/// [`LinkGenerator`]: crate::LinkGenerator
	#[error(
		"no link generator was found in the request extensions; when running endpoints outside \
		 of a server (e.g. in unit tests), insert an `Arc<dyn LinkGenerator>` into the request \
		 extensions manually"
	)]
	MissingLinkGenerator,

	/// `send_intercepted` was called, but neither the endpoint nor the sender has an
	/// interceptor.
	#[error(
		"endpoint `{endpoint}` has no response interceptor configured and no global interceptor \
		 is set, but `send_intercepted` requires one"
	)]
	MissingInterceptor
	{
		/// The endpoint that was being served.
		endpoint: EndpointId,
	},

	/// The request extensions did not contain an [`EndpointDefinition`].
	///
	/// [`EndpointDefinition`]: crate::EndpointDefinition
	#[error("no endpoint definition was registered for this route")]
	MissingEndpoint,
}

/// Failure to send a response.
#[derive(Debug, Error)]
pub enum SendError
{
	/// See [`ConfigError`].
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The cancellation signal fired before the body could be written.
	#[error("response was cancelled before it could be written")]
	Cancelled,

	/// The codec failed to encode the payload.
	#[error("failed to encode response body: {0}")]
	Encode(#[source] BoxError),
}

impl SendError
{
	/// Returns whether this error is [`SendError::Cancelled`].
	pub fn is_cancelled(&self) -> bool
	{
		matches!(self, Self::Cancelled)
	}
}

impl IntoResponse for SendError
{
	#[track_caller]
	fn into_response(self) -> Response
	{
		let problem = match self {
			Self::Config(ref error) => {
				tracing::error!(loc = %Location::caller(), error = error as &dyn std::error::Error);
				Problem::Configuration
			},
			Self::Encode(ref error) => {
				tracing::error!(loc = %Location::caller(), error = &**error as &dyn std::error::Error);
				Problem::EncodeResponseBody
			},
			Self::Cancelled => {
				tracing::debug!("response cancelled");
				Problem::Cancelled
			},
		};

		ProblemDetails::new(problem).into_response()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::testing;

	#[test]
	fn missing_link_generator_mentions_manual_setup() -> testing::Result
	{
		let message = ConfigError::MissingLinkGenerator.to_string();

		testing::assert!(message.contains("manually"));
		testing::assert!(message.contains("LinkGenerator"));

		Ok(())
	}

	#[test]
	fn config_errors_render_as_500() -> testing::Result
	{
		let response = SendError::from(ConfigError::MissingLinkGenerator).into_response();

		testing::assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);

		Ok(())
	}

	#[test]
	fn cancellation_renders_as_503() -> testing::Result
	{
		testing::assert!(SendError::Cancelled.is_cancelled());
		testing::assert_eq!(
			SendError::Cancelled.into_response().status(),
			http::StatusCode::SERVICE_UNAVAILABLE,
		);

		Ok(())
	}
}
