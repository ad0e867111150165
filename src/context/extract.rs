use std::sync::Arc;

use axum_core::body::Body;
use axum_core::extract::FromRequestParts;
use axum_core::response::{IntoResponse, Response};

use super::ResponseContext;
use crate::endpoint::EndpointDefinition;
use crate::error::{ConfigError, SendError};

impl<S> FromRequestParts<S> for ResponseContext
where
	S: Send + Sync,
{
	type Rejection = SendError;

	#[tracing::instrument(level = "trace", skip_all, err(level = "debug"))]
	async fn from_request_parts(
		parts: &mut http::request::Parts,
		_: &S,
	) -> Result<Self, Self::Rejection>
	{
		let endpoint = parts
			.extensions
			.get::<Arc<EndpointDefinition>>()
			.cloned()
			.ok_or(ConfigError::MissingEndpoint)?;

		Ok(Self::new(parts, endpoint))
	}
}

impl IntoResponse for ResponseContext
{
	fn into_response(mut self) -> Response
	{
		self.flush_headers();

		let mut response = Response::new(Body::from(self.body.freeze()));

		*response.status_mut() = self.status;
		*response.headers_mut() = self.headers;

		response
	}
}
