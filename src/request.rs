//! Request bodies encoded with a [`Codec`].

use std::any::type_name;
use std::marker::PhantomData;
use std::ops::Deref;

use axum_core::extract::rejection::BytesRejection;
use axum_core::extract::{FromRequest, Request};
use axum_core::response::{IntoResponse, Response};
use bytes::Bytes;
use mime::Mime;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::BoxError;
use crate::problem_details::{Problem, ProblemDetails};
use crate::serializer::Codec;

/// An extractor that decodes the request body with the codec `C`.
///
/// The request's `Content-Type` has to match [`C::CONTENT_TYPE`], either exactly or as a
/// structured syntax suffix (`application/problem+json` is accepted by [`JsonCodec`]).
///
/// [`C::CONTENT_TYPE`]: Codec::CONTENT_TYPE
/// [`JsonCodec`]: crate::JsonCodec
#[derive(derive_more::Debug)]
pub struct Decoded<T, C>
{
	pub value: T,

	#[debug(skip)]
	codec: PhantomData<fn() -> C>,
}

impl<T, C> Decoded<T, C>
{
	pub fn into_inner(self) -> T
	{
		self.value
	}
}

impl<T, C> Deref for Decoded<T, C>
{
	type Target = T;

	fn deref(&self) -> &Self::Target
	{
		&self.value
	}
}

impl<T, C, S> FromRequest<S> for Decoded<T, C>
where
	T: DeserializeOwned,
	C: Codec + Default,
	S: Send + Sync,
{
	type Rejection = DecodedRejection;

	#[tracing::instrument(
		level = "debug",
		skip_all,
		fields(payload = type_name::<T>(), content_type = C::CONTENT_TYPE),
		err(level = "debug"),
	)]
	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection>
	{
		if !has_content_type(req.headers(), C::CONTENT_TYPE) {
			return Err(DecodedRejection::UnsupportedContentType { expected: C::CONTENT_TYPE });
		}

		let body = Bytes::from_request(req, state).await?;

		C::default()
			.decode(&body[..])
			.map(|value| Self { value, codec: PhantomData })
			.map_err(DecodedRejection::Decode)
	}
}

#[tracing::instrument(level = "trace", skip(headers), ret(level = "trace"))]
fn has_content_type(headers: &http::HeaderMap, expected: &'static str) -> bool
{
	let Ok(expected) = expected.parse::<Mime>() else {
		tracing::warn!(%expected, "codec content type is not a valid mime type");
		return false;
	};

	let Some(content_type) = headers.get(http::header::CONTENT_TYPE) else {
		tracing::debug!("request headers do not contain a `Content-Type` header");
		return false;
	};

	let Ok(content_type) = content_type.to_str() else {
		tracing::debug!("request headers contain a `Content-Type` header, but it's not UTF-8");
		return false;
	};

	let Ok(mime) = content_type.parse::<Mime>() else {
		tracing::debug!(
			"request headers contain a `Content-Type` header, but it's not a valid mime type"
		);
		return false;
	};

	mime.type_() == expected.type_()
		&& (mime.subtype() == expected.subtype() || mime.suffix() == Some(expected.subtype()))
}

/// Rejection used for [`Decoded`].
#[derive(Debug, Error)]
pub enum DecodedRejection
{
	/// The `Content-Type` header was missing or didn't match the codec.
	#[error("missing or unsupported `Content-Type`; expected `{expected}`")]
	UnsupportedContentType
	{
		expected: &'static str
	},

	/// The body could not be buffered.
	#[error(transparent)]
	BufferBody(#[from] BytesRejection),

	/// The codec rejected the body.
	#[error("failed to decode request body")]
	Decode(#[source] BoxError),
}

impl IntoResponse for DecodedRejection
{
	fn into_response(self) -> Response
	{
		match self {
			Self::UnsupportedContentType { expected } => {
				let mut problem_details = ProblemDetails::new(Problem::UnsupportedMediaType);
				problem_details.add_extension_member("expected_content_type", expected);
				problem_details.into_response()
			},
			Self::BufferBody(rejection) => rejection.into_response(),
			Self::Decode(error) => ProblemDetails::new(Problem::DecodeRequestBody)
				.with_detail(error.to_string())
				.into_response(),
		}
	}
}
