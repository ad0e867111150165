//! The serializer binding.
//!
//! [`ResponseSender`] does not know how to turn payloads into bytes; it hands them to a
//! [`ResponseSerializer`] together with the content type it wants on the wire. Applications
//! usually use [`EncodingSerializer`] with their MemoryPack [`Codec`].
//!
//! [`ResponseSender`]: crate::ResponseSender

use std::future::Future;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::context::ResponseContext;
use crate::error::{BoxError, SendError};

/// The content type tag identifying MemoryPack payloads.
pub const BINARY_CONTENT_TYPE: &str = "application/x-memorypack";

/// Options for codecs that produce JSON.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct JsonOptions
{
	/// Pretty-print the output.
	pub pretty: bool,
}

/// Writes response payloads.
///
/// A single serializer is configured once when the application starts and is shared by all
/// requests afterwards.
pub trait ResponseSerializer: Send + Sync + 'static
{
	/// Serializes `payload` into the body of `ctx`.
	///
	/// Implementations must set the `Content-Type` header to `content_type` and return
	/// [`SendError::Cancelled`] if `cancellation` fires before the body is written.
	fn serialize<T>(
		&self,
		ctx: &mut ResponseContext,
		payload: &T,
		content_type: &'static str,
		json_options: Option<&JsonOptions>,
		cancellation: CancellationToken,
	) -> impl Future<Output = Result<(), SendError>> + Send
	where
		T: Serialize + ?Sized + Sync;
}

/// A serde-based data format.
pub trait Codec: Send + Sync + 'static
{
	/// The media type of encoded payloads.
	const CONTENT_TYPE: &'static str;

	/// Encodes `value`.
	///
	/// `json_options` only matter to codecs that produce JSON.
	fn encode<T>(&self, value: &T, json_options: Option<&JsonOptions>) -> Result<Bytes, BoxError>
	where
		T: Serialize + ?Sized;

	/// Decodes a `T` from `bytes`.
	fn decode<T>(&self, bytes: &[u8]) -> Result<T, BoxError>
	where
		T: DeserializeOwned;
}

/// The framework's default JSON format.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec
{
	const CONTENT_TYPE: &'static str = "application/json";

	fn encode<T>(&self, value: &T, json_options: Option<&JsonOptions>) -> Result<Bytes, BoxError>
	where
		T: Serialize + ?Sized,
	{
		let pretty = json_options.is_some_and(|options| options.pretty);
		let bytes = if pretty {
			serde_json::to_vec_pretty(value)?
		} else {
			serde_json::to_vec(value)?
		};

		Ok(Bytes::from(bytes))
	}

	fn decode<T>(&self, bytes: &[u8]) -> Result<T, BoxError>
	where
		T: DeserializeOwned,
	{
		serde_json::from_slice(bytes).map_err(Into::into)
	}
}

/// A [`ResponseSerializer`] that encodes the whole payload with a [`Codec`] and writes it in one
/// go.
///
/// JSON options passed by the caller take precedence over the ones configured here.
#[derive(Debug, Default, Clone)]
pub struct EncodingSerializer<C>
{
	codec: C,
	json_options: Option<JsonOptions>,
}

impl<C: Codec> EncodingSerializer<C>
{
	pub fn new(codec: C) -> Self
	{
		Self { codec, json_options: None }
	}

	/// Sets the JSON options used when the caller doesn't pass any.
	#[must_use]
	pub fn with_json_options(mut self, json_options: JsonOptions) -> Self
	{
		self.json_options = Some(json_options);
		self
	}

	pub fn codec(&self) -> &C
	{
		&self.codec
	}
}

impl<C: Codec> ResponseSerializer for EncodingSerializer<C>
{
	#[tracing::instrument(level = "trace", skip_all, fields(%content_type), err(level = "debug"))]
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
		if cancellation.is_cancelled() {
			return Err(SendError::Cancelled);
		}

		let body = self
			.codec
			.encode(payload, json_options.or(self.json_options.as_ref()))
			.map_err(SendError::Encode)?;

		ctx.headers_mut().insert(
			http::header::CONTENT_TYPE,
			http::HeaderValue::from_static(content_type),
		);

		ctx.write_body(&body[..], &cancellation)?;
		ctx.complete(&cancellation)
	}
}
