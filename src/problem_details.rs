//! [RFC 9457][rfc] problem details for failed responses.
//!
//! Every error this crate turns into a response is rendered as an `application/problem+json`
//! body. The `type` member is built from a base URI that can be set once at startup with
//! [`set_base_uri()`]; without it, types are relative references of the form
//! `/problems/{slug}`.
//!
//! [rfc]: https://www.rfc-editor.org/rfc/rfc9457.html

use std::borrow::Cow;
use std::sync::OnceLock;

use axum_core::response::{IntoResponse, Response};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// The [`Content-Type`] used for problem responses.
///
/// [`Content-Type`]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Content-Type
pub const CONTENT_TYPE: &str = "application/problem+json";

const DEFAULT_BASE_URI: &str = "/problems";

static BASE_URI: OnceLock<http::Uri> = OnceLock::new();

/// Sets the base URI used for the `type` member.
///
/// Only the first call has any effect.
pub fn set_base_uri(uri: http::Uri)
{
	if BASE_URI.set(uri).is_err() {
		tracing::debug!("problem details base URI was already set");
	}
}

/// The kinds of problems this crate reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Problem
{
	/// The request's `Content-Type` is missing or does not match the expected codec.
	UnsupportedMediaType,

	/// The request body could not be decoded.
	DecodeRequestBody,

	/// The server is misconfigured.
	Configuration,

	/// The response body could not be encoded.
	EncodeResponseBody,

	/// The response was aborted before it could be written.
	Cancelled,
}

impl Problem
{
	/// The last path segment of the problem's type URI.
	pub fn slug(self) -> &'static str
	{
		match self {
			Self::UnsupportedMediaType => "unsupported-media-type",
			Self::DecodeRequestBody => "decode-request-body",
			Self::Configuration => "configuration",
			Self::EncodeResponseBody => "encode-response-body",
			Self::Cancelled => "cancelled",
		}
	}

	/// A short, human-readable summary of the problem type.
	pub fn title(self) -> &'static str
	{
		match self {
			Self::UnsupportedMediaType => "missing or unsupported `Content-Type` header",
			Self::DecodeRequestBody => "failed to decode request body",
			Self::Configuration => "the server is misconfigured; please report this incident",
			Self::EncodeResponseBody => "failed to encode response body",
			Self::Cancelled => "the response was aborted",
		}
	}

	/// The status code associated with this problem type.
	pub fn status(self) -> http::StatusCode
	{
		match self {
			Self::UnsupportedMediaType => http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
			Self::DecodeRequestBody => http::StatusCode::BAD_REQUEST,
			Self::Configuration | Self::EncodeResponseBody => {
				http::StatusCode::INTERNAL_SERVER_ERROR
			},
			Self::Cancelled => http::StatusCode::SERVICE_UNAVAILABLE,
		}
	}

	/// The full `type` URI.
	pub fn uri(self) -> String
	{
		let base = BASE_URI.get().map_or(Cow::Borrowed(DEFAULT_BASE_URI), |uri| {
			Cow::Owned(uri.to_string())
		});

		format!("{}/{}", base.trim_end_matches('/'), self.slug())
	}
}

/// [RFC 9457][rfc] - Problem Details
///
/// [rfc]: https://www.rfc-editor.org/rfc/rfc9457.html
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemDetails
{
	problem: Problem,

	/// The [`detail`] member.
	///
	/// [`detail`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.4
	detail: Option<Cow<'static, str>>,

	/// Additional members, see [Section 3.2].
	///
	/// [Section 3.2]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.2
	extension_members: serde_json::Map<String, serde_json::Value>,
}

impl ProblemDetails
{
	/// Creates a new [`ProblemDetails`] for the given [`Problem`].
	pub fn new(problem: Problem) -> Self
	{
		Self { problem, detail: None, extension_members: serde_json::Map::new() }
	}

	/// Returns the problem type.
	pub fn problem(&self) -> Problem
	{
		self.problem
	}

	/// Returns the [`detail`] member, if any.
	///
	/// [`detail`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.4
	pub fn detail(&self) -> Option<&str>
	{
		self.detail.as_deref()
	}

	/// Populates the `detail` member.
	pub fn set_detail(&mut self, detail: impl Into<Cow<'static, str>>)
	{
		self.detail = Some(detail.into());
	}

	/// Builder-style version of [`ProblemDetails::set_detail()`].
	#[must_use]
	pub fn with_detail(mut self, detail: impl Into<Cow<'static, str>>) -> Self
	{
		self.set_detail(detail);
		self
	}

	/// Returns the value of the extension member with the given `name`, if any.
	pub fn extension_member(&self, name: &str) -> Option<&serde_json::Value>
	{
		self.extension_members.get(name)
	}

	/// Adds an extension member.
	///
	/// Values that cannot be represented as JSON are skipped.
	pub fn add_extension_member<V>(&mut self, name: impl Into<String>, value: &V)
	where
		V: ?Sized + Serialize,
	{
		let name = name.into();

		match serde_json::to_value(value) {
			Ok(value) => {
				self.extension_members.insert(name, value);
			},
			Err(error) => {
				tracing::warn!(%name, %error, "failed to serialize extension member");
			},
		}
	}
}

impl Serialize for ProblemDetails
{
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let field_count = 3 // type + status + title
			+ usize::from(self.detail.is_some())
			+ self.extension_members.len();

		let mut serializer = serializer.serialize_map(Some(field_count))?;

		serializer.serialize_entry("type", &self.problem.uri())?;
		serializer.serialize_entry("status", &self.problem.status().as_u16())?;
		serializer.serialize_entry("title", self.problem.title())?;

		if let Some(detail) = self.detail() {
			serializer.serialize_entry("detail", detail)?;
		}

		for (name, value) in &self.extension_members {
			serializer.serialize_entry(name, value)?;
		}

		serializer.end()
	}
}

impl IntoResponse for ProblemDetails
{
	fn into_response(self) -> Response
	{
		let status = self.problem.status();
		let body = match serde_json::to_vec(&self) {
			Ok(body) => body,
			Err(error) => {
				tracing::error!(%error, "failed to serialize problem details");
				return status.into_response();
			},
		};

		(
			status,
			[(http::header::CONTENT_TYPE, http::HeaderValue::from_static(CONTENT_TYPE))],
			body,
		)
			.into_response()
	}
}
