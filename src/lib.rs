//! MemoryPack response helpers for axum endpoints.
//!
//! This crate implements the response-dispatch protocol used by endpoints that serialize their
//! bodies with a binary codec instead of the default JSON path:
//!
//! - [`ResponseSender::send`] finalizes a response exactly once through an injected
//!   [`ResponseSerializer`]
//! - [`ResponseSender::send_created_at`] and [`ResponseSender::send_created_at_endpoint`] emit
//!   `201 Created` responses with a `Location` header computed by a [`LinkGenerator`]
//! - [`ResponseSender::send_intercepted`] gives a [`ResponseInterceptor`] the first chance at
//!   writing the response

/*
 * memorypack-endpoints
 *
 * Copyright (C) 2024  AlphaKeks <alphakeks@dawn>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see https://www.gnu.org/licenses.
 */

#[cfg(test)]
mod testing;

pub mod config;
pub mod logging;
pub mod problem_details;

mod context;
mod endpoint;
mod error;
mod intercept;
mod links;
mod request;
mod routes;
mod sender;
mod serializer;

pub use self::{
	config::Config,
	context::ResponseContext,
	endpoint::EndpointDefinition,
	error::{BoxError, ConfigError, SendError},
	intercept::{ResponseInterceptor, ValidationFailure},
	links::{LinkGenerator, RouteTemplates, RouteValues, RouteValuesIter},
	request::{Decoded, DecodedRejection},
	routes::{DefaultRouteNames, EndpointId, NamedRoutes, RouteKey, RouteRegistry},
	sender::{NO_BODY, ResponseSender},
	serializer::{BINARY_CONTENT_TYPE, Codec, EncodingSerializer, JsonCodec, JsonOptions, ResponseSerializer},
};
