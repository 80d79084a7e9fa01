//! # Route Kit - Route Declarations That Document Themselves
//!
//! `route_kit` registers HTTP handlers from a list of route declarations and,
//! in the same pass, compiles an OpenAPI-shaped document from the shapes of
//! each route's parameters, body and responses.
//!
//! ## Core Features:
//!
//! - **`#[derive(Shape)]`**: describes a struct's fields, wire names and
//!   validation directives (`#[shape(binding = "required,min=4")]`) to the
//!   schema compiler.
//!
//! - **`compile`**: turns a [`TypeDescriptor`] into a JSON-Schema [`SchemaNode`],
//!   folding `min`/`max`/`len`/`email` directives into the node and collecting
//!   `required` fields.
//!
//! - **`RouteRegistry`**: binds each route through a [`RouteBinder`] (axum via
//!   [`RestRouterBuilder`]) and writes its operation under
//!   `paths[<path>][<method>]`, then publishes the frozen document as an
//!   [`ApiSpec`].
//!
//! - **`validate`**: enforces the same binding directives on a request value,
//!   so handlers reject what the document says is invalid.

extern crate self as route_kit;

#[cfg(feature = "axum")]
pub mod bootstrap;
pub mod compiler;
pub mod config;
pub mod descriptor;
pub mod directive;
pub mod document;
pub mod error;
pub mod registry;
#[cfg(feature = "axum")]
pub mod rest_router_builder;
pub mod route;
pub mod schema;
pub mod validate;

#[cfg(feature = "axum")]
pub use bootstrap::rest_router_from_routes;
pub use compiler::{compile, SchemaCompiler, ShapeRef};
pub use config::DocConfig;
pub use descriptor::{FieldDescriptor, FieldType, Shape, TypeDescriptor};
pub use directive::Directives;
pub use document::{Document, Info, Operation, ParamIn, Parameter};
pub use error::{Error, Result};
pub use registry::{normalize_path, to_openapi_path, ApiSpec, RouteBinder, RouteRegistry};
#[cfg(feature = "axum")]
pub use rest_router_builder::{RestHandler, RestRouterBuilder};
pub use route::{Method, Route, RouteSchema};
pub use schema::{Format, SchemaNode};
pub use validate::validate;

#[cfg(feature = "macros")]
pub use route_kit_macros::Shape;
