//! Synchronous API client core for the operadoras service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `OperadorasClient` is stateless; it holds only the origin URL.
//! - Each read operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - DTOs are defined independently from the server crate; integration
//!   tests catch schema drift.
//! - `Route` is the app shell's static route table.

pub mod client;
pub mod error;
pub mod http;
pub mod route;
pub mod types;

pub use client::{encode_segment, OperadorasClient, API_BASE};
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse};
pub use route::Route;
pub use types::{AgregadoPorUf, Despesa, Estatisticas, ListOptions, Operadora, OperadorasPage, TopOperadora};
