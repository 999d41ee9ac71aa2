//! Async client for the operadoras API.
//!
//! Wraps the sans-IO [`operadoras_core`] with a `reqwest` transport and
//! exposes the four read operations as async methods:
//!
//! - [`Client::list_operadoras`]: one page of operadoras, optionally filtered
//! - [`Client::get_operadora`]: one operadora by CNPJ
//! - [`Client::get_despesas`]: the expense history of one operadora
//! - [`Client::get_estatisticas`]: aggregate statistics
//!
//! The [`views`] module renders the two app-shell views as text; the
//! `operadoras` binary wires them to the command line.
//!
//! # Error Handling
//!
//! All operations return `Result<T, ClientError>`. Transport failures are
//! passed through untouched as [`ClientError::Transport`]; error statuses
//! arrive as [`ClientError::Api`] whose display is the backend's `detail`
//! message (or `Erro {status}`).

pub mod client;
pub mod error;
pub mod views;

pub use client::Client;
pub use error::{ClientError, Result};
pub use operadoras_core::{
    AgregadoPorUf, ApiError, Despesa, Estatisticas, ListOptions, Operadora, OperadorasPage, Route, TopOperadora,
};
