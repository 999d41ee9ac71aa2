//! Domain DTOs for the operadoras API.
//!
//! # Design
//! These types mirror the backend's response schema but are defined
//! independently from the server crate; integration tests catch any schema
//! drift between the two. Text fields the backend may omit default to empty
//! strings, and unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// A health-plan operator, keyed by its CNPJ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Operadora {
    pub cnpj: String,
    #[serde(default)]
    pub razao_social: String,
    #[serde(default)]
    pub registro_ans: String,
    #[serde(default)]
    pub modalidade: String,
    #[serde(default)]
    pub uf: String,
}

/// One quarter's expense total for an operadora.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Despesa {
    pub ano: i32,
    pub trimestre: u8,
    pub valor: f64,
}

/// One page of the operadoras listing plus its pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperadorasPage {
    pub data: Vec<Operadora>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopOperadora {
    pub cnpj: String,
    #[serde(default)]
    pub razao_social: String,
    #[serde(default)]
    pub uf: String,
    pub total_despesas: f64,
}

/// Expense aggregate for one state (UF).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgregadoPorUf {
    pub uf: String,
    pub total_despesas: f64,
    pub qtd_operadoras: u64,
    pub media_por_operadora: f64,
}

/// Aggregate statistics over every operadora and expense record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Estatisticas {
    pub total_despesas: f64,
    pub media_por_operadora: f64,
    #[serde(default)]
    pub top_5_operadoras: Vec<TopOperadora>,
    #[serde(default)]
    pub por_uf: Vec<AgregadoPorUf>,
}

/// Parameters of the operadoras listing.
///
/// `None` fields, and `q` values that are blank after trimming, are left out
/// of the query string entirely; the backend then applies its own defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub q: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: Some(1),
            limit: Some(10),
            q: None,
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }
}
