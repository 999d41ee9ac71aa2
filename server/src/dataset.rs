//! In-memory operadoras dataset and the read queries the API serves.
//!
//! The dataset is the three CSV exports of the operadoras database:
//! `operadoras.csv`, `despesas.csv` and `agregados.csv`. Every column is read
//! as text and numbers are parsed leniently; expense rows whose year, quarter
//! or value do not parse are skipped. A leading UTF-8 BOM is ignored.
//!
//! CNPJs are normalized to bare digits on load. Operadoras whose CNPJ is not
//! 14 digits are dropped, and the first record wins on duplicates. Expense
//! records are kept only when their CNPJ is valid.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OPERADORAS_CSV: &str = "operadoras.csv";
pub const DESPESAS_CSV: &str = "despesas.csv";
pub const AGREGADOS_CSV: &str = "agregados.csv";

const AGREGADOS_COLUMNS: [&str; 4] = ["uf", "total_despesas", "qtd_operadoras", "media_por_operadora"];

const SAMPLE_OPERADORAS: &str = include_str!("../data/operadoras.csv");
const SAMPLE_DESPESAS: &str = include_str!("../data/despesas.csv");
const SAMPLE_AGREGADOS: &str = include_str!("../data/agregados.csv");

/// Remove everything that is not an ASCII digit.
pub fn normalize_cnpj(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// A CNPJ is valid once it normalizes to exactly 14 digits.
pub fn is_valid_cnpj(value: &str) -> bool {
    normalize_cnpj(value).len() == 14
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("CSV(s) nao encontrado(s): [{}]", join_paths(.0))]
    MissingCsv(Vec<PathBuf>),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
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

/// An expense row as stored: keyed by CNPJ.
#[derive(Clone, Debug)]
pub struct DespesaRecord {
    pub cnpj: String,
    pub ano: i32,
    pub trimestre: u8,
    pub valor: f64,
}

/// An expense row as served: the CNPJ is implied by the request path.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Despesa {
    pub ano: i32,
    pub trimestre: u8,
    pub valor: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TopOperadora {
    pub cnpj: String,
    pub razao_social: String,
    pub uf: String,
    pub total_despesas: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AgregadoPorUf {
    pub uf: String,
    pub total_despesas: f64,
    pub qtd_operadoras: u64,
    pub media_por_operadora: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Estatisticas {
    pub total_despesas: f64,
    pub media_por_operadora: f64,
    pub top_5_operadoras: Vec<TopOperadora>,
    pub por_uf: Vec<AgregadoPorUf>,
}

#[derive(Deserialize)]
struct DespesaRow {
    #[serde(default)]
    cnpj: String,
    #[serde(default)]
    ano: String,
    #[serde(default)]
    trimestre: String,
    #[serde(default)]
    valor: String,
}

impl DespesaRow {
    fn parse(self) -> Option<DespesaRecord> {
        Some(DespesaRecord {
            ano: i32::try_from(parse_whole(&self.ano)?).ok()?,
            trimestre: u8::try_from(parse_whole(&self.trimestre)?).ok()?,
            valor: parse_number(&self.valor)?,
            cnpj: self.cnpj,
        })
    }
}

#[derive(Deserialize)]
struct AgregadoRow {
    #[serde(default)]
    uf: String,
    #[serde(default)]
    total_despesas: String,
    #[serde(default)]
    qtd_operadoras: String,
    #[serde(default)]
    media_por_operadora: String,
}

impl From<AgregadoRow> for AgregadoPorUf {
    fn from(row: AgregadoRow) -> Self {
        AgregadoPorUf {
            uf: row.uf.trim().to_string(),
            total_despesas: parse_number(&row.total_despesas).unwrap_or(0.0),
            qtd_operadoras: parse_whole(&row.qtd_operadoras)
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(0),
            media_por_operadora: parse_number(&row.media_por_operadora).unwrap_or(0.0),
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_whole(value: &str) -> Option<i64> {
    parse_number(value).filter(|v| v.fract() == 0.0).map(|v| v as i64)
}

/// Parse one CSV export, returning its header row and its records.
fn read_csv<T: DeserializeOwned>(text: &str) -> Result<(csv::StringRecord, Vec<T>), DatasetError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok((headers, rows))
}

fn read_file(path: &Path) -> Result<String, DatasetError> {
    std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    operadoras: Vec<Operadora>,
    despesas: Vec<DespesaRecord>,
    agregados: Vec<AgregadoPorUf>,
}

impl Dataset {
    /// Build a dataset from records, deriving the per-UF aggregates from them.
    pub fn new(operadoras: Vec<Operadora>, despesas: Vec<DespesaRecord>) -> Self {
        let mut seen = HashSet::new();
        let operadoras = operadoras
            .into_iter()
            .map(|op| Operadora {
                cnpj: normalize_cnpj(&op.cnpj),
                uf: op.uf.trim().to_string(),
                ..op
            })
            .filter(|op| op.cnpj.len() == 14 && seen.insert(op.cnpj.clone()))
            .collect();

        let despesas = despesas
            .into_iter()
            .map(|d| DespesaRecord {
                cnpj: normalize_cnpj(&d.cnpj),
                ..d
            })
            .filter(|d| d.cnpj.len() == 14 && d.valor.is_finite())
            .collect();

        let mut dataset = Self {
            operadoras,
            despesas,
            agregados: Vec::new(),
        };
        dataset.agregados = dataset.build_agregados();
        dataset
    }

    /// Replace the per-UF aggregates with precomputed rows, largest total first.
    pub fn with_agregados(mut self, mut agregados: Vec<AgregadoPorUf>) -> Self {
        agregados.sort_by(|a, b| b.total_despesas.total_cmp(&a.total_despesas));
        self.agregados = agregados;
        self
    }

    /// Parse the three CSV exports. An `agregados` export lacking any of the
    /// aggregate columns yields no per-UF rows.
    pub fn from_csv(operadoras: &str, despesas: &str, agregados: &str) -> Result<Self, DatasetError> {
        let (_, operadoras) = read_csv::<Operadora>(operadoras)?;
        let (_, despesas) = read_csv::<DespesaRow>(despesas)?;
        let despesas = despesas.into_iter().filter_map(DespesaRow::parse).collect();

        let (headers, agregados) = read_csv::<AgregadoRow>(agregados)?;
        let agregados = if AGREGADOS_COLUMNS.iter().all(|c| headers.iter().any(|h| h == *c)) {
            agregados.into_iter().map(AgregadoPorUf::from).collect()
        } else {
            Vec::new()
        };

        Ok(Self::new(operadoras, despesas).with_agregados(agregados))
    }

    /// Load `operadoras.csv`, `despesas.csv` and `agregados.csv` from `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, DatasetError> {
        let paths = [OPERADORAS_CSV, DESPESAS_CSV, AGREGADOS_CSV].map(|name| dir.join(name));
        let missing: Vec<PathBuf> = paths.iter().filter(|p| !p.exists()).cloned().collect();
        if !missing.is_empty() {
            return Err(DatasetError::MissingCsv(missing));
        }
        let [operadoras, despesas, agregados] = &paths;
        Self::from_csv(&read_file(operadoras)?, &read_file(despesas)?, &read_file(agregados)?)
    }

    /// The bundled sample data served when no data directory is configured.
    pub fn sample() -> Result<Self, DatasetError> {
        Self::from_csv(SAMPLE_OPERADORAS, SAMPLE_DESPESAS, SAMPLE_AGREGADOS)
    }

    pub fn operadoras(&self) -> &[Operadora] {
        &self.operadoras
    }

    /// Operadoras matching `q`, sorted by `razao_social`.
    ///
    /// A term containing digits matches CNPJs containing those digits; any
    /// other non-blank term is a case-insensitive match on `razao_social`.
    pub fn search(&self, q: Option<&str>) -> Vec<&Operadora> {
        let term = q.map(str::trim).unwrap_or_default();
        let digits = normalize_cnpj(term);
        let needle = term.to_lowercase();

        let mut found: Vec<&Operadora> = self
            .operadoras
            .iter()
            .filter(|op| {
                if !digits.is_empty() {
                    op.cnpj.contains(&digits)
                } else {
                    op.razao_social.to_lowercase().contains(&needle)
                }
            })
            .collect();
        found.sort_by(|a, b| a.razao_social.cmp(&b.razao_social));
        found
    }

    pub fn operadora(&self, cnpj: &str) -> Option<&Operadora> {
        let cnpj = normalize_cnpj(cnpj);
        self.operadoras.iter().find(|op| op.cnpj == cnpj)
    }

    /// Expense history of one operadora, oldest quarter first.
    pub fn despesas(&self, cnpj: &str) -> Vec<Despesa> {
        let cnpj = normalize_cnpj(cnpj);
        let mut rows: Vec<Despesa> = self
            .despesas
            .iter()
            .filter(|d| d.cnpj == cnpj)
            .map(|d| Despesa {
                ano: d.ano,
                trimestre: d.trimestre,
                valor: d.valor,
            })
            .collect();
        rows.sort_by_key(|d| (d.ano, d.trimestre));
        rows
    }

    pub fn estatisticas(&self) -> Estatisticas {
        let total_despesas: f64 = self.despesas.iter().map(|d| d.valor).sum();

        let mut per_operadora: BTreeMap<&str, f64> = BTreeMap::new();
        for d in &self.despesas {
            *per_operadora.entry(d.cnpj.as_str()).or_default() += d.valor;
        }
        let media_por_operadora = if per_operadora.is_empty() {
            0.0
        } else {
            per_operadora.values().sum::<f64>() / per_operadora.len() as f64
        };

        let by_cnpj: HashMap<&str, &Operadora> =
            self.operadoras.iter().map(|op| (op.cnpj.as_str(), op)).collect();

        let mut ranked: Vec<(&str, f64)> = per_operadora.iter().map(|(c, t)| (*c, *t)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let top_5_operadoras = ranked
            .into_iter()
            .take(5)
            .map(|(cnpj, total)| {
                let op = by_cnpj.get(cnpj);
                TopOperadora {
                    cnpj: cnpj.to_string(),
                    razao_social: op.map(|o| o.razao_social.clone()).unwrap_or_default(),
                    uf: op.map(|o| o.uf.clone()).unwrap_or_default(),
                    total_despesas: total,
                }
            })
            .collect();

        Estatisticas {
            total_despesas,
            media_por_operadora,
            top_5_operadoras,
            por_uf: self.agregados.clone(),
        }
    }

    /// Expense totals per UF, largest first. Only UFs with at least one
    /// expense record appear; `qtd_operadoras` counts every operadora
    /// registered in that UF.
    fn build_agregados(&self) -> Vec<AgregadoPorUf> {
        let by_cnpj: HashMap<&str, &Operadora> =
            self.operadoras.iter().map(|op| (op.cnpj.as_str(), op)).collect();

        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for d in &self.despesas {
            if let Some(op) = by_cnpj.get(d.cnpj.as_str()).filter(|op| !op.uf.is_empty()) {
                *totals.entry(op.uf.as_str()).or_default() += d.valor;
            }
        }

        let mut counts: HashMap<&str, HashSet<&str>> = HashMap::new();
        for op in self.operadoras.iter().filter(|op| !op.uf.is_empty()) {
            counts.entry(op.uf.as_str()).or_default().insert(op.cnpj.as_str());
        }

        let mut rows: Vec<AgregadoPorUf> = totals
            .into_iter()
            .map(|(uf, total)| {
                let qtd = counts.get(uf).map_or(0, |c| c.len() as u64);
                AgregadoPorUf {
                    uf: uf.to_string(),
                    total_despesas: total,
                    qtd_operadoras: qtd,
                    media_por_operadora: if qtd > 0 { total / qtd as f64 } else { 0.0 },
                }
            })
            .collect();
        rows.sort_by(|a, b| b.total_despesas.total_cmp(&a.total_despesas));
        rows
    }
}
