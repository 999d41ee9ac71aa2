//! Text rendering of the two views and the route dispatcher that feeds them.

use std::fmt;

use operadoras_core::{Despesa, Estatisticas, ListOptions, Operadora, OperadorasPage, Route};

use crate::client::Client;
use crate::error::Result;

/// Fetch what `route`'s view needs and render it. The view's calls run
/// concurrently; the first failure aborts the view.
pub async fn render_route(client: &Client, route: &Route, options: &ListOptions) -> Result<String> {
    match route {
        Route::List => {
            let (stats, page) = tokio::try_join!(client.get_estatisticas(), client.list_operadoras(options))?;
            Ok(render_list(stats.as_ref(), page.as_ref()))
        }
        Route::Detail { cnpj } => {
            let (operadora, despesas) =
                tokio::try_join!(client.get_operadora(cnpj), client.get_despesas(cnpj))?;
            Ok(render_detail(cnpj, operadora.as_ref(), despesas.as_deref()))
        }
    }
}

pub fn render_list(stats: Option<&Estatisticas>, page: Option<&OperadorasPage>) -> String {
    ListView { stats, page }.to_string()
}

pub fn render_detail(cnpj: &str, operadora: Option<&Operadora>, despesas: Option<&[Despesa]>) -> String {
    DetailView {
        cnpj,
        operadora,
        despesas,
    }
    .to_string()
}

struct ListView<'a> {
    stats: Option<&'a Estatisticas>,
    page: Option<&'a OperadorasPage>,
}

impl fmt::Display for ListView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(stats) = self.stats {
            writeln!(f, "Total de despesas: {}", format_brl(stats.total_despesas))?;
            writeln!(f, "Media por operadora: {}", format_brl(stats.media_por_operadora))?;
            if !stats.top_5_operadoras.is_empty() {
                writeln!(f, "\nTop 5 operadoras")?;
                for (i, top) in stats.top_5_operadoras.iter().enumerate() {
                    writeln!(
                        f,
                        "  {}. {} ({}) {}",
                        i + 1,
                        display_or_dash(&top.razao_social),
                        display_or_dash(&top.uf),
                        format_brl(top.total_despesas)
                    )?;
                }
            }
            if !stats.por_uf.is_empty() {
                writeln!(f, "\nDespesas por UF")?;
                for uf in &stats.por_uf {
                    writeln!(
                        f,
                        "  {:<2} {} em {} operadora(s), media {}",
                        uf.uf,
                        format_brl(uf.total_despesas),
                        uf.qtd_operadoras,
                        format_brl(uf.media_por_operadora)
                    )?;
                }
            }
            writeln!(f)?;
        }

        match self.page {
            Some(page) if !page.data.is_empty() => {
                writeln!(f, "Operadoras (pagina {} de {}, {} no total)", page.page, page.total_pages, page.total)?;
                for op in &page.data {
                    let route = Route::Detail { cnpj: op.cnpj.clone() };
                    writeln!(
                        f,
                        "  {:<14}  {:<2}  {}  -> {}",
                        op.cnpj,
                        op.uf,
                        display_or_dash(&op.razao_social),
                        route
                    )?;
                }
                Ok(())
            }
            _ => writeln!(f, "Nenhuma operadora encontrada."),
        }
    }
}

struct DetailView<'a> {
    cnpj: &'a str,
    operadora: Option<&'a Operadora>,
    despesas: Option<&'a [Despesa]>,
}

impl fmt::Display for DetailView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operadora {
            Some(op) => {
                writeln!(f, "{}", display_or_dash(&op.razao_social))?;
                writeln!(f, "  CNPJ:         {}", op.cnpj)?;
                writeln!(f, "  Registro ANS: {}", display_or_dash(&op.registro_ans))?;
                writeln!(f, "  Modalidade:   {}", display_or_dash(&op.modalidade))?;
                writeln!(f, "  UF:           {}", display_or_dash(&op.uf))?;
            }
            None => writeln!(f, "Operadora {}", self.cnpj)?,
        }

        writeln!(f, "\nDespesas")?;
        match self.despesas {
            Some(rows) if !rows.is_empty() => {
                for d in rows {
                    writeln!(f, "  {}/T{}  {}", d.ano, d.trimestre, format_brl(d.valor))?;
                }
                Ok(())
            }
            _ => writeln!(f, "  Nenhuma despesa registrada."),
        }
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

/// Format an amount as Brazilian reais: `R$ 1.234.567,89`.
pub fn format_brl(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac_part}")
}
