use std::path::Path;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use operadoras_server::dataset::DespesaRecord;
use operadoras_server::{app, AppState, Dataset, Despesa, Estatisticas, Operadora, OperadorasPage};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn detail(response: axum::response::Response) -> String {
    let body: serde_json::Value = body_json(response).await;
    body["detail"].as_str().unwrap().to_string()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

/// Twelve operadoras named "Operadora 01".."Operadora 12", plus one named
/// "Unimed Teste", each with CNPJ `{n:02}345678000199`. Only the first two
/// have expense records.
fn fixture() -> Dataset {
    let mut operadoras: Vec<Operadora> = (1..=12)
        .map(|n| Operadora {
            cnpj: format!("{n:02}345678000199"),
            razao_social: format!("Operadora {n:02}"),
            registro_ans: format!("{n:06}"),
            modalidade: "Medicina de Grupo".to_string(),
            uf: if n % 2 == 0 { "SP" } else { "RJ" }.to_string(),
        })
        .collect();
    operadoras.push(Operadora {
        cnpj: "99.888.777/0001-66".to_string(),
        razao_social: "Unimed Teste".to_string(),
        registro_ans: String::new(),
        modalidade: String::new(),
        uf: "MG".to_string(),
    });

    let despesas = vec![
        DespesaRecord { cnpj: "01345678000199".to_string(), ano: 2024, trimestre: 2, valor: 20.0 },
        DespesaRecord { cnpj: "01345678000199".to_string(), ano: 2023, trimestre: 4, valor: 10.0 },
        DespesaRecord { cnpj: "02345678000199".to_string(), ano: 2024, trimestre: 1, valor: 70.0 },
    ];
    Dataset::new(operadoras, despesas)
}

fn fixture_app() -> axum::Router {
    app(AppState::new(fixture()))
}

// --- list ---

#[tokio::test]
async fn list_defaults_to_first_page_of_ten() {
    let resp = fixture_app().oneshot(get("/api/operadoras")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: OperadorasPage = body_json(resp).await;
    assert_eq!(page.data.len(), 10);
    assert_eq!(page.total, 13);
    assert_eq!(page.page, 1);
    assert_eq!(page.limit, 10);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.data[0].razao_social, "Operadora 01");
}

#[tokio::test]
async fn list_last_page_is_partial() {
    let resp = fixture_app()
        .oneshot(get("/api/operadoras?page=3&limit=5"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: OperadorasPage = body_json(resp).await;
    let names: Vec<&str> = page.data.iter().map(|o| o.razao_social.as_str()).collect();
    assert_eq!(names, vec!["Operadora 11", "Operadora 12", "Unimed Teste"]);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn list_page_past_the_end_is_empty() {
    let resp = fixture_app().oneshot(get("/api/operadoras?page=40")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: OperadorasPage = body_json(resp).await;
    assert!(page.data.is_empty());
    assert_eq!(page.total, 13);
    assert_eq!(page.page, 40);
}

#[tokio::test]
async fn list_search_by_name() {
    let resp = fixture_app()
        .oneshot(get("/api/operadoras?q=+UNIMED+"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: OperadorasPage = body_json(resp).await;
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].cnpj, "99888777000166");
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn list_search_by_cnpj_digits() {
    let resp = fixture_app()
        .oneshot(get("/api/operadoras?q=07.345"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: OperadorasPage = body_json(resp).await;
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].razao_social, "Operadora 07");
}

#[tokio::test]
async fn list_search_without_matches_has_one_page() {
    let resp = fixture_app()
        .oneshot(get("/api/operadoras?q=inexistente"))
        .await
        .unwrap();

    let page: OperadorasPage = body_json(resp).await;
    assert!(page.data.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn list_rejects_out_of_range_params() {
    let resp = fixture_app().oneshot(get("/api/operadoras?limit=101")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(detail(resp).await, "limit deve estar entre 1 e 100.");

    let resp = fixture_app().oneshot(get("/api/operadoras?page=0")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(detail(resp).await, "page deve ser maior ou igual a 1.");
}

#[tokio::test]
async fn list_rejects_unparsable_params_with_detail() {
    for uri in ["/api/operadoras?page=abc", "/api/operadoras?limit="] {
        let resp = fixture_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(
            resp.headers()["content-type"].to_str().unwrap(),
            "application/json",
            "{uri}"
        );
        let message = detail(resp).await;
        assert!(!message.is_empty(), "{uri}");
    }

    let resp = fixture_app().oneshot(get("/api/operadoras?page=abc")).await.unwrap();
    assert!(detail(resp).await.contains("page"));
}

// --- get ---

#[tokio::test]
async fn get_operadora_accepts_formatted_cnpj() {
    let resp = fixture_app()
        .oneshot(get("/api/operadoras/03.345.678%2F0001-99"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let op: Operadora = body_json(resp).await;
    assert_eq!(op.cnpj, "03345678000199");
    assert_eq!(op.razao_social, "Operadora 03");
    assert_eq!(op.uf, "RJ");
}

#[tokio::test]
async fn get_operadora_not_found() {
    let resp = fixture_app()
        .oneshot(get("/api/operadoras/00000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(detail(resp).await, "Operadora nao encontrada.");
}

#[tokio::test]
async fn get_operadora_invalid_cnpj() {
    let resp = fixture_app().oneshot(get("/api/operadoras/ABC123")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(detail(resp).await, "CNPJ invalido (precisa ter 14 digitos).");
}

// --- despesas ---

#[tokio::test]
async fn despesas_sorted_oldest_first() {
    let resp = fixture_app()
        .oneshot(get("/api/operadoras/01345678000199/despesas"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Vec<Despesa> = body_json(resp).await;
    assert_eq!(
        rows,
        vec![
            Despesa { ano: 2023, trimestre: 4, valor: 10.0 },
            Despesa { ano: 2024, trimestre: 2, valor: 20.0 },
        ]
    );
}

#[tokio::test]
async fn despesas_of_unknown_operadora_is_empty_list() {
    let resp = fixture_app()
        .oneshot(get("/api/operadoras/55555555000155/despesas"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"[]");
}

#[tokio::test]
async fn despesas_invalid_cnpj() {
    let resp = fixture_app()
        .oneshot(get("/api/operadoras/123/despesas"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- estatisticas ---

#[tokio::test]
async fn estatisticas_summarize_expenses() {
    let resp = fixture_app().oneshot(get("/api/estatisticas")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let stats: Estatisticas = body_json(resp).await;
    assert_eq!(stats.total_despesas, 100.0);
    assert_eq!(stats.media_por_operadora, 50.0);
    assert_eq!(stats.top_5_operadoras.len(), 2);
    assert_eq!(stats.top_5_operadoras[0].razao_social, "Operadora 02");
    assert_eq!(stats.top_5_operadoras[0].total_despesas, 70.0);

    let ufs: Vec<(&str, u64)> = stats.por_uf.iter().map(|a| (a.uf.as_str(), a.qtd_operadoras)).collect();
    assert_eq!(ufs, vec![("SP", 6), ("RJ", 6)]);
}

// --- unavailable dataset ---

#[tokio::test]
async fn unavailable_dataset_answers_500_with_reason() {
    let app = app(AppState::unavailable("arquivo ausente"));

    for uri in [
        "/api/operadoras",
        "/api/operadoras/01345678000199",
        "/api/operadoras/01345678000199/despesas",
        "/api/estatisticas",
    ] {
        let resp = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(detail(resp).await, "Dados nao carregados: arquivo ausente", "{uri}");
    }

    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- CSV data directory ---

fn csv_dir_app() -> axum::Router {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data");
    app(AppState::new(Dataset::load_dir(&dir).unwrap()))
}

#[tokio::test]
async fn csv_directory_serves_exported_data() {
    let resp = csv_dir_app().oneshot(get("/api/operadoras")).await.unwrap();
    let page: OperadorasPage = body_json(resp).await;
    assert_eq!(page.total, 2);
    let names: Vec<&str> = page.data.iter().map(|o| o.razao_social.as_str()).collect();
    assert_eq!(names, vec!["Alfa Saude", "Unimed Beta, Cooperativa"]);
    assert_eq!(page.data[1].uf, "RJ");

    let resp = csv_dir_app()
        .oneshot(get("/api/operadoras/12345678000199/despesas"))
        .await
        .unwrap();
    let rows: Vec<Despesa> = body_json(resp).await;
    assert_eq!(
        rows,
        vec![
            Despesa { ano: 2024, trimestre: 1, valor: 100.0 },
            Despesa { ano: 2024, trimestre: 2, valor: 300.0 },
        ]
    );

    // Rows with an unparsable value or year are skipped.
    let resp = csv_dir_app()
        .oneshot(get("/api/operadoras/98765432000110/despesas"))
        .await
        .unwrap();
    let rows: Vec<Despesa> = body_json(resp).await;
    assert_eq!(rows, vec![Despesa { ano: 2024, trimestre: 1, valor: 50.5 }]);
}

#[tokio::test]
async fn csv_directory_por_uf_comes_from_agregados_export() {
    let resp = csv_dir_app().oneshot(get("/api/estatisticas")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let stats: Estatisticas = body_json(resp).await;
    assert_eq!(stats.total_despesas, 450.5);

    let ufs: Vec<(&str, f64, u64)> = stats
        .por_uf
        .iter()
        .map(|a| (a.uf.as_str(), a.total_despesas, a.qtd_operadoras))
        .collect();
    assert_eq!(ufs, vec![("SP", 400.0, 2), ("RJ", 50.5, 1), ("MG", 0.0, 0)]);
}

#[tokio::test]
async fn missing_csv_directory_is_reported_as_unavailable() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/no-such-data");
    let err = Dataset::load_dir(&dir).unwrap_err();
    let app = app(AppState::unavailable(err.to_string()));

    let resp = app.oneshot(get("/api/estatisticas")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = detail(resp).await;
    assert!(message.starts_with("Dados nao carregados: CSV(s) nao encontrado(s): ["));
    assert!(message.contains("despesas.csv"));
}

#[tokio::test]
async fn health_reports_ok() {
    let resp = fixture_app().oneshot(get("/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["status"], "ok");
}
