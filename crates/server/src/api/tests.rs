use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::db::DescontoStore;
use crate::error::ApiError;
use crate::router::build_router;
use crate::state::AppState;

/// In-memory store that records the pairs it was asked for.
#[derive(Default)]
struct FakeStore {
    rows: Vec<Value>,
    fail_connect: bool,
    fail_query: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeStore {
    fn check(&self) -> Result<(), ApiError> {
        if self.fail_connect {
            return Err(ApiError::Connection(sqlx::Error::PoolTimedOut));
        }
        if self.fail_query {
            return Err(ApiError::Query(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    fn record(&self, fornecedor: &str, varejista: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((fornecedor.to_string(), varejista.to_string()));
    }
}

#[async_trait]
impl DescontoStore for FakeStore {
    async fn descontos_realizados(&self, f: &str, v: &str) -> Result<Vec<Value>, ApiError> {
        self.check()?;
        self.record(f, v);
        Ok(self.rows.clone())
    }

    async fn descontos_calculados(&self, f: &str, v: &str) -> Result<Vec<Value>, ApiError> {
        self.check()?;
        self.record(f, v);
        Ok(self.rows.clone())
    }

    async fn organization_mappings(&self) -> Result<Vec<Value>, ApiError> {
        self.check()?;
        Ok(self.rows.clone())
    }
}

async fn get(store: Arc<FakeStore>, uri: &str) -> (StatusCode, Value) {
    let app = build_router(Arc::new(AppState { store }));
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn desconto_realizado_returns_rows() {
    let store = Arc::new(FakeStore {
        rows: vec![json!({"id": 1, "data_operacao": "2024-02-20", "valor_desconto": 980.5})],
        ..Default::default()
    });

    let (status, body) = get(store.clone(), "/desconto_realizado/Nestle/Carrefour").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": [{"id": 1, "data_operacao": "2024-02-20", "valor_desconto": 980.5}]}));
    let keys: Vec<&str> = body["data"][0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["id", "data_operacao", "valor_desconto"]);
    assert_eq!(
        store.calls.lock().unwrap().as_slice(),
        &[("Nestle".to_string(), "Carrefour".to_string())]
    );
}

#[tokio::test]
async fn empty_results_carry_a_message() {
    let store = Arc::new(FakeStore::default());

    let (status, body) = get(store.clone(), "/desconto_realizado/A/B").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Nenhum desconto encontrado para este par.", "data": []})
    );

    let (_, body) = get(store.clone(), "/desconto_calculado/A/B").await;
    assert_eq!(body["message"], "Nenhum cálculo encontrado para este par.");

    let (_, body) = get(store, "/tabelaDeVariaveis").await;
    assert_eq!(body["message"], "Nenhuma organização cadastrada.");
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn path_segments_are_decoded() {
    let store = Arc::new(FakeStore::default());
    get(store.clone(), "/desconto_calculado/Loja%2FCentro/Super%20Mercado").await;
    assert_eq!(
        store.calls.lock().unwrap()[0],
        ("Loja/Centro".to_string(), "Super Mercado".to_string())
    );
}

#[tokio::test]
async fn connection_failure_is_500_with_detail() {
    let store = Arc::new(FakeStore {
        fail_connect: true,
        ..Default::default()
    });
    let (status, body) = get(store, "/tabelaDeVariaveis").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Erro de conexão com o banco de dados"}));
}

#[tokio::test]
async fn query_failure_is_500_with_detail() {
    let store = Arc::new(FakeStore {
        fail_query: true,
        ..Default::default()
    });
    let (status, body) = get(store, "/desconto_realizado/A/B").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Erro ao consultar o banco de dados");
}

#[tokio::test]
async fn teste_and_health() {
    let store = Arc::new(FakeStore::default());
    let (status, body) = get(store.clone(), "/teste").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Teste bem-sucedido!"}));

    let (_, body) = get(store, "/health").await;
    assert_eq!(body["status"], "ok");
}
