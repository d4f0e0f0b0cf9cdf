//! PostgreSQL access for the discount routes.
//!
//! Every query opens its own connection and closes it afterwards; there is
//! no pool. Rows come back as JSON objects keyed by column name.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Row};
use tracing::{debug, info};

use descontos_core::config::PostgresConfig;

use crate::error::ApiError;

const DESCONTOS_REALIZADOS_SQL: &str = "\
    SELECT json_build_object(
        'id', id,
        'data_operacao', data_operacao,
        'valor_desconto', valor_desconto
    ) AS row
    FROM descontos_realizados
    WHERE fornecedor = $1 AND varejista = $2
    ORDER BY data_operacao DESC";

const DESCONTOS_CALCULADOS_SQL: &str = "\
    SELECT json_build_object(
        'id', id,
        'data_calculo', data_calculo,
        'valor_calculado', valor_calculado
    ) AS row
    FROM descontos_calculados
    WHERE fornecedor = $1 AND varejista = $2
    ORDER BY data_calculo DESC";

const ORGANIZATION_MAPPINGS_SQL: &str = "\
    SELECT json_build_object(
        'organizacao', organizacao,
        'variavel', variavel
    ) AS row
    FROM organization_mappings
    ORDER BY organizacao ASC";

/// Read access to the discount tables.
#[async_trait]
pub trait DescontoStore: Send + Sync {
    async fn descontos_realizados(&self, fornecedor: &str, varejista: &str)
        -> Result<Vec<Value>, ApiError>;

    async fn descontos_calculados(&self, fornecedor: &str, varejista: &str)
        -> Result<Vec<Value>, ApiError>;

    async fn organization_mappings(&self) -> Result<Vec<Value>, ApiError>;
}

/// `DescontoStore` backed by a fresh PostgreSQL connection per call.
pub struct PgDescontoStore {
    options: PgConnectOptions,
}

impl PgDescontoStore {
    pub fn new(config: &PostgresConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.username)
            .password(&config.password);
        Self { options }
    }

    async fn connect(&self) -> Result<PgConnection, ApiError> {
        PgConnection::connect_with(&self.options)
            .await
            .map_err(ApiError::Connection)
    }

    /// Run one statement with positional text parameters and collect its rows.
    async fn fetch_rows(&self, sql: &str, params: &[&str]) -> Result<Vec<Value>, ApiError> {
        let mut conn = self.connect().await?;

        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(*param);
        }
        let fetched = query.fetch_all(&mut conn).await;

        if let Err(e) = conn.close().await {
            debug!(error = %e, "closing connection failed");
        }

        fetched
            .map_err(ApiError::Query)?
            .iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(ApiError::Query))
            .collect()
    }

    /// Apply the embedded migrations (schema and demo rows).
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let mut conn = PgConnection::connect_with(&self.options).await?;
        sqlx::migrate!("../../migrations").run(&mut conn).await?;
        conn.close().await?;
        info!("Database migrations applied successfully");
        Ok(())
    }
}

#[async_trait]
impl DescontoStore for PgDescontoStore {
    async fn descontos_realizados(
        &self,
        fornecedor: &str,
        varejista: &str,
    ) -> Result<Vec<Value>, ApiError> {
        self.fetch_rows(DESCONTOS_REALIZADOS_SQL, &[fornecedor, varejista]).await
    }

    async fn descontos_calculados(
        &self,
        fornecedor: &str,
        varejista: &str,
    ) -> Result<Vec<Value>, ApiError> {
        self.fetch_rows(DESCONTOS_CALCULADOS_SQL, &[fornecedor, varejista]).await
    }

    async fn organization_mappings(&self) -> Result<Vec<Value>, ApiError> {
        self.fetch_rows(ORGANIZATION_MAPPINGS_SQL, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_keys_keep_column_order() {
        // Same text Postgres renders for a json_build_object row.
        let raw = r#"{"id" : 7, "data_operacao" : "2024-02-20", "valor_desconto" : 980.50}"#;
        let row: Value = serde_json::from_str(raw).unwrap();

        let keys: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "data_operacao", "valor_desconto"]);
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"id":7,"data_operacao":"2024-02-20","valor_desconto":980.5}"#
        );
    }

    #[test]
    fn test_queries_build_rows_in_select_order() {
        let realizado = DESCONTOS_REALIZADOS_SQL;
        let id = realizado.find("'id'").unwrap();
        let data = realizado.find("'data_operacao'").unwrap();
        let valor = realizado.find("'valor_desconto'").unwrap();
        assert!(id < data && data < valor);

        let tabela = ORGANIZATION_MAPPINGS_SQL;
        assert!(tabela.find("'organizacao'").unwrap() < tabela.find("'variavel'").unwrap());
    }
}
