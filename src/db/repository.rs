//! Repositories for customer and module queries

use async_trait::async_trait;
use sqlx::PgPool;

use super::DbError;
use super::models::{CustomerRow, ModuleRow, escape_like};
use crate::model::{CustomerRecord, ModuleRecord};
use crate::service::compatibility::ModuleTable;
use crate::service::registry::CustomerStore;

/// Repository for customer registry lookups
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<CustomerRecord>, DbError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            SELECT * FROM customers WHERE LOWER(name) = LOWER($1) ORDER BY id LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CustomerRow::into_domain))
    }

    async fn search_by_name(
        &self,
        fragment: &str,
        limit: i64,
    ) -> Result<Vec<CustomerRecord>, DbError> {
        let pattern = format!("%{}%", escape_like(fragment));

        let rows: Vec<CustomerRow> = sqlx::query_as(
            r#"
            SELECT * FROM customers WHERE name ILIKE $1 ORDER BY id LIMIT $2
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(fragment = %fragment, matches = rows.len(), "Customer substring search");

        Ok(rows.into_iter().map(CustomerRow::into_domain).collect())
    }
}

/// Repository for the module compatibility table
#[derive(Clone)]
pub struct ModuleRepository {
    pool: PgPool,
}

impl ModuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModuleTable for ModuleRepository {
    async fn modules_with_capability(
        &self,
        capability: &str,
    ) -> Result<Vec<ModuleRecord>, DbError> {
        let rows: Vec<ModuleRow> = sqlx::query_as(
            r#"
            SELECT * FROM modules WHERE $1 = ANY(capabilities) ORDER BY code
            "#,
        )
        .bind(capability)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(capability = %capability, modules = rows.len(), "Module table query");

        Ok(rows.into_iter().map(ModuleRow::into_domain).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init_schema};

    #[tokio::test]
    #[ignore] // Requires PostgreSQL
    async fn test_customer_lookup_roundtrip() {
        let pool = create_pool().await.unwrap();
        init_schema(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO customers (name, industry, release_version, current_use_cases) VALUES ($1, $2, $3, $4)",
        )
        .bind("Initech Test Holdings")
        .bind("manufacturing")
        .bind("23.1")
        .bind(vec!["Predictive Maintenance".to_string()])
        .execute(&pool)
        .await
        .unwrap();

        let repo = CustomerRepository::new(pool.clone());
        let exact = repo.find_by_name("initech test holdings").await.unwrap();
        assert_eq!(exact.unwrap().release_version.as_deref(), Some("23.1"));

        let partial = repo.search_by_name("Initech Test", 5).await.unwrap();
        assert!(!partial.is_empty());

        sqlx::query("DELETE FROM customers WHERE name = $1")
            .bind("Initech Test Holdings")
            .execute(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL
    async fn test_module_capability_query() {
        let pool = create_pool().await.unwrap();
        init_schema(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO modules (code, name, min_version, capabilities) VALUES ($1, $2, $3, $4) ON CONFLICT (code) DO NOTHING",
        )
        .bind("TEST-PM-01")
        .bind("Asset Health Test")
        .bind("22.1")
        .bind(vec!["predictive-maintenance".to_string()])
        .execute(&pool)
        .await
        .unwrap();

        let repo = ModuleRepository::new(pool.clone());
        let modules = repo
            .modules_with_capability("predictive-maintenance")
            .await
            .unwrap();
        assert!(modules.iter().any(|m| m.code == "TEST-PM-01"));

        sqlx::query("DELETE FROM modules WHERE code = $1")
            .bind("TEST-PM-01")
            .execute(&pool)
            .await
            .unwrap();
    }
}
