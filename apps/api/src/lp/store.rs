//! Persistence boundary for LP settings records.
//!
//! A persisted record holds the serialized current document under `lpContent`
//! plus the flattened legacy projection, so legacy consumers keep working.
//! Writes are last-write-wins; there is no concurrency check.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppError;
use crate::lp::document::ContentDocument;
use crate::lp::legacy::{keys, LegacySettings};
use crate::lp::migrator::{convert_to_legacy, migrate_to_v2};
use crate::models::lp::LpSettingsRow;

/// The store collaborator. Errors propagate to the caller; nothing is retried.
#[async_trait]
pub trait LpStore: Send + Sync {
    async fn get(&self, company_id: &str, job_id: &str) -> Result<Option<LegacySettings>, AppError>;

    async fn set(
        &self,
        company_id: &str,
        job_id: &str,
        record: &LegacySettings,
    ) -> Result<(), AppError>;
}

/// Builds the record to persist: unknown fields of `previous` survive, its
/// projected fields are replaced by the document's legacy projection, then the
/// serialized document and an `updatedAt` stamp are written.
pub fn build_persisted_record(
    doc: &ContentDocument,
    previous: Option<LegacySettings>,
) -> Result<LegacySettings, AppError> {
    let mut record = previous.unwrap_or_default();
    record.clear_projection();
    record.merge_from(convert_to_legacy(Some(doc)));
    record.set(keys::LP_CONTENT, serde_json::to_string(doc)?);
    record.set(
        keys::UPDATED_AT,
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    );
    Ok(record)
}

/// Loads and migrates the record for one job. An absent record yields the empty document.
pub async fn load_document(
    store: &dyn LpStore,
    company_id: &str,
    job_id: &str,
) -> Result<ContentDocument, AppError> {
    let record = store.get(company_id, job_id).await?;
    Ok(migrate_to_v2(record.as_ref()))
}

/// Persists `doc` together with its legacy projection.
pub async fn save_document(
    store: &dyn LpStore,
    company_id: &str,
    job_id: &str,
    doc: &ContentDocument,
) -> Result<LegacySettings, AppError> {
    let previous = store.get(company_id, job_id).await?;
    let record = build_persisted_record(doc, previous)?;
    store.set(company_id, job_id, &record).await?;
    info!(
        "Saved LP document for company {company_id} job {job_id} ({} sections)",
        doc.sections.len()
    );
    Ok(record)
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL store
// ────────────────────────────────────────────────────────────────────────────

pub struct PgLpStore {
    pool: PgPool,
}

impl PgLpStore {
    pub fn new(pool: PgPool) -> Self {
        PgLpStore { pool }
    }

    /// Creates the `lp_settings` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lp_settings (
                company_id  TEXT        NOT NULL,
                job_id      TEXT        NOT NULL,
                record      JSONB       NOT NULL,
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (company_id, job_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl LpStore for PgLpStore {
    async fn get(&self, company_id: &str, job_id: &str) -> Result<Option<LegacySettings>, AppError> {
        let row = sqlx::query_as::<_, LpSettingsRow>(
            "SELECT * FROM lp_settings WHERE company_id = $1 AND job_id = $2",
        )
        .bind(company_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.into_settings()?)),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        company_id: &str,
        job_id: &str,
        record: &LegacySettings,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO lp_settings (company_id, job_id, record, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (company_id, job_id)
            DO UPDATE SET record = EXCLUDED.record, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(company_id)
        .bind(job_id)
        .bind(serde_json::to_value(record)?)
        .execute(&self.pool)
        .await?;

        info!("Upserted lp_settings row for company {company_id} job {job_id}");
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store for development and tests.
#[derive(Default)]
pub struct MemoryLpStore {
    records: RwLock<HashMap<(String, String), LegacySettings>>,
}

impl MemoryLpStore {
    pub fn new() -> Self {
        MemoryLpStore::default()
    }
}

#[async_trait]
impl LpStore for MemoryLpStore {
    async fn get(&self, company_id: &str, job_id: &str) -> Result<Option<LegacySettings>, AppError> {
        let records = self.records.read().await;
        Ok(records
            .get(&(company_id.to_string(), job_id.to_string()))
            .cloned())
    }

    async fn set(
        &self,
        company_id: &str,
        job_id: &str,
        record: &LegacySettings,
    ) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        records.insert(
            (company_id.to_string(), job_id.to_string()),
            record.clone(),
        );
        Ok(())
    }
}
