use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::lp::legacy::LegacySettings;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LpSettingsRow {
    pub company_id: String,
    pub job_id: String,
    pub record: Value,
    pub updated_at: DateTime<Utc>,
}

impl LpSettingsRow {
    pub fn into_settings(self) -> Result<LegacySettings, serde_json::Error> {
        serde_json::from_value(self.record)
    }
}
