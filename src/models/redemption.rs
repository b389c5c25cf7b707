use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RedemptionCode {
    pub id: Uuid,
    pub code: String,
    pub points: i32,
    pub is_used: bool,
    pub used_by: Option<Uuid>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateCodesRequest {
    pub count: u32,
    pub points: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStatusFilter {
    #[default]
    All,
    Unused,
    Used,
}

impl CodeStatusFilter {
    pub fn matches(&self, code: &RedemptionCode) -> bool {
        match self {
            CodeStatusFilter::All => true,
            CodeStatusFilter::Unused => !code.is_used,
            CodeStatusFilter::Used => code.is_used,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CodeListQuery {
    #[serde(default)]
    pub status: CodeStatusFilter,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeStats {
    pub total: usize,
    pub unused: usize,
    pub used: usize,
    pub unused_points: i64,
}

impl CodeStats {
    pub fn from_codes(codes: &[RedemptionCode]) -> Self {
        let unused: Vec<&RedemptionCode> = codes.iter().filter(|c| !c.is_used).collect();
        Self {
            total: codes.len(),
            unused: unused.len(),
            used: codes.len() - unused.len(),
            unused_points: unused.iter().map(|c| i64::from(c.points)).sum(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CodeListResponse {
    pub codes: Vec<RedemptionCode>,
    pub stats: CodeStats,
}
