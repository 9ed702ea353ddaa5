use serde::Serialize;

use super::service::Stats;
use crate::modules::auth::schema::UserSummary;

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_patients: i64,
    pub total_doctors: i64,
    pub total_secretaries: i64,
    pub total_pending: i64,
}

impl From<Stats> for StatsResponse {
    fn from(s: Stats) -> Self {
        Self {
            total_patients: s.total_patients,
            total_doctors: s.total_doctors,
            total_secretaries: s.total_secretaries,
            total_pending: s.total_pending,
        }
    }
}
