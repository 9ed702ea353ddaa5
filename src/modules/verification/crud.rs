use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, Pool};

use super::interface::VerificationCodeRepository;
use super::model::{CodeConsumption, VerificationCode};
use crate::errors::Result;
use crate::modules::accounts::model::Role;

pub struct VerificationCodeCrud {
    pool: Pool<MySql>,
}

impl VerificationCodeCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationCodeRepository for VerificationCodeCrud {
    async fn replace(&self, code: &VerificationCode) -> Result<()> {
        // Unique key on (email, role): the upsert keeps one row per identity.
        sqlx::query(
            r#"
            INSERT INTO verification_codes (id, email, role, code, expires_at, used, created_at)
            VALUES (?, ?, ?, ?, ?, FALSE, ?)
            ON DUPLICATE KEY UPDATE
                id = VALUES(id),
                code = VALUES(code),
                expires_at = VALUES(expires_at),
                used = FALSE,
                created_at = VALUES(created_at)
            "#,
        )
        .bind(&code.id)
        .bind(&code.email)
        .bind(code.role.as_str())
        .bind(&code.code)
        .bind(code.expires_at)
        .bind(code.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume(&self, email: &str, role: Role, code: &str, now: DateTime<Utc>) -> Result<CodeConsumption> {
        let updated = sqlx::query(
            r#"
            UPDATE verification_codes
            SET used = TRUE
            WHERE email = ? AND role = ? AND code = ? AND used = FALSE AND expires_at > ?
            "#,
        )
        .bind(email)
        .bind(role.as_str())
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 1 {
            return Ok(CodeConsumption::Consumed);
        }

        let expired: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT expires_at FROM verification_codes
            WHERE email = ? AND role = ? AND code = ? AND used = FALSE
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(role.as_str())
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match expired {
            Some((expires_at,)) if expires_at <= now => CodeConsumption::Expired,
            _ => CodeConsumption::Rejected,
        })
    }

    async fn count_active(&self, email: &str, role: Role, now: DateTime<Utc>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM verification_codes WHERE email = ? AND role = ? AND used = FALSE AND expires_at > ?",
        )
        .bind(email)
        .bind(role.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
