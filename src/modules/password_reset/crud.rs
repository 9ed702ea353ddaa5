use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, Pool};

use super::interface::PasswordResetRepository;
use super::model::{PasswordResetRow, PasswordResetToken, Redemption, TokenState};
use crate::errors::Result;
use crate::modules::accounts::{crud::queries, model::Role};

const SELECT_BY_TOKEN: &str = r#"
    SELECT id, email, role, token, expires_at, used, created_at
    FROM password_reset_tokens
    WHERE token = ?
"#;

pub struct PasswordResetCrud {
    pool: Pool<MySql>,
}

impl PasswordResetCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordResetRepository for PasswordResetCrud {
    async fn replace(&self, token: &PasswordResetToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (id, email, role, token, expires_at, used, created_at)
            VALUES (?, ?, ?, ?, ?, FALSE, ?)
            ON DUPLICATE KEY UPDATE
                id = VALUES(id),
                token = VALUES(token),
                expires_at = VALUES(expires_at),
                used = FALSE,
                created_at = VALUES(created_at)
            "#,
        )
        .bind(&token.id)
        .bind(&token.email)
        .bind(token.role.as_str())
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<PasswordResetToken>> {
        let row = sqlx::query_as::<_, PasswordResetRow>(SELECT_BY_TOKEN)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        row.map(PasswordResetToken::try_from).transpose()
    }

    async fn redeem(&self, token: &str, password_hash: &str, now: DateTime<Utc>) -> Result<Redemption> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE password_reset_tokens SET used = TRUE WHERE token = ? AND used = FALSE AND expires_at > ?",
        )
        .bind(token)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let record = sqlx::query_as::<_, PasswordResetRow>(SELECT_BY_TOKEN)
            .bind(token)
            .fetch_optional(&mut *tx)
            .await?
            .map(PasswordResetToken::try_from)
            .transpose()?;

        let Some(record) = record else {
            tx.rollback().await?;
            return Ok(Redemption::Rejected);
        };

        if claimed != 1 {
            tx.rollback().await?;
            return Ok(match record.state(now) {
                TokenState::Expired => Redemption::Expired,
                TokenState::Active | TokenState::Used => Redemption::Rejected,
            });
        }

        let updated = sqlx::query(queries(record.role).update_password)
            .bind(password_hash)
            .bind(&record.email)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if updated == 0 {
            // Account was removed after the token was issued.
            tx.rollback().await?;
            return Ok(Redemption::Rejected);
        }

        tx.commit().await?;

        Ok(Redemption::Redeemed { role: record.role })
    }

    async fn count_active(&self, email: &str, role: Role, now: DateTime<Utc>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM password_reset_tokens WHERE email = ? AND role = ? AND used = FALSE AND expires_at > ?",
        )
        .bind(email)
        .bind(role.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
