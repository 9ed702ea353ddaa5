use async_trait::async_trait;
use sqlx::{MySql, Pool};

use super::interface::AccountRepository;
use super::model::{AccountRow, ApprovalStatus, RejectOutcome, Role, UserAccount};
use crate::errors::{ApiError, Result};

/// Fixed SQL for one account table. Each role maps to exactly one of these, so
/// no query text is ever assembled from request input.
pub(crate) struct AccountQueries {
    pub find_by_id: &'static str,
    pub find_by_email: &'static str,
    pub count_all: &'static str,
    pub update_password: &'static str,
    pub approval: Option<ApprovalQueries>,
}

pub(crate) struct ApprovalQueries {
    pub list_by_status: &'static str,
    pub count_by_status: &'static str,
    pub approve: &'static str,
    pub delete_pending: &'static str,
}

macro_rules! account_queries {
    ($table:literal, $columns:literal) => {
        AccountQueries {
            find_by_id: concat!("SELECT ", $columns, " FROM ", $table, " WHERE id = ?"),
            find_by_email: concat!("SELECT ", $columns, " FROM ", $table, " WHERE email = ?"),
            count_all: concat!("SELECT COUNT(*) FROM ", $table),
            update_password: concat!("UPDATE ", $table, " SET password_hash = ? WHERE email = ?"),
            approval: None,
        }
    };
    ($table:literal, $columns:literal, with_approval) => {
        AccountQueries {
            approval: Some(ApprovalQueries {
                list_by_status: concat!(
                    "SELECT ", $columns, " FROM ", $table,
                    " WHERE status = ? ORDER BY created_at DESC"
                ),
                count_by_status: concat!("SELECT COUNT(*) FROM ", $table, " WHERE status = ?"),
                approve: concat!("UPDATE ", $table, " SET status = 'approved' WHERE id = ?"),
                delete_pending: concat!("DELETE FROM ", $table, " WHERE id = ? AND status = 'pending'"),
            }),
            ..account_queries!($table, $columns)
        }
    };
}

static PATIENTS: AccountQueries = account_queries!(
    "patients",
    "id, email, password_hash, first_name, last_name, phone, sex, country, city, \
     NULL AS specialty, NULL AS rpps, NULL AS hospital_address, NULL AS position, NULL AS department, \
     'not_applicable' AS status, created_at"
);

static DOCTORS: AccountQueries = account_queries!(
    "doctors",
    "id, email, password_hash, first_name, last_name, phone, sex, NULL AS country, NULL AS city, \
     specialty, rpps, hospital_address, NULL AS position, NULL AS department, status, created_at",
    with_approval
);

static SECRETARIES: AccountQueries = account_queries!(
    "secretaries",
    "id, email, password_hash, first_name, last_name, phone, sex, NULL AS country, NULL AS city, \
     specialty, rpps, hospital_address, position, department, status, created_at",
    with_approval
);

static ADMINS: AccountQueries = account_queries!(
    "admins",
    "id, email, password_hash, first_name, last_name, phone, NULL AS sex, NULL AS country, NULL AS city, \
     NULL AS specialty, NULL AS rpps, NULL AS hospital_address, NULL AS position, NULL AS department, \
     'not_applicable' AS status, created_at"
);

pub(crate) fn queries(role: Role) -> &'static AccountQueries {
    match role {
        Role::Patient => &PATIENTS,
        Role::Doctor => &DOCTORS,
        Role::Secretary => &SECRETARIES,
        Role::Admin => &ADMINS,
    }
}

pub struct AccountCrud {
    pool: Pool<MySql>,
}

impl AccountCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(&self, role: Role, sql: &'static str, key: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_account(role)).transpose()
    }
}

fn map_insert_error(e: sqlx::Error) -> ApiError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::EmailAlreadyExists,
        _ => ApiError::Database(e),
    }
}

#[async_trait]
impl AccountRepository for AccountCrud {
    async fn create(&self, account: &UserAccount) -> Result<()> {
        let p = &account.profile;

        let query = match account.role {
            Role::Patient => sqlx::query(
                r#"
                INSERT INTO patients (id, email, password_hash, first_name, last_name, phone, sex, country, city, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&account.id)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&p.first_name)
            .bind(&p.last_name)
            .bind(&p.phone)
            .bind(&p.sex)
            .bind(&p.country)
            .bind(&p.city)
            .bind(account.created_at),
            Role::Doctor => sqlx::query(
                r#"
                INSERT INTO doctors (id, email, password_hash, first_name, last_name, phone, sex,
                                     specialty, rpps, hospital_address, status, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&account.id)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&p.first_name)
            .bind(&p.last_name)
            .bind(&p.phone)
            .bind(&p.sex)
            .bind(&p.specialty)
            .bind(&p.rpps)
            .bind(&p.hospital_address)
            .bind(account.approval_status.as_str())
            .bind(account.created_at),
            Role::Secretary => sqlx::query(
                r#"
                INSERT INTO secretaries (id, email, password_hash, first_name, last_name, phone, sex,
                                         specialty, rpps, hospital_address, position, department, status, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&account.id)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&p.first_name)
            .bind(&p.last_name)
            .bind(&p.phone)
            .bind(&p.sex)
            .bind(&p.specialty)
            .bind(&p.rpps)
            .bind(&p.hospital_address)
            .bind(&p.position)
            .bind(&p.department)
            .bind(account.approval_status.as_str())
            .bind(account.created_at),
            Role::Admin => sqlx::query(
                r#"
                INSERT INTO admins (id, email, password_hash, first_name, last_name, phone, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&account.id)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&p.first_name)
            .bind(&p.last_name)
            .bind(&p.phone)
            .bind(account.created_at),
        };

        query.execute(&self.pool).await.map_err(map_insert_error)?;
        Ok(())
    }

    async fn find_by_id(&self, role: Role, id: &str) -> Result<Option<UserAccount>> {
        self.fetch_one_by(role, queries(role).find_by_id, id).await
    }

    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<UserAccount>> {
        self.fetch_one_by(role, queries(role).find_by_email, email).await
    }

    async fn approve(&self, role: Role, id: &str) -> Result<Option<UserAccount>> {
        let approval = queries(role)
            .approval
            .as_ref()
            .ok_or_else(|| ApiError::InvalidRole(role.to_string()))?;

        // MySQL reports changed rows, so re-approving yields 0 here; the
        // follow-up read decides whether the account exists.
        sqlx::query(approval.approve)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_by_id(role, id).await
    }

    async fn delete_pending(&self, role: Role, id: &str) -> Result<RejectOutcome> {
        let approval = queries(role)
            .approval
            .as_ref()
            .ok_or_else(|| ApiError::InvalidRole(role.to_string()))?;

        let Some(account) = self.find_by_id(role, id).await? else {
            return Ok(RejectOutcome::NotFound);
        };
        if account.approval_status == ApprovalStatus::Approved {
            return Ok(RejectOutcome::AlreadyApproved);
        }

        let deleted = sqlx::query(approval.delete_pending)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 1 {
            return Ok(RejectOutcome::Deleted(account));
        }

        // Lost a race with a concurrent approve or reject.
        match self.find_by_id(role, id).await? {
            Some(_) => Ok(RejectOutcome::AlreadyApproved),
            None => Ok(RejectOutcome::NotFound),
        }
    }

    async fn list_by_status(&self, role: Role, status: ApprovalStatus) -> Result<Vec<UserAccount>> {
        let Some(approval) = &queries(role).approval else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, AccountRow>(approval.list_by_status)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.into_account(role)).collect()
    }

    async fn count(&self, role: Role, status: Option<ApprovalStatus>) -> Result<i64> {
        let q = queries(role);

        let count: (i64,) = match (&q.approval, status) {
            (_, None) | (None, Some(ApprovalStatus::NotApplicable)) => {
                sqlx::query_as(q.count_all).fetch_one(&self.pool).await?
            }
            (Some(approval), Some(status)) => {
                sqlx::query_as(approval.count_by_status)
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await?
            }
            (None, Some(_)) => (0,),
        };

        Ok(count.0)
    }
}
