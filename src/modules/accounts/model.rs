use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};

use crate::errors::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    #[serde(alias = "medecin")]
    Doctor,
    #[serde(alias = "secretaire")]
    Secretary,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Patient, Role::Doctor, Role::Secretary, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Secretary => "secretary",
            Role::Admin => "admin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Patient => "Patient",
            Role::Doctor => "Doctor",
            Role::Secretary => "Secretary",
            Role::Admin => "Administrator",
        }
    }

    /// Doctors and secretaries must be approved by an admin before they can log in.
    pub fn requires_approval(self) -> bool {
        matches!(self, Role::Doctor | Role::Secretary)
    }

    /// Admin accounts are provisioned, not self-registered, so they never
    /// go through email verification.
    pub fn accepts_verification_codes(self) -> bool {
        !matches!(self, Role::Admin)
    }

    pub fn initial_status(self) -> ApprovalStatus {
        if self.requires_approval() {
            ApprovalStatus::Pending
        } else {
            ApprovalStatus::NotApplicable
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "patient" => Ok(Role::Patient),
            "doctor" | "medecin" => Ok(Role::Doctor),
            "secretary" | "secretaire" => Ok(Role::Secretary),
            "admin" => Ok(Role::Admin),
            other => Err(ApiError::InvalidRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    NotApplicable,
    Pending,
    Approved,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::NotApplicable => "not_applicable",
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_applicable" => Ok(ApprovalStatus::NotApplicable),
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            other => Err(ApiError::Internal(format!("unknown approval status '{other}'"))),
        }
    }
}

/// Descriptive account data. Which optional fields are kept depends on the role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub sex: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub specialty: Option<String>,
    pub rpps: Option<String>,
    pub hospital_address: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
}

impl Profile {
    /// Drops the fields a role's table does not store.
    pub fn for_role(mut self, role: Role) -> Self {
        let keep_location = role == Role::Patient;
        let keep_practice = matches!(role, Role::Doctor | Role::Secretary);
        let keep_office = role == Role::Secretary;

        if !keep_location {
            self.country = None;
            self.city = None;
        }
        if !keep_practice {
            self.specialty = None;
            self.rpps = None;
            self.hospital_address = None;
        }
        if !keep_office {
            self.position = None;
            self.department = None;
        }
        if role == Role::Admin {
            self.sex = None;
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: String,
    pub role: Role,
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
    pub approval_status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn can_log_in(&self) -> bool {
        !self.role.requires_approval() || self.approval_status == ApprovalStatus::Approved
    }
}

/// Row shape shared by the four account tables. Columns a table lacks are
/// selected as NULL, and `status` as a literal for roles without approval.
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub sex: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub specialty: Option<String>,
    pub rpps: Option<String>,
    pub hospital_address: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl AccountRow {
    pub fn into_account(self, role: Role) -> Result<UserAccount, ApiError> {
        Ok(UserAccount {
            id: self.id,
            role,
            email: self.email,
            password_hash: self.password_hash,
            profile: Profile {
                first_name: self.first_name,
                last_name: self.last_name,
                phone: self.phone,
                sex: self.sex,
                country: self.country,
                city: self.city,
                specialty: self.specialty,
                rpps: self.rpps,
                hospital_address: self.hospital_address,
                position: self.position,
                department: self.department,
            },
            approval_status: self.status.parse()?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug)]
pub enum RejectOutcome {
    Deleted(UserAccount),
    NotFound,
    AlreadyApproved,
}
