//! Account domain entity and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::AccountErrorKind;
use crate::config::DATE_OF_BIRTH_FORMAT;

/// Opaque account identifier carried in bearer tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for AccountId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account columns that must be unique across all accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    NationalId,
    PhoneNumber,
}

impl UniqueField {
    /// Rule violation reported when another account already holds the value
    pub fn exists_kind(self) -> AccountErrorKind {
        match self {
            UniqueField::Username => AccountErrorKind::UsernameExists,
            UniqueField::Email => AccountErrorKind::EmailExists,
            UniqueField::NationalId => AccountErrorKind::NationalIdExists,
            UniqueField::PhoneNumber => AccountErrorKind::PhoneNumberExists,
        }
    }
}

/// Account domain entity
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub national_id: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Refresh the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Data needed to insert a new account row
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub national_id: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub password_hash: String,
}

/// Account registration data transfer object
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterAccount {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: String,
    pub national_id: String,
    pub phone_number: String,
    /// Raw `YYYY-MM-DD` value, parsed by the service
    pub date_of_birth: String,
}

/// Partial account update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateAccount {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub national_id: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
}

/// Account data safe to return to the owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccountView {
    /// Unique account identifier
    #[schema(value_type = String, format = Uuid)]
    pub id: AccountId,
    /// Lowercase login name
    #[schema(example = "johndoe")]
    pub username: String,
    #[schema(example = "john@example.com")]
    pub email: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    /// National identity number
    #[schema(example = "3171234567890001")]
    pub national_id: String,
    #[schema(example = "+6281234567890")]
    pub phone_number: String,
    #[schema(value_type = String, format = Date, example = "1990-01-31")]
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            full_name: account.full_name,
            national_id: account.national_id,
            phone_number: account.phone_number,
            date_of_birth: account.date_of_birth,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Parse a `YYYY-MM-DD` date of birth.
pub fn parse_date_of_birth(raw: &str) -> Result<NaiveDate, AccountErrorKind> {
    NaiveDate::parse_from_str(raw.trim(), DATE_OF_BIRTH_FORMAT)
        .map_err(|_| AccountErrorKind::InvalidDateOfBirth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account() -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(),
            username: "johndoe".to_string(),
            email: "john@example.com".to_string(),
            full_name: "John Doe".to_string(),
            national_id: "3171234567890001".to_string(),
            phone_number: "+6281234567890".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 31).unwrap(),
            password_hash: "hashed".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_parse_date_of_birth() {
        assert_eq!(
            parse_date_of_birth("1990-01-31"),
            Ok(NaiveDate::from_ymd_opt(1990, 1, 31).unwrap())
        );
        assert_eq!(
            parse_date_of_birth("31-01-1990"),
            Err(AccountErrorKind::InvalidDateOfBirth)
        );
        assert_eq!(
            parse_date_of_birth("1990-02-30"),
            Err(AccountErrorKind::InvalidDateOfBirth)
        );
    }

    #[test]
    fn test_view_omits_password_hash() {
        let view = AccountView::from(sample_account());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["date_of_birth"], "1990-01-31");
    }

    #[test]
    fn test_account_id_round_trips_as_plain_uuid() {
        let id = AccountId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        assert_eq!(id.to_string().parse::<AccountId>().unwrap(), id);
    }

    #[test]
    fn test_exists_kind() {
        assert_eq!(
            UniqueField::PhoneNumber.exists_kind(),
            AccountErrorKind::PhoneNumberExists
        );
    }
}
