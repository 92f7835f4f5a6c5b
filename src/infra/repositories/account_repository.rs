//! Account repository implementation with soft delete support.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Unchanged, ColumnTrait,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use crate::domain::{
    Account, AccountError, AccountErrorKind, AccountId, AccountResult, NewAccount, UniqueField,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account repository trait for dependency injection.
///
/// Lookups by id only see active accounts. Lookups by unique field also see
/// soft-deleted rows, since those still hold their unique values.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find active account by ID (excludes soft-deleted)
    async fn find_by_id(&self, id: AccountId) -> AccountResult<Option<Account>>;

    /// Find any account (soft-deleted included) holding `value` in `field`
    async fn find_by_field(&self, field: UniqueField, value: &str) -> AccountResult<Option<Account>>;

    /// Insert a new account
    async fn insert(&self, account: NewAccount) -> AccountResult<Account>;

    /// Persist every mutable column of an existing account
    async fn save(&self, account: Account) -> AccountResult<Account>;

    /// Soft delete an active account (sets deleted_at timestamp)
    async fn soft_delete(&self, id: AccountId) -> AccountResult<()>;
}

/// SeaORM-backed account repository
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn column_for(field: UniqueField) -> account::Column {
    match field {
        UniqueField::Username => account::Column::Username,
        UniqueField::Email => account::Column::Email,
        UniqueField::NationalId => account::Column::NationalId,
        UniqueField::PhoneNumber => account::Column::PhoneNumber,
    }
}

/// Unique column named by a constraint violation message.
///
/// Postgres names `UNIQUE` column constraints `accounts_<column>_key`.
fn violated_field(message: &str) -> Option<UniqueField> {
    [
        ("national_id", UniqueField::NationalId),
        ("phone_number", UniqueField::PhoneNumber),
        ("email", UniqueField::Email),
        ("username", UniqueField::Username),
    ]
    .into_iter()
    .find(|(column, _)| message.contains(column))
    .map(|(_, field)| field)
}

/// Map a unique violation on update to the field's exists-kind.
fn map_save_error(err: DbErr) -> AccountError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => match violated_field(&message) {
            Some(field) => field.exists_kind().into(),
            None => AccountError::from(err),
        },
        _ => AccountError::from(err),
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_id(&self, id: AccountId) -> AccountResult<Option<Account>> {
        let result = AccountEntity::find_by_id(id.into_inner())
            .filter(account::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;

        Ok(result.map(Account::from))
    }

    async fn find_by_field(&self, field: UniqueField, value: &str) -> AccountResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(column_for(field).eq(value))
            .one(&self.db)
            .await?;

        Ok(result.map(Account::from))
    }

    async fn insert(&self, account: NewAccount) -> AccountResult<Account> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(account.username),
            email: Set(account.email),
            full_name: Set(account.full_name),
            national_id: Set(account.national_id),
            phone_number: Set(account.phone_number),
            date_of_birth: Set(account.date_of_birth),
            password_hash: Set(account.password_hash),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        // Concurrent registrations can race past the service's lookups
        let model = active_model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AccountError::from(AccountErrorKind::AlreadyExists)
            } else {
                AccountError::from(e)
            }
        })?;
        Ok(Account::from(model))
    }

    async fn save(&self, account: Account) -> AccountResult<Account> {
        let active_model = ActiveModel {
            id: Unchanged(account.id.into_inner()),
            username: Set(account.username),
            email: Set(account.email),
            full_name: Set(account.full_name),
            national_id: Set(account.national_id),
            phone_number: Set(account.phone_number),
            date_of_birth: Set(account.date_of_birth),
            password_hash: Set(account.password_hash),
            created_at: NotSet,
            updated_at: Set(account.updated_at),
            deleted_at: NotSet,
        };

        // Concurrent updates can race past the service's lookups
        let model = active_model.update(&self.db).await.map_err(map_save_error)?;
        Ok(Account::from(model))
    }

    async fn soft_delete(&self, id: AccountId) -> AccountResult<()> {
        let now = Utc::now();
        let result = AccountEntity::update_many()
            .col_expr(account::Column::DeletedAt, Expr::value(now))
            .col_expr(account::Column::UpdatedAt, Expr::value(now))
            .filter(account::Column::Id.eq(id.into_inner()))
            .filter(account::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AccountErrorKind::NotRegistered.into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(id: Uuid) -> account::Model {
        let now = Utc::now();
        account::Model {
            id,
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

    #[tokio::test]
    async fn test_find_by_id_maps_model() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(id)]])
            .into_connection();

        let store = AccountStore::new(db);
        let account = store.find_by_id(AccountId::from(id)).await.unwrap().unwrap();

        assert_eq!(account.id, AccountId::from(id));
        assert_eq!(account.username, "johndoe");
    }

    #[tokio::test]
    async fn test_find_by_field_returns_none_when_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<account::Model>::new()])
            .into_connection();

        let store = AccountStore::new(db);
        let found = store
            .find_by_field(UniqueField::Email, "nobody@example.com")
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_soft_delete_without_matching_row_is_not_registered() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let store = AccountStore::new(db);
        let err = store.soft_delete(AccountId::new()).await.unwrap_err();

        assert_eq!(err.kind(), Some(AccountErrorKind::NotRegistered));
    }

    #[test]
    fn test_violated_field_from_constraint_name() {
        let cases = [
            (
                r#"duplicate key value violates unique constraint "accounts_email_key""#,
                Some(UniqueField::Email),
            ),
            (
                r#"duplicate key value violates unique constraint "accounts_national_id_key""#,
                Some(UniqueField::NationalId),
            ),
            (
                r#"duplicate key value violates unique constraint "accounts_phone_number_key""#,
                Some(UniqueField::PhoneNumber),
            ),
            (
                r#"duplicate key value violates unique constraint "accounts_username_key""#,
                Some(UniqueField::Username),
            ),
            (
                r#"duplicate key value violates unique constraint "accounts_pkey""#,
                None,
            ),
        ];

        for (message, expected) in cases {
            assert_eq!(violated_field(message), expected, "{}", message);
        }
    }

    #[test]
    fn test_save_errors_without_unique_violation_stay_storage_errors() {
        let err = map_save_error(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, AccountError::Storage(_)));
        assert_eq!(err.kind(), None);
    }

    #[tokio::test]
    async fn test_soft_delete_success() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let store = AccountStore::new(db);
        assert!(store.soft_delete(AccountId::new()).await.is_ok());
    }
}
