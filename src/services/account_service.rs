//! Account service - Registration and self-service account management.
//!
//! Owns every account business rule: uniqueness of username, email,
//! national ID and phone number, date of birth parsing, password hashing
//! and soft deletion. Rule violations surface as [`AccountErrorKind`]s.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{
    parse_date_of_birth, AccountErrorKind, AccountId, AccountResult, AccountView, NewAccount,
    Password, RegisterAccount, UniqueField, UpdateAccount,
};
use crate::infra::AccountRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Read the caller's active account
    async fn take_account_by_id(&self, id: AccountId) -> AccountResult<AccountView>;

    /// Register a new account
    async fn create(&self, request: RegisterAccount) -> AccountResult<()>;

    /// Apply a partial update to an active account
    async fn update(&self, id: AccountId, request: UpdateAccount) -> AccountResult<()>;

    /// Soft delete an active account
    async fn delete(&self, id: AccountId) -> AccountResult<()>;
}

/// Concrete implementation of AccountService over a repository.
pub struct AccountManager<R: AccountRepository> {
    repo: Arc<R>,
}

impl<R: AccountRepository> AccountManager<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Fail with the field's exists-kind if another account holds `value`.
    async fn ensure_available(
        &self,
        field: UniqueField,
        value: &str,
        owner: AccountId,
    ) -> AccountResult<()> {
        match self.repo.find_by_field(field, value).await? {
            Some(existing) if existing.id != owner => Err(field.exists_kind().into()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<R: AccountRepository> AccountService for AccountManager<R> {
    async fn take_account_by_id(&self, id: AccountId) -> AccountResult<AccountView> {
        let account = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AccountErrorKind::NotRegistered)?;

        Ok(AccountView::from(account))
    }

    async fn create(&self, request: RegisterAccount) -> AccountResult<()> {
        if request.username.trim().is_empty() {
            return Err(AccountErrorKind::UsernameEmpty.into());
        }

        // Soft-deleted accounts keep their unique values reserved
        let unique_values = [
            (UniqueField::Username, &request.username),
            (UniqueField::Email, &request.email),
            (UniqueField::NationalId, &request.national_id),
            (UniqueField::PhoneNumber, &request.phone_number),
        ];
        for (field, value) in unique_values {
            if self.repo.find_by_field(field, value).await?.is_some() {
                return Err(AccountErrorKind::AlreadyExists.into());
            }
        }

        let date_of_birth = parse_date_of_birth(&request.date_of_birth)?;
        let password_hash = Password::new(&request.password)?.into_string();

        let account = self
            .repo
            .insert(NewAccount {
                username: request.username,
                email: request.email,
                full_name: request.full_name,
                national_id: request.national_id,
                phone_number: request.phone_number,
                date_of_birth,
                password_hash,
            })
            .await?;

        tracing::info!(account_id = %account.id, "account registered");
        Ok(())
    }

    async fn update(&self, id: AccountId, request: UpdateAccount) -> AccountResult<()> {
        let mut account = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AccountErrorKind::NotRegistered)?;

        if let Some(username) = request.username {
            let username = username.trim().to_lowercase();
            if username.is_empty() {
                return Err(AccountErrorKind::UsernameEmpty.into());
            }
            if username != account.username {
                self.ensure_available(UniqueField::Username, &username, id)
                    .await?;
                account.username = username;
            }
        }

        if let Some(password) = request.password {
            account.password_hash = Password::new(&password)?.into_string();
        }

        if let Some(email) = request.email {
            if email != account.email {
                self.ensure_available(UniqueField::Email, &email, id).await?;
                account.email = email;
            }
        }

        if let Some(national_id) = request.national_id {
            if national_id != account.national_id {
                self.ensure_available(UniqueField::NationalId, &national_id, id)
                    .await?;
                account.national_id = national_id;
            }
        }

        if let Some(phone_number) = request.phone_number {
            if phone_number != account.phone_number {
                self.ensure_available(UniqueField::PhoneNumber, &phone_number, id)
                    .await?;
                account.phone_number = phone_number;
            }
        }

        if let Some(full_name) = request.full_name {
            account.full_name = full_name;
        }

        if let Some(date_of_birth) = request.date_of_birth {
            account.date_of_birth = parse_date_of_birth(&date_of_birth)?;
        }

        account.touch();
        self.repo.save(account).await?;

        tracing::info!(account_id = %id, "account updated");
        Ok(())
    }

    async fn delete(&self, id: AccountId) -> AccountResult<()> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(AccountErrorKind::NotRegistered.into());
        }

        self.repo.soft_delete(id).await?;

        tracing::info!(account_id = %id, "account deleted");
        Ok(())
    }
}
