//! Account database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Account, AccountId};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: String,
    #[sea_orm(unique)]
    pub national_id: String,
    #[sea_orm(unique)]
    pub phone_number: String,
    pub date_of_birth: Date,
    pub password_hash: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Soft delete timestamp (NULL = active, set = deleted)
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Account {
            id: AccountId::from(model.id),
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            national_id: model.national_id,
            phone_number: model.phone_number,
            date_of_birth: model.date_of_birth,
            password_hash: model.password_hash,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}
