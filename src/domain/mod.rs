//! Domain layer - Core business entities and logic
//!
//! Account entity, its value objects and the closed set of business rule
//! violations the account service can report.

pub mod account;
pub mod error;
pub mod password;

pub use account::{
    parse_date_of_birth, Account, AccountId, AccountView, NewAccount, RegisterAccount,
    UniqueField, UpdateAccount,
};
pub use error::{AccountError, AccountErrorKind, AccountResult};
pub use password::Password;
