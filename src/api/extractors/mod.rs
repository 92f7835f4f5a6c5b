//! Custom request extractors.

mod current_account;
mod validated_json;

pub use current_account::CurrentAccount;
pub use validated_json::ValidatedJson;
