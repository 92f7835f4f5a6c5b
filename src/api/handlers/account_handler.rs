//! Account handlers.
//!
//! Every operation owns a static table that decides which account rule
//! violations reach the client and under which status and field. Anything
//! not listed is reported as an internal error.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::extractors::{CurrentAccount, ValidatedJson};
use crate::api::AppState;
use crate::config::{
    FIELD_ACCOUNT, FIELD_ACCOUNTS, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH,
};
use crate::domain::{
    parse_date_of_birth, AccountErrorKind, AccountView, RegisterAccount, UpdateAccount,
};
use crate::errors::{map_account_error, AppError, AppResult, ErrorMapping};
use crate::types::{ApiResponse, Created};

// =============================================================================
// Error tables
// =============================================================================

const GET_ERRORS: &[ErrorMapping] = &[];

const REGISTER_ERRORS: &[ErrorMapping] = &[ErrorMapping::new(
    AccountErrorKind::AlreadyExists,
    StatusCode::CONFLICT,
    FIELD_ACCOUNT,
)];

const UPDATE_ERRORS: &[ErrorMapping] = &[
    ErrorMapping::new(AccountErrorKind::NotRegistered, StatusCode::BAD_REQUEST, FIELD_ACCOUNTS),
    ErrorMapping::new(AccountErrorKind::UsernameEmpty, StatusCode::BAD_REQUEST, FIELD_ACCOUNTS),
    ErrorMapping::new(AccountErrorKind::PasswordEmpty, StatusCode::BAD_REQUEST, FIELD_ACCOUNTS),
    ErrorMapping::new(AccountErrorKind::UsernameExists, StatusCode::BAD_REQUEST, FIELD_ACCOUNTS),
    ErrorMapping::new(AccountErrorKind::EmailExists, StatusCode::BAD_REQUEST, FIELD_ACCOUNTS),
    ErrorMapping::new(AccountErrorKind::NationalIdExists, StatusCode::BAD_REQUEST, FIELD_ACCOUNTS),
    ErrorMapping::new(AccountErrorKind::PhoneNumberExists, StatusCode::BAD_REQUEST, FIELD_ACCOUNTS),
    ErrorMapping::new(AccountErrorKind::InvalidDateOfBirth, StatusCode::BAD_REQUEST, FIELD_ACCOUNTS),
];

const DELETE_ERRORS: &[ErrorMapping] = &[ErrorMapping::new(
    AccountErrorKind::NotRegistered,
    StatusCode::BAD_REQUEST,
    FIELD_ACCOUNTS,
)];

// =============================================================================
// Request payloads
// =============================================================================

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_.]+$").expect("valid username regex"));

static NATIONAL_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{16}$").expect("valid national ID regex"));

static PHONE_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{8,15}$").expect("valid phone number regex"));

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Login name, stored lowercase
    #[validate(custom(
        function = "validate_username",
        message = "username must be 3-32 letters, digits, '_' or '.'"
    ))]
    #[schema(example = "JohnDoe", min_length = 3, max_length = 32)]
    pub username: String,
    #[validate(custom(
        function = "validate_password",
        message = "password must be at least 8 characters and not blank"
    ))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    #[validate(email(message = "invalid email format"))]
    #[schema(example = "john@example.com")]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "full name must be 1-100 characters"))]
    #[schema(example = "John Doe")]
    pub full_name: String,
    /// 16 digit national identity number
    #[validate(custom(
        function = "validate_national_id",
        message = "national ID number must be exactly 16 digits"
    ))]
    #[schema(example = "3171234567890001")]
    pub national_id: String,
    #[validate(custom(
        function = "validate_phone_number",
        message = "phone number must be 8-15 digits with an optional leading '+'"
    ))]
    #[schema(example = "+6281234567890")]
    pub phone_number: String,
    #[validate(custom(
        function = "validate_date_of_birth",
        message = "date of birth must be formatted as YYYY-MM-DD"
    ))]
    #[schema(example = "1990-01-31", format = Date)]
    pub date_of_birth: String,
}

impl From<RegisterRequest> for RegisterAccount {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username.to_lowercase(),
            password: req.password,
            email: req.email,
            full_name: req.full_name,
            national_id: req.national_id,
            phone_number: req.phone_number,
            date_of_birth: req.date_of_birth,
        }
    }
}

/// Partial account update; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRequest {
    #[validate(custom(
        function = "validate_username_update",
        message = "username must be 3-32 letters, digits, '_' or '.'"
    ))]
    #[schema(example = "johnny")]
    pub username: Option<String>,
    #[validate(custom(
        function = "validate_password_update",
        message = "password must be at least 8 characters"
    ))]
    pub password: Option<String>,
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "full name must be 1-100 characters"))]
    pub full_name: Option<String>,
    #[validate(custom(
        function = "validate_national_id",
        message = "national ID number must be exactly 16 digits"
    ))]
    pub national_id: Option<String>,
    #[validate(custom(
        function = "validate_phone_number",
        message = "phone number must be 8-15 digits with an optional leading '+'"
    ))]
    pub phone_number: Option<String>,
    /// `YYYY-MM-DD`, checked by the account service
    #[schema(example = "1990-01-31")]
    pub date_of_birth: Option<String>,
}

impl From<UpdateRequest> for UpdateAccount {
    fn from(req: UpdateRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            email: req.email,
            full_name: req.full_name,
            national_id: req.national_id,
            phone_number: req.phone_number,
            date_of_birth: req.date_of_birth,
        }
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len)
        || !USERNAME_REGEX.is_match(username)
    {
        return Err(ValidationError::new("username"));
    }
    Ok(())
}

// Blank values pass so the service can report them
fn validate_username_update(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Ok(());
    }
    validate_username(username)
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() || password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new("password"));
    }
    Ok(())
}

fn validate_password_update(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Ok(());
    }
    validate_password(password)
}

fn validate_national_id(national_id: &str) -> Result<(), ValidationError> {
    if !NATIONAL_ID_REGEX.is_match(national_id) {
        return Err(ValidationError::new("national_id"));
    }
    Ok(())
}

fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    if !PHONE_NUMBER_REGEX.is_match(phone_number) {
        return Err(ValidationError::new("phone_number"));
    }
    Ok(())
}

fn validate_date_of_birth(date_of_birth: &str) -> Result<(), ValidationError> {
    parse_date_of_birth(date_of_birth)
        .map(|_| ())
        .map_err(|_| ValidationError::new("date_of_birth"))
}

// =============================================================================
// Routes
// =============================================================================

/// Create account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(get_account).patch(update_account).delete(delete_account),
        )
        .route("/register", post(register_account))
}

/// Get the caller's account
#[utoipa::path(
    get,
    path = "/v1/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account of the token holder", body = AccountView),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Account could not be loaded")
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    CurrentAccount(id): CurrentAccount,
) -> AppResult<Json<ApiResponse<AccountView>>> {
    let account = state
        .account_service
        .take_account_by_id(id)
        .await
        .map_err(|e| map_account_error(GET_ERRORS, e))?;

    Ok(Json(ApiResponse::ok(account)))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/v1/accounts/register",
    tag = "Accounts",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account registered"),
        (status = 400, description = "Malformed or invalid payload"),
        (status = 409, description = "Account already exists")
    )
)]
pub async fn register_account(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created> {
    state
        .account_service
        .create(payload.into())
        .await
        .map_err(|e| map_account_error(REGISTER_ERRORS, e))?;

    Ok(Created)
}

/// Update the caller's account
#[utoipa::path(
    patch,
    path = "/v1/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Account updated"),
        (status = 400, description = "Invalid payload or rejected change"),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn update_account(
    State(state): State<AppState>,
    caller: Result<CurrentAccount, AppError>,
    ValidatedJson(payload): ValidatedJson<UpdateRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    // The body has already been checked at this point
    let CurrentAccount(id) = caller?;

    state
        .account_service
        .update(id, payload.into())
        .await
        .map_err(|e| map_account_error(UPDATE_ERRORS, e))?;

    Ok(Json(ApiResponse::message("OK")))
}

/// Delete the caller's account
#[utoipa::path(
    delete,
    path = "/v1/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 400, description = "Account is not registered"),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentAccount(id): CurrentAccount,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .account_service
        .delete(id)
        .await
        .map_err(|e| map_account_error(DELETE_ERRORS, e))?;

    Ok(Json(ApiResponse::message("OK")))
}
