//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::account_handler;
use crate::domain::AccountView;

/// OpenAPI documentation for the account API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Account API",
        version = "0.1.0",
        description = "Account registration and self-service management",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        account_handler::get_account,
        account_handler::register_account,
        account_handler::update_account,
        account_handler::delete_account,
    ),
    components(
        schemas(
            AccountView,
            account_handler::RegisterRequest,
            account_handler::UpdateRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Accounts", description = "Account registration and management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("HS256 token whose subject is the account ID"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_account_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/v1/accounts"));
        assert!(doc.paths.paths.contains_key("/v1/accounts/register"));
    }
}
