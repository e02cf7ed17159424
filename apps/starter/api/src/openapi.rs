use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(crate::api::health::ready_handler),
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Starter API",
        version = "0.1.0",
        description = "User management API backed by PostgreSQL"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/users", api = domain_users::ApiDoc)
    ),
    tags((name = "health", description = "Readiness of the service and its database"))
)]
pub struct ApiDoc;
