use serde_json::Value;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct DataResponseDoc {
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(ToSchema)]
pub struct WriteRequestDoc {
    pub key: String,
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(ToSchema)]
pub struct WriteResponseDoc { pub success: bool }

#[derive(ToSchema)]
pub struct ErrorResponseDoc { pub error: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::data::read,
        crate::routes::data::write,
    ),
    components(
        schemas(
            HealthResponse,
            DataResponseDoc,
            WriteRequestDoc,
            WriteResponseDoc,
            ErrorResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "data")
    )
)]
pub struct ApiDoc;
