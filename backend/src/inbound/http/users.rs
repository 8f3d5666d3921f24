//! User registration handler.
//!
//! ```text
//! POST /api/v1/users {"name":"Ada","email":"ada@example.com"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserProfile;
use crate::domain::ports::RegisterUserRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserBody {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Registered user as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<UserProfile> for UserBody {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id().to_string(),
            name: profile.name().to_owned(),
            email: profile.email().to_owned(),
        }
    }
}

/// Register a user that can later act as a driver or a passenger.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterUserBody,
    responses(
        (status = 201, description = "User registered", body = UserBody),
        (status = 400, description = "Invalid name or email", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterUserBody>,
) -> ApiResult<HttpResponse> {
    let RegisterUserBody { name, email } = payload.into_inner();
    let profile = state
        .registration
        .register_user(RegisterUserRequest { name, email })
        .await?;
    Ok(HttpResponse::Created().json(UserBody::from(profile)))
}
