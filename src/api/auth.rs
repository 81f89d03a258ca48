use crate::services::token_service;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

/// Claims bundle supplied by the client on sign-in. Email is the
/// identity key everything else hangs off.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct TokenRequest {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/jwt",
    tag = "Auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse)
    )
)]
pub async fn issue_jwt(request: web::Json<TokenRequest>) -> HttpResponse {
    log::info!("POST /jwt - email: {}", request.email);

    match token_service::issue_token(&request.email, request.name.clone()) {
        Ok(token) => HttpResponse::Ok().json(TokenResponse { token }),
        Err(e) => e.error_response(),
    }
}
