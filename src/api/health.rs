use actix_web::{HttpResponse, Responder};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: i64,
}

/// Plain-text liveness probe at the root path.
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().body("ContestHub Server is Running")
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "contesthub-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[tokio::test]
    async fn test_liveness_string() {
        let resp = liveness().await.respond_to(&actix_web::test::TestRequest::get().to_http_request());
        let body = resp.into_body().try_into_bytes().ok().unwrap();
        assert_eq!(&body[..], b"ContestHub Server is Running");
    }
}
