use actix_web::HttpResponse;
use std::fmt;

/// Service-level error taxonomy. Every handler maps this to an HTTP
/// response exactly once via `error_response()`.
#[derive(Debug)]
pub enum AppError {
    Database(String),
    NotFound(String),
    InvalidRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Gateway(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Gateway(msg) => write!(f, "Gateway error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn database<E: fmt::Display>(e: E) -> Self {
        AppError::Database(e.to_string())
    }

    pub fn error_response(&self) -> HttpResponse {
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });
        match self {
            AppError::Database(_) => HttpResponse::InternalServerError().json(body),
            AppError::NotFound(_) => HttpResponse::NotFound().json(body),
            AppError::InvalidRequest(_) => HttpResponse::BadRequest().json(body),
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(body),
            AppError::Forbidden(_) => HttpResponse::Forbidden().json(body),
            AppError::Gateway(_) => HttpResponse::BadGateway().json(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Unauthorized("no token".into()).error_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("role mismatch".into()).error_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::InvalidRequest("bad id".into()).error_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("contest".into()).error_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database("boom".into()).error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Gateway("stripe down".into()).error_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            AppError::NotFound("payment abc".into()).to_string(),
            "Not found: payment abc"
        );
        assert_eq!(
            AppError::database("timeout").to_string(),
            "Database error: timeout"
        );
    }
}
