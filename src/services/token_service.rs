use crate::utils::error::AppError;
use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime. There is no refresh mechanism and no revocation
/// list; a token stays valid until natural expiry.
const TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

fn jwt_secret() -> String {
    std::env::var("ACCESS_TOKEN_SECRET").unwrap_or_else(|_| "default-secret-change-me".to_string())
}

/// Sign a claims bundle into a bearer token with a fixed 1-hour expiry.
pub fn issue_token(email: &str, name: Option<String>) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        email: email.to_string(),
        name,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_ref()),
    )
    .map_err(|e| AppError::Unauthorized(format!("Failed to sign token: {}", e)))
}

/// Verify signature and expiry, returning the decoded claims.
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Pull `Authorization: Bearer <token>` off the request and verify it.
/// Every protected handler calls this first.
pub fn authenticate(req: &HttpRequest) -> Result<Claims, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let header_str = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Malformed authorization header".to_string()))?;

    let token = header_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))?;

    verify_token(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_issue_verify_roundtrip() {
        let token = issue_token("user@contesthub.com", Some("User".into())).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.email, "user@contesthub.com");
        assert_eq!(claims.name.as_deref(), Some("User"));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let claims = Claims {
            email: "user@contesthub.com".into(),
            name: None,
            iat: (now - Duration::hours(2)).timestamp() as usize,
            exp: (now - Duration::hours(1)).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret().as_ref()),
        )
        .unwrap();

        assert!(verify_token(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = issue_token("user@contesthub.com", None).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(verify_token(&tampered).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims {
            email: "user@contesthub.com".into(),
            name: None,
            iat: Utc::now().timestamp() as usize,
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap();

        assert!(verify_token(&token).is_err());
    }

    #[test]
    fn test_authenticate_missing_header() {
        let req = TestRequest::get().to_http_request();
        assert!(matches!(
            authenticate(&req),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_authenticate_rejects_non_bearer() {
        let req = TestRequest::get()
            .insert_header(("Authorization", "Basic abc"))
            .to_http_request();
        assert!(authenticate(&req).is_err());
    }

    #[test]
    fn test_authenticate_accepts_bearer() {
        let token = issue_token("user@contesthub.com", None).unwrap();
        let req = TestRequest::get()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        let claims = authenticate(&req).unwrap();
        assert_eq!(claims.email, "user@contesthub.com");
    }
}
