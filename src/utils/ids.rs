use crate::utils::error::AppError;
use mongodb::bson::oid::ObjectId;

/// Parse a path/body id into an ObjectId, mapping malformed input to a
/// 400 instead of letting it surface as a server error.
pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest(format!("Malformed id: {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            parse_object_id("not-an-id"),
            Err(AppError::InvalidRequest(_))
        ));
        // too short
        assert!(parse_object_id("65a1f0c2").is_err());
    }

    #[test]
    fn test_accepts_hex() {
        let oid = parse_object_id("65a1f0c2d4e5f6a7b8c9d0e1").unwrap();
        assert_eq!(oid.to_hex(), "65a1f0c2d4e5f6a7b8c9d0e1");
    }
}
