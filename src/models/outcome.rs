use serde::Serialize;

/// Write acknowledgements returned to clients, mirroring the driver
/// result counts.

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub inserted_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InsertOutcome {
    pub fn inserted(id: String) -> Self {
        InsertOutcome {
            inserted_id: Some(id),
            message: None,
        }
    }

    /// The register-or-noop sentinel: nothing was written.
    pub fn noop(message: &str) -> Self {
        InsertOutcome {
            inserted_id: None,
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<String>,
}

impl UpdateOutcome {
    pub fn from_result(result: mongodb::results::UpdateResult) -> Self {
        UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id.and_then(|id| {
                id.as_object_id().map(|oid| oid.to_hex())
            }),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_sentinel_shape() {
        let outcome = InsertOutcome::noop("user already exists");
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["insertedId"], serde_json::Value::Null);
        assert_eq!(value["message"], "user already exists");
    }

    #[test]
    fn test_inserted_shape() {
        let outcome = InsertOutcome::inserted("65a1f0c2d4e5f6a7b8c9d0e1".into());
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["insertedId"], "65a1f0c2d4e5f6a7b8c9d0e1");
        assert!(value.get("message").is_none());
    }
}
