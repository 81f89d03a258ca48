use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a paid entry: paid -> submitted -> winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Submitted,
    Winner,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Submitted => write!(f, "submitted"),
            PaymentStatus::Winner => write!(f, "winner"),
        }
    }
}

/// Payment document (stored in the `payments` collection). One row per
/// paid entry; `contestId` is kept as a hex string and cast back with
/// `$toObjectId` inside the enrichment pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub email: String,
    pub contest_id: String,
    pub price: f64,
    pub transaction_id: String,
    pub date: BsonDateTime,
    pub status: PaymentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_submission: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub contest_id: String,
    pub price: f64,
    pub transaction_id: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTaskRequest {
    pub task_submission: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreatePaymentIntentRequest {
    pub price: f64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Payment as returned over the wire
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: String,
    pub email: String,
    pub contest_id: String,
    pub price: f64,
    pub transaction_id: String,
    pub date: i64,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_submission: Option<String>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        PaymentResponse {
            id: p.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: p.email,
            contest_id: p.contest_id,
            price: p.price,
            transaction_id: p.transaction_id,
            date: p.date.timestamp_millis(),
            status: p.status,
            task_submission: p.task_submission,
        }
    }
}

fn serialize_object_id_as_hex<S>(oid: &ObjectId, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&oid.to_hex())
}

fn serialize_bson_datetime_as_millis<S>(date: &BsonDateTime, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_i64(date.timestamp_millis())
}

/// One row of the self-payments listing: the payment joined with
/// display fields of its contest. Deserialized straight from the
/// aggregation output, serialized with flat JSON-friendly id/date.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPayment {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub price: f64,
    pub transaction_id: String,
    #[serde(serialize_with = "serialize_bson_datetime_as_millis")]
    #[schema(value_type = i64)]
    pub date: BsonDateTime,
    pub status: PaymentStatus,
    pub contest_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_submission: Option<String>,
    pub contest_name: String,
    pub contest_type: String,
    pub image: Option<String>,
    pub prize_money: f64,
    pub deadline: String,
}

/// One leaderboard row: participant identity plus win count.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Grouping key of the aggregation: the winner's email.
    #[serde(rename = "_id")]
    pub email: String,
    pub win_count: i64,
    pub name: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WinningStats {
    pub total_wins: u64,
    pub total_participated: u64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminStats {
    pub users: u64,
    pub contests: u64,
    pub payments: u64,
    pub revenue: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_payment_status_wire_format() {
        assert_eq!(serde_json::to_string(&PaymentStatus::Winner).unwrap(), "\"winner\"");
        assert_eq!(
            serde_json::from_str::<PaymentStatus>("\"submitted\"").unwrap(),
            PaymentStatus::Submitted
        );
        assert!(serde_json::from_str::<PaymentStatus>("\"isWinner\"").is_err());
    }

    #[test]
    fn test_payment_document_shape() {
        let payment = Payment {
            id: None,
            email: "p@x.com".into(),
            contest_id: "65a1f0c2d4e5f6a7b8c9d0e1".into(),
            price: 10.0,
            transaction_id: "pi_123".into(),
            date: BsonDateTime::now(),
            status: PaymentStatus::Paid,
            task_submission: None,
        };
        let doc = bson::to_document(&payment).unwrap();
        assert_eq!(doc.get_str("contestId").unwrap(), "65a1f0c2d4e5f6a7b8c9d0e1");
        assert_eq!(doc.get_str("status").unwrap(), "paid");
        // unset submission must not appear on the wire
        assert!(doc.get("taskSubmission").is_none());
    }

    #[test]
    fn test_leaderboard_row_decodes_group_key() {
        let doc = bson::doc! {
            "_id": "p@x.com",
            "winCount": 4_i64,
            "name": "P",
            "photo": "http://img",
        };
        let row: LeaderboardEntry = bson::from_document(doc).unwrap();
        assert_eq!(row.email, "p@x.com");
        assert_eq!(row.win_count, 4);
    }
}
