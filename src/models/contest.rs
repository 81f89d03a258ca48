use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Moderation status of a contest. Transitions are restricted to the
/// table in `can_transition_to`; anything else is rejected up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl Default for ContestStatus {
    fn default() -> Self {
        ContestStatus::Pending
    }
}

impl ContestStatus {
    /// Allowed transitions: pending -> accepted, pending -> rejected.
    /// Accepted/rejected are terminal.
    pub fn can_transition_to(self, next: ContestStatus) -> bool {
        matches!(
            (self, next),
            (ContestStatus::Pending, ContestStatus::Accepted)
                | (ContestStatus::Pending, ContestStatus::Rejected)
        )
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContestStatus::Pending => write!(f, "pending"),
            ContestStatus::Accepted => write!(f, "accepted"),
            ContestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for ContestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ContestStatus::Pending),
            "accepted" => Ok(ContestStatus::Accepted),
            "rejected" => Ok(ContestStatus::Rejected),
            other => Err(format!("Unknown contest status: {}", other)),
        }
    }
}

/// Contest document (stored in the `contests` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub creator_email: String,
    pub contest_name: String,
    pub contest_type: String,
    pub description: String,
    pub price: f64,
    pub prize_money: f64,
    pub task_instruction: String,
    pub deadline: String,
    pub image: Option<String>,

    #[serde(default)]
    pub status: ContestStatus,

    /// Denormalized count of paid entries, bumped inside the payment
    /// transaction.
    #[serde(default)]
    pub participation_count: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_photo: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContestRequest {
    pub contest_name: String,
    pub contest_type: String,
    pub description: String,
    pub price: f64,
    pub prize_money: f64,
    pub task_instruction: String,
    pub deadline: String,
    pub image: Option<String>,
}

/// Whitelisted editable fields for the creator edit route.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContestRequest {
    pub contest_name: String,
    pub contest_type: String,
    pub description: String,
    pub price: f64,
    pub prize_money: f64,
    pub task_instruction: String,
    pub deadline: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PickWinnerRequest {
    pub winner_email: String,
}

/// Contest as returned over the wire
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContestResponse {
    pub id: String,
    pub creator_email: String,
    pub contest_name: String,
    pub contest_type: String,
    pub description: String,
    pub price: f64,
    pub prize_money: f64,
    pub task_instruction: String,
    pub deadline: String,
    pub image: Option<String>,
    pub status: ContestStatus,
    pub participation_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_photo: Option<String>,
}

impl From<Contest> for ContestResponse {
    fn from(c: Contest) -> Self {
        ContestResponse {
            id: c.id.map(|id| id.to_hex()).unwrap_or_default(),
            creator_email: c.creator_email,
            contest_name: c.contest_name,
            contest_type: c.contest_type,
            description: c.description,
            price: c.price,
            prize_money: c.prize_money,
            task_instruction: c.task_instruction,
            deadline: c.deadline,
            image: c.image,
            status: c.status,
            participation_count: c.participation_count,
            winner_email: c.winner_email,
            winner_name: c.winner_name,
            winner_photo: c.winner_photo,
        }
    }
}

/// Paginated public listing payload: the page slice plus the total
/// number of matching contests.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ContestPage {
    pub result: Vec<ContestResponse>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_transition_table() {
        assert!(ContestStatus::Pending.can_transition_to(ContestStatus::Accepted));
        assert!(ContestStatus::Pending.can_transition_to(ContestStatus::Rejected));

        // terminal states
        assert!(!ContestStatus::Accepted.can_transition_to(ContestStatus::Rejected));
        assert!(!ContestStatus::Accepted.can_transition_to(ContestStatus::Pending));
        assert!(!ContestStatus::Rejected.can_transition_to(ContestStatus::Accepted));

        // self transitions are not transitions
        assert!(!ContestStatus::Pending.can_transition_to(ContestStatus::Pending));
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!("accepted".parse::<ContestStatus>().unwrap(), ContestStatus::Accepted);
        assert!("approved".parse::<ContestStatus>().is_err());
        assert!("Accepted".parse::<ContestStatus>().is_err());
    }

    #[test]
    fn test_contest_defaults_on_decode() {
        let doc = bson::doc! {
            "creatorEmail": "c@x.com",
            "contestName": "Logo sprint",
            "contestType": "Design",
            "description": "d",
            "price": 10.0,
            "prizeMoney": 100.0,
            "taskInstruction": "t",
            "deadline": "2026-12-31",
            "image": "http://img",
        };
        let contest: Contest = bson::from_document(doc).unwrap();
        assert_eq!(contest.status, ContestStatus::Pending);
        assert_eq!(contest.participation_count, 0);
        assert!(contest.winner_email.is_none());
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let contest = Contest {
            id: None,
            creator_email: "c@x.com".into(),
            contest_name: "Logo sprint".into(),
            contest_type: "Design".into(),
            description: "d".into(),
            price: 10.0,
            prize_money: 100.0,
            task_instruction: "t".into(),
            deadline: "2026-12-31".into(),
            image: None,
            status: ContestStatus::Accepted,
            participation_count: 3,
            winner_email: None,
            winner_name: None,
            winner_photo: None,
        };
        let value = serde_json::to_value(&contest).unwrap();
        assert_eq!(value["creatorEmail"], "c@x.com");
        assert_eq!(value["participationCount"], 3);
        assert_eq!(value["status"], "accepted");
    }
}
