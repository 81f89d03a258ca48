use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform role stored on the user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Creator,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    /// Creators and admins may publish and manage contests.
    pub fn is_creator(self) -> bool {
        matches!(self, Role::Creator | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Creator => write!(f, "creator"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "creator" => Ok(Role::Creator),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// User document (stored in the `users` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub email: String,
    pub name: Option<String>,
    pub photo: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,

    #[serde(default)]
    pub role: Role,

    pub created_at: Option<BsonDateTime>,
}

/// Request body for register-or-noop
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterUserRequest {
    pub email: String,
    pub name: Option<String>,
    pub photo: Option<String>,
}

/// Request body for the self-profile update (role is deliberately absent)
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub photo: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetRoleRequest {
    pub role: String,
}

/// User as returned over the wire
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub photo: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: user.email,
            name: user.name,
            photo: user.photo,
            bio: user.bio,
            address: user.address,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Creator).unwrap(), "\"creator\"");
        assert_eq!(serde_json::from_str::<Role>("\"admin\"").unwrap(), Role::Admin);
        assert!("moderator".parse::<Role>().is_err());
    }

    #[test]
    fn test_creator_includes_admin() {
        assert!(Role::Admin.is_creator());
        assert!(Role::Creator.is_creator());
        assert!(!Role::User.is_creator());
        assert!(!Role::Creator.is_admin());
    }

    #[test]
    fn test_missing_role_defaults_to_user() {
        let doc = bson::doc! { "email": "a@b.com" };
        let user: User = bson::from_document(doc).unwrap();
        assert_eq!(user.role, Role::User);
        assert!(user.id.is_none());
    }

    #[test]
    fn test_response_uses_hex_id() {
        let oid = ObjectId::new();
        let user = User {
            id: Some(oid),
            email: "a@b.com".into(),
            name: Some("A".into()),
            photo: None,
            bio: None,
            address: None,
            role: Role::Creator,
            created_at: None,
        };
        let resp = UserResponse::from(user);
        assert_eq!(resp.id, oid.to_hex());
    }
}
