use crate::{
    database::{MongoDB, USERS},
    models::{Role, User},
    services::token_service::{self, Claims},
    utils::error::AppError,
};
use actix_web::HttpRequest;
use mongodb::bson::doc;

/// Minimum stored role a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// A valid token is enough; no role lookup.
    Authenticated,
    CreatorOrAdmin,
    AdminOnly,
}

impl RoleRequirement {
    pub fn allows(self, role: Role) -> bool {
        match self {
            RoleRequirement::Authenticated => true,
            RoleRequirement::CreatorOrAdmin => role.is_creator(),
            RoleRequirement::AdminOnly => role.is_admin(),
        }
    }
}

/// Declarative per-route authorization policy: a role requirement plus
/// an optional ownership predicate (the path/query email the token
/// email must equal). Self routes are strict; an admin cannot read
/// another account's self route.
#[derive(Debug, Clone)]
pub struct Policy {
    pub requirement: RoleRequirement,
    pub owner_email: Option<String>,
}

impl Policy {
    pub fn self_only(email: &str) -> Self {
        Policy {
            requirement: RoleRequirement::Authenticated,
            owner_email: Some(email.to_string()),
        }
    }

    pub fn creator_or_admin() -> Self {
        Policy {
            requirement: RoleRequirement::CreatorOrAdmin,
            owner_email: None,
        }
    }

    pub fn creator_self(email: &str) -> Self {
        Policy {
            requirement: RoleRequirement::CreatorOrAdmin,
            owner_email: Some(email.to_string()),
        }
    }

    pub fn admin_only() -> Self {
        Policy {
            requirement: RoleRequirement::AdminOnly,
            owner_email: None,
        }
    }
}

pub fn check_ownership(owner_email: Option<&str>, caller_email: &str) -> bool {
    match owner_email {
        Some(owner) => owner == caller_email,
        None => true,
    }
}

/// Look up the caller's stored role. Missing user row counts as `user`,
/// matching the registration default.
pub async fn lookup_role(db: &MongoDB, email: &str) -> Result<Role, AppError> {
    let collection = db.collection::<User>(USERS);

    let user = collection
        .find_one(doc! { "email": email })
        .await
        .map_err(AppError::database)?;

    Ok(user.map(|u| u.role).unwrap_or_default())
}

/// Enforce a policy for the verified caller. The role is read fresh
/// from the database on every call, so a role change takes effect on
/// the caller's very next request.
pub async fn authorize(db: &MongoDB, claims: &Claims, policy: &Policy) -> Result<Role, AppError> {
    if !check_ownership(policy.owner_email.as_deref(), &claims.email) {
        return Err(AppError::Forbidden("forbidden access".to_string()));
    }

    if policy.requirement == RoleRequirement::Authenticated {
        return Ok(Role::User);
    }

    let role = lookup_role(db, &claims.email).await?;
    if !policy.requirement.allows(role) {
        return Err(AppError::Forbidden("forbidden access".to_string()));
    }

    Ok(role)
}

/// Authenticate the bearer token and enforce the policy in one step.
/// The single entry point every protected handler goes through.
pub async fn guard(
    db: &MongoDB,
    req: &HttpRequest,
    policy: &Policy,
) -> Result<(Claims, Role), AppError> {
    let claims = token_service::authenticate(req)?;
    let role = authorize(db, &claims, policy).await?;
    Ok((claims, role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_matrix() {
        // user: only plain-token routes
        assert!(RoleRequirement::Authenticated.allows(Role::User));
        assert!(!RoleRequirement::CreatorOrAdmin.allows(Role::User));
        assert!(!RoleRequirement::AdminOnly.allows(Role::User));

        // creator: creator routes but not admin routes
        assert!(RoleRequirement::CreatorOrAdmin.allows(Role::Creator));
        assert!(!RoleRequirement::AdminOnly.allows(Role::Creator));

        // admin: everything
        assert!(RoleRequirement::CreatorOrAdmin.allows(Role::Admin));
        assert!(RoleRequirement::AdminOnly.allows(Role::Admin));
    }

    #[test]
    fn test_ownership_predicate() {
        assert!(check_ownership(None, "a@x.com"));
        assert!(check_ownership(Some("a@x.com"), "a@x.com"));
        assert!(!check_ownership(Some("b@x.com"), "a@x.com"));
    }

    #[test]
    fn test_policy_constructors() {
        let p = Policy::creator_self("c@x.com");
        assert_eq!(p.requirement, RoleRequirement::CreatorOrAdmin);
        assert_eq!(p.owner_email.as_deref(), Some("c@x.com"));

        assert!(Policy::admin_only().owner_email.is_none());
    }
}
