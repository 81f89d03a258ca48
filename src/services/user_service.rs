use crate::{
    database::{MongoDB, USERS},
    models::{
        DeleteOutcome, InsertOutcome, RegisterUserRequest, Role, UpdateOutcome,
        UpdateProfileRequest, User, UserResponse,
    },
    utils::{error::AppError, ids::parse_object_id},
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};

/// Number of creators shown on the public "best creators" strip.
const BEST_CREATORS_LIMIT: i64 = 6;

/// Register-or-noop: insert the user only if the email is not present,
/// otherwise answer with the no-insert sentinel. The existence check and
/// the insert are two calls; a concurrent first sign-in for the same
/// email can race, and the second insert wins.
pub async fn register_or_noop(
    db: &MongoDB,
    request: &RegisterUserRequest,
) -> Result<InsertOutcome, AppError> {
    let collection = db.collection::<User>(USERS);

    let existing = collection
        .find_one(doc! { "email": &request.email })
        .await
        .map_err(AppError::database)?;

    if existing.is_some() {
        return Ok(InsertOutcome::noop("user already exists"));
    }

    let user = User {
        id: None,
        email: request.email.clone(),
        name: request.name.clone(),
        photo: request.photo.clone(),
        bio: None,
        address: None,
        role: Role::User,
        created_at: Some(BsonDateTime::now()),
    };

    let result = collection
        .insert_one(&user)
        .await
        .map_err(AppError::database)?;

    let inserted_id = result
        .inserted_id
        .as_object_id()
        .map(|oid| oid.to_hex())
        .unwrap_or_default();

    log::info!("User registered: {}", request.email);

    Ok(InsertOutcome::inserted(inserted_id))
}

pub async fn list_users(db: &MongoDB) -> Result<Vec<UserResponse>, AppError> {
    let collection = db.collection::<User>(USERS);

    let users: Vec<User> = collection
        .find(doc! {})
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    Ok(users.into_iter().map(UserResponse::from).collect())
}

/// Public sample of up to 6 creators, document order.
pub async fn best_creators(db: &MongoDB) -> Result<Vec<UserResponse>, AppError> {
    let collection = db.collection::<User>(USERS);

    let creators: Vec<User> = collection
        .find(doc! { "role": "creator" })
        .limit(BEST_CREATORS_LIMIT)
        .await
        .map_err(AppError::database)?
        .try_collect()
        .await
        .map_err(AppError::database)?;

    Ok(creators.into_iter().map(UserResponse::from).collect())
}

/// Stored role for an email; `user` when no row exists.
pub async fn get_role(db: &MongoDB, email: &str) -> Result<Role, AppError> {
    let collection = db.collection::<User>(USERS);

    let user = collection
        .find_one(doc! { "email": email })
        .await
        .map_err(AppError::database)?;

    Ok(user.map(|u| u.role).unwrap_or_default())
}

pub async fn set_role(db: &MongoDB, id: &str, role: Role) -> Result<UpdateOutcome, AppError> {
    let collection = db.collection::<User>(USERS);
    let oid = parse_object_id(id)?;

    let result = collection
        .update_one(
            doc! { "_id": oid },
            doc! { "$set": { "role": role.to_string() } },
        )
        .await
        .map_err(AppError::database)?;

    log::info!("Role of user {} set to {}", id, role);

    Ok(UpdateOutcome::from_result(result))
}

pub async fn delete_user(db: &MongoDB, id: &str) -> Result<DeleteOutcome, AppError> {
    let collection = db.collection::<User>(USERS);
    let oid = parse_object_id(id)?;

    let result = collection
        .delete_one(doc! { "_id": oid })
        .await
        .map_err(AppError::database)?;

    Ok(DeleteOutcome {
        deleted_count: result.deleted_count,
    })
}

/// Self-profile upsert. Only the whitelisted profile fields can be set;
/// role and email never pass through here.
pub async fn update_profile(
    db: &MongoDB,
    email: &str,
    request: &UpdateProfileRequest,
) -> Result<UpdateOutcome, AppError> {
    let collection = db.collection::<Document>(USERS);

    let mut set = Document::new();
    if let Some(name) = &request.name {
        set.insert("name", name);
    }
    if let Some(photo) = &request.photo {
        set.insert("photo", photo);
    }
    if let Some(bio) = &request.bio {
        set.insert("bio", bio);
    }
    if let Some(address) = &request.address {
        set.insert("address", address);
    }

    if set.is_empty() {
        return Err(AppError::InvalidRequest(
            "No profile fields to update".to_string(),
        ));
    }

    let result = collection
        .update_one(
            doc! { "email": email },
            doc! { "$set": set, "$setOnInsert": { "email": email, "role": "user" } },
        )
        .upsert(true)
        .await
        .map_err(AppError::database)?;

    Ok(UpdateOutcome::from_result(result))
}

/// Full profile fetch; `None` serializes to a null body when no row
/// exists.
pub async fn get_profile(db: &MongoDB, email: &str) -> Result<Option<UserResponse>, AppError> {
    let collection = db.collection::<User>(USERS);

    let user = collection
        .find_one(doc! { "email": email })
        .await
        .map_err(AppError::database)?;

    Ok(user.map(UserResponse::from))
}
