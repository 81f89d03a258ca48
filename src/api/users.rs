use crate::{
    database::MongoDB,
    models::{RegisterUserRequest, Role, SetRoleRequest, UpdateProfileRequest, UserResponse},
    services::{
        guard_service::{self, Policy},
        user_service,
    },
    utils::error::AppError,
};
use actix_web::{web, HttpRequest, HttpResponse};

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "User inserted, or no-op sentinel when the email already exists")
    )
)]
pub async fn register(
    db: web::Data<MongoDB>,
    request: web::Json<RegisterUserRequest>,
) -> HttpResponse {
    log::info!("POST /users - email: {}", request.email);

    match user_service::register_or_noop(&db, &request).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(db: web::Data<MongoDB>, req: HttpRequest) -> HttpResponse {
    log::info!("GET /users");

    if let Err(e) = guard_service::guard(&db, &req, &Policy::admin_only()).await {
        return e.error_response();
    }

    match user_service::list_users(&db).await {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/best-creators",
    tag = "Users",
    responses(
        (status = 200, description = "Up to 6 creators", body = [UserResponse])
    )
)]
pub async fn best_creators(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("GET /best-creators");

    match user_service::best_creators(&db).await {
        Ok(creators) => HttpResponse::Ok().json(creators),
        Err(e) => e.error_response(),
    }
}

pub async fn get_role(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();
    log::info!("GET /users/role/{}", email);

    if let Err(e) = guard_service::guard(&db, &req, &Policy::self_only(&email)).await {
        return e.error_response();
    }

    match user_service::get_role(&db, &email).await {
        Ok(role) => HttpResponse::Ok().json(serde_json::json!({ "role": role })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/users/role/{id}",
    tag = "Users",
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role updated"),
        (status = 400, description = "Unknown role string"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_role(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<SetRoleRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("PATCH /users/role/{} - role: {}", id, request.role);

    if let Err(e) = guard_service::guard(&db, &req, &Policy::admin_only()).await {
        return e.error_response();
    }

    let role: Role = match request.role.parse() {
        Ok(r) => r,
        Err(msg) => return AppError::InvalidRequest(msg).error_response(),
    };

    match user_service::set_role(&db, &id, role).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}

pub async fn delete_user(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("DELETE /users/{}", id);

    if let Err(e) = guard_service::guard(&db, &req, &Policy::admin_only()).await {
        return e.error_response();
    }

    match user_service::delete_user(&db, &id).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    put,
    path = "/users/{email}",
    tag = "Users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile upserted"),
        (status = 403, description = "Path email differs from token email")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<UpdateProfileRequest>,
) -> HttpResponse {
    let email = path.into_inner();
    log::info!("PUT /users/{}", email);

    if let Err(e) = guard_service::guard(&db, &req, &Policy::self_only(&email)).await {
        return e.error_response();
    }

    match user_service::update_profile(&db, &email, &request).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}

pub async fn get_profile(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();
    log::info!("GET /user-profile/{}", email);

    if let Err(e) = guard_service::guard(&db, &req, &Policy::self_only(&email)).await {
        return e.error_response();
    }

    match user_service::get_profile(&db, &email).await {
        // null body when no row exists
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => e.error_response(),
    }
}
