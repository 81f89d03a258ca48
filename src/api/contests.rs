use crate::{
    database::MongoDB,
    models::{
        ContestPage, ContestResponse, CreateContestRequest, PickWinnerRequest, SetStatusRequest,
        UpdateContestRequest,
    },
    services::{
        contest_service::{self, DEFAULT_PAGE_SIZE},
        guard_service::{self, Policy},
        payment_service,
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ContestListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub contest_type: Option<String>,
}

#[utoipa::path(
    post,
    path = "/contests",
    tag = "Contests",
    request_body = CreateContestRequest,
    responses(
        (status = 201, description = "Contest created with status pending"),
        (status = 403, description = "Caller is not a creator or admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_contest(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    request: web::Json<CreateContestRequest>,
) -> HttpResponse {
    log::info!("POST /contests - name: {}", request.contest_name);

    let (claims, _) = match guard_service::guard(&db, &req, &Policy::creator_or_admin()).await {
        Ok(v) => v,
        Err(e) => return e.error_response(),
    };

    match contest_service::create_contest(&db, &claims.email, &request).await {
        Ok(outcome) => HttpResponse::Created().json(outcome),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/contests",
    tag = "Contests",
    params(
        ("page" = Option<i64>, Query, description = "Zero-based page index"),
        ("size" = Option<i64>, Query, description = "Page size, default 10"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring match on contest type"),
        ("type" = Option<String>, Query, description = "Exact contest type; 'All' disables the filter"),
    ),
    responses(
        (status = 200, description = "Accepted contests, paginated", body = ContestPage)
    )
)]
pub async fn list_contests(
    db: web::Data<MongoDB>,
    query: web::Query<ContestListQuery>,
) -> HttpResponse {
    let page = query.page.unwrap_or(0).max(0);
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    log::info!("GET /contests - page: {}, size: {}", page, size);

    match contest_service::list_public(
        &db,
        page,
        size,
        query.search.as_deref(),
        query.contest_type.as_deref(),
    )
    .await
    {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/contests/popular",
    tag = "Contests",
    responses(
        (status = 200, description = "Top 6 accepted contests by participation", body = [ContestResponse])
    )
)]
pub async fn popular_contests(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("GET /contests/popular");

    match contest_service::popular(&db).await {
        Ok(contests) => HttpResponse::Ok().json(contests),
        Err(e) => e.error_response(),
    }
}

pub async fn get_contest(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    log::info!("GET /contests/{}", id);

    match contest_service::get_contest(&db, &id).await {
        // null body when no row exists
        Ok(contest) => HttpResponse::Ok().json(contest),
        Err(e) => e.error_response(),
    }
}

pub async fn creator_contests(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();
    log::info!("GET /contests/creator/{}", email);

    if let Err(e) = guard_service::guard(&db, &req, &Policy::creator_self(&email)).await {
        return e.error_response();
    }

    match contest_service::creator_contests(&db, &email).await {
        Ok(contests) => HttpResponse::Ok().json(contests),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    put,
    path = "/contests/update/{id}",
    tag = "Contests",
    request_body = UpdateContestRequest,
    responses(
        (status = 200, description = "Editable fields replaced"),
        (status = 403, description = "Contest belongs to another creator"),
        (status = 404, description = "No such contest")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_contest(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<UpdateContestRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("PUT /contests/update/{}", id);

    let (claims, role) = match guard_service::guard(&db, &req, &Policy::creator_or_admin()).await {
        Ok(v) => v,
        Err(e) => return e.error_response(),
    };

    match contest_service::update_contest(&db, &id, &claims.email, role, &request).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}

pub async fn delete_contest(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("DELETE /contests/{}", id);

    let (claims, role) = match guard_service::guard(&db, &req, &Policy::creator_or_admin()).await {
        Ok(v) => v,
        Err(e) => return e.error_response(),
    };

    match contest_service::delete_contest(&db, &id, &claims.email, role).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}

pub async fn admin_all_contests(db: web::Data<MongoDB>, req: HttpRequest) -> HttpResponse {
    log::info!("GET /contests/admin/all");

    if let Err(e) = guard_service::guard(&db, &req, &Policy::admin_only()).await {
        return e.error_response();
    }

    match contest_service::list_all(&db).await {
        Ok(contests) => HttpResponse::Ok().json(contests),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/contests/status/{id}",
    tag = "Contests",
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status transitioned"),
        (status = 400, description = "Unknown status or illegal transition"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such contest")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_contest_status(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<SetStatusRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("PATCH /contests/status/{} - status: {}", id, request.status);

    if let Err(e) = guard_service::guard(&db, &req, &Policy::admin_only()).await {
        return e.error_response();
    }

    match contest_service::set_status(&db, &id, &request.status).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/contests/winner/{id}",
    tag = "Contests",
    request_body = PickWinnerRequest,
    responses(
        (status = 200, description = "Winner fields set and payment row flagged, atomically"),
        (status = 400, description = "Contest already judged"),
        (status = 404, description = "No submitted entry for that email")
    ),
    security(("bearer_auth" = []))
)]
pub async fn pick_contest_winner(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<PickWinnerRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!(
        "PATCH /contests/winner/{} - winner: {}",
        id,
        request.winner_email
    );

    let (claims, role) = match guard_service::guard(&db, &req, &Policy::creator_or_admin()).await {
        Ok(v) => v,
        Err(e) => return e.error_response(),
    };

    match payment_service::pick_winner_for_contest(
        &db,
        &id,
        &request.winner_email,
        &claims.email,
        role,
    )
    .await
    {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}
