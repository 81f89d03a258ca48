use crate::{
    database::MongoDB,
    models::{AdminStats, LeaderboardEntry, WinningStats},
    services::{
        guard_service::{self, Policy},
        stats_service,
    },
};
use actix_web::{web, HttpRequest, HttpResponse};

#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "Stats",
    responses(
        (status = 200, description = "Top winners by win count, capped at 10", body = [LeaderboardEntry])
    )
)]
pub async fn leaderboard(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("GET /leaderboard");

    match stats_service::leaderboard(&db).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/my-winning-stats/{email}",
    tag = "Stats",
    responses(
        (status = 200, description = "Entry and win counts", body = WinningStats),
        (status = 403, description = "Path email differs from token email")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_winning_stats(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();
    log::info!("GET /my-winning-stats/{}", email);

    if let Err(e) = guard_service::guard(&db, &req, &Policy::self_only(&email)).await {
        return e.error_response();
    }

    match stats_service::winning_stats(&db, &email).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/admin-stats",
    tag = "Stats",
    responses(
        (status = 200, description = "Platform counters and revenue", body = AdminStats),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_stats(db: web::Data<MongoDB>, req: HttpRequest) -> HttpResponse {
    log::info!("GET /admin-stats");

    if let Err(e) = guard_service::guard(&db, &req, &Policy::admin_only()).await {
        return e.error_response();
    }

    match stats_service::admin_stats(&db).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => e.error_response(),
    }
}
