use crate::{
    database::MongoDB,
    models::{
        CreatePaymentIntentRequest, EnrichedPayment, PaymentIntentResponse, RecordPaymentRequest,
        SubmitTaskRequest,
    },
    services::{
        guard_service::{self, Policy},
        payment_service, stripe_service, token_service,
    },
    utils::error::AppError,
};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

#[utoipa::path(
    post,
    path = "/create-payment-intent",
    tag = "Payments",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Gateway client secret", body = PaymentIntentResponse),
        (status = 502, description = "Gateway failure")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_payment_intent(
    req: HttpRequest,
    request: web::Json<CreatePaymentIntentRequest>,
) -> HttpResponse {
    log::info!("POST /create-payment-intent - price: {}", request.price);

    if let Err(e) = token_service::authenticate(&req) {
        return e.error_response();
    }

    match stripe_service::create_payment_intent(request.price).await {
        Ok(intent) => HttpResponse::Ok().json(intent),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    post,
    path = "/payments",
    tag = "Payments",
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Entry recorded and participation counter bumped, atomically"),
        (status = 404, description = "No such contest")
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_payment(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    request: web::Json<RecordPaymentRequest>,
) -> HttpResponse {
    log::info!("POST /payments - contest: {}", request.contest_id);

    let claims = match token_service::authenticate(&req) {
        Ok(c) => c,
        Err(e) => return e.error_response(),
    };

    match payment_service::record_payment(&db, &claims.email, &request).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct MyPaymentsQuery {
    pub email: Option<String>,
}

#[utoipa::path(
    get,
    path = "/payments",
    tag = "Payments",
    params(
        ("email" = Option<String>, Query, description = "Must equal the token email when present"),
    ),
    responses(
        (status = 200, description = "Caller's payments joined with contest display fields", body = [EnrichedPayment]),
        (status = 403, description = "Query email differs from token email")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_payments(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    query: web::Query<MyPaymentsQuery>,
) -> HttpResponse {
    log::info!("GET /payments");

    let claims = match token_service::authenticate(&req) {
        Ok(c) => c,
        Err(e) => return e.error_response(),
    };

    let email = query.email.clone().unwrap_or_else(|| claims.email.clone());
    if email != claims.email {
        return AppError::Forbidden("forbidden access".to_string()).error_response();
    }

    match payment_service::my_payments(&db, &email).await {
        Ok(payments) => HttpResponse::Ok().json(payments),
        Err(e) => e.error_response(),
    }
}

/// Path variant of the self-payments listing.
pub async fn my_payments_by_path(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();
    log::info!("GET /payments/user/{}", email);

    if let Err(e) = guard_service::guard(&db, &req, &Policy::self_only(&email)).await {
        return e.error_response();
    }

    match payment_service::my_payments(&db, &email).await {
        Ok(payments) => HttpResponse::Ok().json(payments),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    put,
    path = "/contest/submit/{id}",
    tag = "Submissions",
    request_body = SubmitTaskRequest,
    responses(
        (status = 200, description = "Submission stored, entry marked submitted"),
        (status = 403, description = "Entry belongs to another participant"),
        (status = 404, description = "No such payment")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_task(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<SubmitTaskRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    // registered on two routes; log whichever one was hit
    log::info!("{}", request_line(&req));

    let claims = match token_service::authenticate(&req) {
        Ok(c) => c,
        Err(e) => return e.error_response(),
    };

    match payment_service::submit_task(&db, &id, &claims.email, &request).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}

pub async fn submissions_for_contest(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("GET /contest/submissions/{}", id);

    let (claims, role) = match guard_service::guard(&db, &req, &Policy::creator_or_admin()).await {
        Ok(v) => v,
        Err(e) => return e.error_response(),
    };

    match payment_service::submissions_for_contest(&db, &id, &claims.email, role).await {
        Ok(submissions) => HttpResponse::Ok().json(submissions),
        Err(e) => e.error_response(),
    }
}

pub async fn submissions_for_creator(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();
    log::info!("GET /submissions/creator/{}", email);

    if let Err(e) = guard_service::guard(&db, &req, &Policy::creator_self(&email)).await {
        return e.error_response();
    }

    match payment_service::submissions_for_creator(&db, &email).await {
        Ok(submissions) => HttpResponse::Ok().json(submissions),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/contest/winner/{id}",
    tag = "Submissions",
    responses(
        (status = 200, description = "Payment flagged winner and contest winner fields set, atomically"),
        (status = 400, description = "Contest already judged or entry not submitted"),
        (status = 403, description = "Contest belongs to another creator"),
        (status = 404, description = "No such payment")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_payment_winner(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("PATCH /contest/winner/{}", id);

    let (claims, role) = match guard_service::guard(&db, &req, &Policy::creator_or_admin()).await {
        Ok(v) => v,
        Err(e) => return e.error_response(),
    };

    match payment_service::mark_winner_by_payment(&db, &id, &claims.email, role).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => e.error_response(),
    }
}

fn request_line(req: &HttpRequest) -> String {
    format!("{} {}", req.method(), req.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_request_line_reflects_route() {
        let put = TestRequest::put()
            .uri("/contest/submit/65a1f0c2d4e5f6a7b8c9d0e1")
            .to_http_request();
        assert_eq!(
            request_line(&put),
            "PUT /contest/submit/65a1f0c2d4e5f6a7b8c9d0e1"
        );

        let patch = TestRequest::patch()
            .uri("/payments/submit-task/65a1f0c2d4e5f6a7b8c9d0e1")
            .to_http_request();
        assert_eq!(
            request_line(&patch),
            "PATCH /payments/submit-task/65a1f0c2d4e5f6a7b8c9d0e1"
        );
    }
}
