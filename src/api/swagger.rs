use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ContestHub API",
        version = "1.0.0",
        description = "REST backend for the ContestHub contest-hosting platform.\n\n**Authentication:** protected endpoints require a JWT Bearer token from `POST /jwt` (1 hour expiry).\n\n**Roles:** `user` (participate), `creator` (publish and judge contests), `admin` (moderate users and contests).",
    ),
    paths(
        // Auth
        crate::api::auth::issue_jwt,

        // Health
        crate::api::health::health_check,

        // Users
        crate::api::users::register,
        crate::api::users::list_users,
        crate::api::users::best_creators,
        crate::api::users::set_role,
        crate::api::users::update_profile,

        // Contests
        crate::api::contests::create_contest,
        crate::api::contests::list_contests,
        crate::api::contests::popular_contests,
        crate::api::contests::update_contest,
        crate::api::contests::set_contest_status,
        crate::api::contests::pick_contest_winner,

        // Payments & submissions
        crate::api::payments::create_payment_intent,
        crate::api::payments::record_payment,
        crate::api::payments::my_payments,
        crate::api::payments::submit_task,
        crate::api::payments::mark_payment_winner,

        // Stats
        crate::api::stats::leaderboard,
        crate::api::stats::my_winning_stats,
        crate::api::stats::admin_stats,
    ),
    components(
        schemas(
            crate::api::auth::TokenRequest,
            crate::api::auth::TokenResponse,
            crate::api::health::HealthResponse,

            crate::models::Role,
            crate::models::RegisterUserRequest,
            crate::models::UpdateProfileRequest,
            crate::models::SetRoleRequest,
            crate::models::UserResponse,

            crate::models::ContestStatus,
            crate::models::CreateContestRequest,
            crate::models::UpdateContestRequest,
            crate::models::SetStatusRequest,
            crate::models::PickWinnerRequest,
            crate::models::ContestResponse,
            crate::models::ContestPage,

            crate::models::PaymentStatus,
            crate::models::RecordPaymentRequest,
            crate::models::SubmitTaskRequest,
            crate::models::CreatePaymentIntentRequest,
            crate::models::PaymentIntentResponse,
            crate::models::PaymentResponse,
            crate::models::EnrichedPayment,
            crate::models::LeaderboardEntry,
            crate::models::WinningStats,
            crate::models::AdminStats,
        )
    ),
    tags(
        (name = "Auth", description = "Token issuing. Claims are supplied by the client and signed with a 1 hour expiry."),
        (name = "Users", description = "Registration, profiles and role management."),
        (name = "Contests", description = "Contest publishing, public listing, moderation and judging."),
        (name = "Payments", description = "Stripe payment intents and paid contest entries."),
        (name = "Submissions", description = "Task submissions and winner marking."),
        (name = "Stats", description = "Leaderboard, personal stats and admin counters."),
        (name = "Health", description = "Liveness and health endpoints."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /jwt"))
                        .build(),
                ),
            );
        }
    }
}
