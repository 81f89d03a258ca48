mod api;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let mongodb_uri =
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let mongodb_database =
        env::var("MONGODB_DATABASE").unwrap_or_else(|_| "contestHubDB".to_string());
    let cors_origin = env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

    log::info!("Starting ContestHub service...");

    let db = database::MongoDB::new(&mongodb_uri, &mongodb_database)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db.clone());

    log::info!("MongoDB connected: {}", mongodb_database);
    log::info!("Server starting on {}:{}", host, port);
    log::info!("Swagger UI at http://{}:{}/swagger-ui/", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi),
            )
            // Liveness & health
            .route("/", web::get().to(api::health::liveness))
            .route("/health", web::get().to(api::health::health_check))
            // Token issuing
            .route("/jwt", web::post().to(api::auth::issue_jwt))
            // Users
            .route("/users", web::post().to(api::users::register))
            .route("/users", web::get().to(api::users::list_users))
            .route("/best-creators", web::get().to(api::users::best_creators))
            .route("/users/role/{email}", web::get().to(api::users::get_role))
            .route("/users/role/{id}", web::patch().to(api::users::set_role))
            .route("/users/{id}", web::delete().to(api::users::delete_user))
            .route("/users/{email}", web::put().to(api::users::update_profile))
            .route("/user-profile/{email}", web::get().to(api::users::get_profile))
            // Contests
            .route("/contests", web::post().to(api::contests::create_contest))
            .route("/contests", web::get().to(api::contests::list_contests))
            .route("/contests/popular", web::get().to(api::contests::popular_contests))
            .route("/contests/admin/all", web::get().to(api::contests::admin_all_contests))
            .route("/contests/creator/{email}", web::get().to(api::contests::creator_contests))
            .route("/contests/update/{id}", web::put().to(api::contests::update_contest))
            .route("/contests/status/{id}", web::patch().to(api::contests::set_contest_status))
            .route("/contests/winner/{id}", web::patch().to(api::contests::pick_contest_winner))
            .route("/contests/{id}", web::get().to(api::contests::get_contest))
            .route("/contests/{id}", web::delete().to(api::contests::delete_contest))
            // Payments
            .route("/create-payment-intent", web::post().to(api::payments::create_payment_intent))
            .route("/payments", web::post().to(api::payments::record_payment))
            .route("/payments", web::get().to(api::payments::my_payments))
            .route("/payments/user/{email}", web::get().to(api::payments::my_payments_by_path))
            .route("/payments/submit-task/{id}", web::patch().to(api::payments::submit_task))
            // Submissions & judging
            .route("/contest/submit/{id}", web::put().to(api::payments::submit_task))
            .route("/contest/submissions/{id}", web::get().to(api::payments::submissions_for_contest))
            .route("/submissions/creator/{email}", web::get().to(api::payments::submissions_for_creator))
            .route("/contest/winner/{id}", web::patch().to(api::payments::mark_payment_winner))
            // Leaderboard & stats
            .route("/leaderboard", web::get().to(api::stats::leaderboard))
            .route("/my-winning-stats/{email}", web::get().to(api::stats::my_winning_stats))
            .route("/admin-stats", web::get().to(api::stats::admin_stats))
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
