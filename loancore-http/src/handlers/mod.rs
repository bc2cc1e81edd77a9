pub mod auth;
pub mod capital;
pub mod collections;
pub mod customers;
pub(crate) mod dto;
pub mod loans;

use actix_web::{web, HttpResponse};

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Registers every HTTP route the core exposes, plus an unauthenticated
/// `/health` liveness probe.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/auth/login", web::post().to(auth::login))
        .route("/auth/me", web::get().to(auth::me))
        .route("/auth/refresh", web::post().to(auth::refresh))
        .route("/loans", web::post().to(loans::create_loan))
        .route("/loans", web::get().to(loans::list_loans))
        .route("/loans/topup", web::post().to(loans::top_up))
        .route("/loans/{id}", web::get().to(loans::get_loan))
        .route("/loans/{id}", web::patch().to(loans::patch_loan))
        .route("/collections", web::post().to(collections::record_collection))
        .route("/collections", web::get().to(collections::list_collections))
        .route("/customers", web::post().to(customers::create_customer))
        .route("/customers", web::get().to(customers::list_customers))
        .route("/customers/{id}", web::get().to(customers::get_customer))
        .route("/customers/{id}", web::delete().to(customers::delete_customer))
        .route("/investments", web::post().to(capital::create_investment))
        .route("/investments", web::get().to(capital::list_investments))
        .route("/borrowings", web::post().to(capital::create_borrowing))
        .route("/borrowings", web::get().to(capital::list_borrowings))
        .route("/analytics", web::get().to(capital::analytics));
}
