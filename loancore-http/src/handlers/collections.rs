use actix_web::{web, HttpResponse};
use loancore_api::RecordCollectionRequest;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListCollectionsQuery {
    pub loan_id: Uuid,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}
fn default_limit() -> u32 {
    20
}

/// `POST /collections`. The response bundles the collection, the loan as
/// it stands after allocation, and the allocation breakdown — the loan
/// read is a second round trip, not returned atomically with the write,
/// since `CollectionService::record_collection` only hands back the
/// collection itself.
pub async fn record_collection(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    body: web::Json<RecordCollectionRequest>,
) -> Result<HttpResponse, ApiError> {
    let loan_id = body.loan_id;
    let collection = state
        .collection_service
        .record_collection(actor.user_id, body.into_inner())
        .await?;
    let loan = state.loan_service.get_loan(actor.user_id, loan_id).await?;

    let allocation = serde_json::json!({
        "feePaid": collection.fee_allocation,
        "penaltyPaid": collection.penalty_allocation,
        "interestPaid": collection.interest_allocation,
        "principalPaid": collection.principal_allocation,
    });

    Ok(HttpResponse::Created().json(serde_json::json!({
        "collection": collection,
        "loan": loan,
        "allocation": allocation,
    })))
}

/// `GET /collections?loanId=&page=&limit=`. Agent/date filters beyond a
/// single loan are not something `CollectionService` exposes today; this
/// lists one loan's collections at a time, the same scope the service
/// layer supports.
pub async fn list_collections(
    state: web::Data<AppState>,
    actor: AuthenticatedUser,
    query: web::Query<ListCollectionsQuery>,
) -> Result<HttpResponse, ApiError> {
    let collections = state
        .collection_service
        .list_collections_for_loan(actor.user_id, query.loan_id, query.page, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(collections))
}
