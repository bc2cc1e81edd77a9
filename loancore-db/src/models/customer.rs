use chrono::{DateTime, NaiveDate, Utc};
use heapless::String as HeaplessString;
use loancore_api::KycStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage shape of `Customer`: a `role == Customer` user plus KYC fields,
/// keyed 1-to-1 on `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerModel {
    pub user_id: Uuid,
    pub kyc_status: KycStatus,
    pub date_of_birth: NaiveDate,
    pub id_proof: HeaplessString<100>,
    pub created_at: DateTime<Utc>,
}
