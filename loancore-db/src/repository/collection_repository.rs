use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::Database;
use uuid::Uuid;

use crate::models::collection::{CollectionModel, LateFeeModel, PenaltyModel};

#[async_trait]
pub trait CollectionRepository<DB: Database>: Send + Sync {
    async fn create(&self, collection: &CollectionModel) -> Result<CollectionModel, sqlx::Error>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CollectionModel>, sqlx::Error>;
    async fn find_by_receipt_number(
        &self,
        receipt_number: &str,
    ) -> Result<Option<CollectionModel>, sqlx::Error>;
    async fn list_for_loan(&self, loan_id: Uuid) -> Result<Vec<CollectionModel>, sqlx::Error>;

    async fn create_late_fee(&self, fee: &LateFeeModel) -> Result<LateFeeModel, sqlx::Error>;
    async fn find_unpaid_late_fees(&self, loan_id: Uuid) -> Result<Vec<LateFeeModel>, sqlx::Error>;
    /// Adds `amount` to the fee's accumulated `paid_amount` and flips `paid`
    /// once the total reaches the fee's full `amount`, so a fee settled
    /// across two or more partial collections converges instead of
    /// re-presenting its full amount on every subsequent collection.
    async fn apply_late_fee_payment(&self, id: Uuid, amount: Decimal) -> Result<(), sqlx::Error>;

    async fn create_penalty(&self, penalty: &PenaltyModel) -> Result<PenaltyModel, sqlx::Error>;
    async fn find_unpaid_penalties(&self, loan_id: Uuid) -> Result<Vec<PenaltyModel>, sqlx::Error>;
    /// Same accumulation semantics as [`Self::apply_late_fee_payment`].
    async fn apply_penalty_payment(&self, id: Uuid, amount: Decimal) -> Result<(), sqlx::Error>;

    async fn has_unpaid_dues(&self, loan_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Overdue schedule rows as of `as_of`, used by the late-fee/penalty
    /// application pass. Lives here rather than on `ScheduleRepository`
    /// because it is read exclusively by collection-side processing.
    async fn find_overdue_loan_ids(&self, as_of: NaiveDate) -> Result<Vec<Uuid>, sqlx::Error>;
}
