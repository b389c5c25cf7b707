//! Storage seams. Handlers and services only see these traits; `Database`
//! implements them over Postgres and tests substitute their own stores.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{
    CodeStatusFilter, DebitOutcome, GenerationHistory, NewHistoryRecord, NewUser,
    PointTransaction, RedeemOutcome, RedemptionCode, TransactionType, User,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates the user with `bonus` points and records the matching
    /// `register` transaction atomically.
    async fn create_with_bonus(&self, new_user: &NewUser, bonus: i32) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn touch_login(&self, id: Uuid) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointsRepository: Send + Sync {
    /// Subtracts `amount` only if the balance covers it, appending a
    /// `consume` row in the same transaction.
    async fn debit(&self, user_id: Uuid, amount: i32, description: &str) -> Result<DebitOutcome>;

    /// Adds `amount` and appends a row of the given type. `None` when the
    /// user does not exist.
    async fn credit(
        &self,
        user_id: Uuid,
        amount: i32,
        transaction_type: TransactionType,
        description: &str,
    ) -> Result<Option<i32>>;

    /// Claims an unused code and credits its points in one transaction.
    async fn redeem_code(&self, user_id: Uuid, code: &str) -> Result<RedeemOutcome>;

    async fn recent_transactions(&self, user_id: Uuid, limit: i64) -> Result<Vec<PointTransaction>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionCodeRepository: Send + Sync {
    async fn insert_codes(&self, codes: &[String], points: i32) -> Result<Vec<RedemptionCode>>;
    async fn list_codes(&self, filter: CodeStatusFilter) -> Result<Vec<RedemptionCode>>;
    async fn delete_code(&self, id: Uuid) -> Result<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Inserts the record, then deletes the user's rows beyond the `keep`
    /// most recent. Fails with `NotFound` when the user does not exist.
    async fn insert_and_trim(&self, record: &NewHistoryRecord, keep: i64) -> Result<GenerationHistory>;
    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<GenerationHistory>>;
    /// Sets the rendering on the user's newest layout record. Returns
    /// whether a record was updated.
    async fn attach_birdview(&self, user_id: Uuid, image: &str) -> Result<bool>;
}

/// Connectivity probe backing the readiness endpoint.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<()>;
}
