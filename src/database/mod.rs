use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{
    CodeStatusFilter, DebitOutcome, GenerationHistory, NewHistoryRecord, NewUser,
    PointTransaction, RedeemOutcome, RedemptionCode, TransactionType, User,
};
use crate::repositories::{
    HistoryRepository, PointsRepository, RedemptionCodeRepository, StoreHealth, UserRepository,
};

pub mod queries;

use queries::{HistoryQueries, PointsQueries, RedemptionQueries, UserQueries};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for Database {
    async fn create_with_bonus(&self, new_user: &NewUser, bonus: i32) -> Result<User> {
        UserQueries::create_with_bonus(&self.pool, new_user, bonus).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        UserQueries::find_by_email(&self.pool, email).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        UserQueries::find_by_id(&self.pool, id).await
    }

    async fn touch_login(&self, id: Uuid) -> Result<()> {
        UserQueries::touch_login(&self.pool, id).await
    }
}

#[async_trait]
impl PointsRepository for Database {
    async fn debit(&self, user_id: Uuid, amount: i32, description: &str) -> Result<DebitOutcome> {
        PointsQueries::debit(&self.pool, user_id, amount, description).await
    }

    async fn credit(
        &self,
        user_id: Uuid,
        amount: i32,
        transaction_type: TransactionType,
        description: &str,
    ) -> Result<Option<i32>> {
        PointsQueries::credit(&self.pool, user_id, amount, transaction_type, description).await
    }

    async fn redeem_code(&self, user_id: Uuid, code: &str) -> Result<RedeemOutcome> {
        PointsQueries::redeem_code(&self.pool, user_id, code).await
    }

    async fn recent_transactions(&self, user_id: Uuid, limit: i64) -> Result<Vec<PointTransaction>> {
        PointsQueries::recent_transactions(&self.pool, user_id, limit).await
    }
}

#[async_trait]
impl RedemptionCodeRepository for Database {
    async fn insert_codes(&self, codes: &[String], points: i32) -> Result<Vec<RedemptionCode>> {
        RedemptionQueries::insert_codes(&self.pool, codes, points).await
    }

    async fn list_codes(&self, filter: CodeStatusFilter) -> Result<Vec<RedemptionCode>> {
        RedemptionQueries::list_codes(&self.pool, filter).await
    }

    async fn delete_code(&self, id: Uuid) -> Result<bool> {
        RedemptionQueries::delete_code(&self.pool, id).await
    }
}

#[async_trait]
impl HistoryRepository for Database {
    async fn insert_and_trim(&self, record: &NewHistoryRecord, keep: i64) -> Result<GenerationHistory> {
        HistoryQueries::insert_and_trim(&self.pool, record, keep).await
    }

    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<GenerationHistory>> {
        HistoryQueries::recent(&self.pool, user_id, limit).await
    }

    async fn attach_birdview(&self, user_id: Uuid, image: &str) -> Result<bool> {
        HistoryQueries::attach_birdview(&self.pool, user_id, image).await
    }
}

#[async_trait]
impl StoreHealth for Database {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
