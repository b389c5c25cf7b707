use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::*;

const USER_COLUMNS: &str =
    "id, email, password_hash, username, points, is_admin, created_at, updated_at";
const TRANSACTION_COLUMNS: &str =
    "id, user_id, amount, type, description, balance_after, created_at";
const CODE_COLUMNS: &str = "id, code, points, is_used, used_by, used_at, created_at";
const HISTORY_COLUMNS: &str = "id, user_id, type, input_images, property_info, listing_result, \
     style_name, scene_name, layout_result, birdview_image, created_at";

pub struct UserQueries;

impl UserQueries {
    pub async fn create_with_bonus(pool: &PgPool, new_user: &NewUser, bonus: i32) -> Result<User> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, username, points)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.username)
        .bind(bonus)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("Email is already registered".to_string())
            }
            other => AppError::Database(other),
        })?;

        PointsQueries::insert_transaction(
            &mut tx,
            user.id,
            bonus,
            TransactionType::Register,
            "注册赠送",
            user.points,
        )
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn touch_login(pool: &PgPool, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

pub struct PointsQueries;

impl PointsQueries {
    pub async fn debit(
        pool: &PgPool,
        user_id: Uuid,
        amount: i32,
        description: &str,
    ) -> Result<DebitOutcome> {
        let mut tx = pool.begin().await?;

        // The WHERE clause is the balance check; the row lock it takes
        // serializes concurrent debits for the same user.
        let balance_after: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET points = points - $2, updated_at = NOW()
            WHERE id = $1 AND points >= $2
            RETURNING points
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(balance_after) = balance_after else {
            let balance: Option<i32> = sqlx::query_scalar("SELECT points FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;

            return Ok(match balance {
                Some(balance) => DebitOutcome::Insufficient { balance },
                None => DebitOutcome::UserNotFound,
            });
        };

        Self::insert_transaction(
            &mut tx,
            user_id,
            -amount,
            TransactionType::Consume,
            description,
            balance_after,
        )
        .await?;

        tx.commit().await?;
        Ok(DebitOutcome::Debited { balance_after })
    }

    pub async fn credit(
        pool: &PgPool,
        user_id: Uuid,
        amount: i32,
        transaction_type: TransactionType,
        description: &str,
    ) -> Result<Option<i32>> {
        let mut tx = pool.begin().await?;

        let balance_after: Option<i32> = sqlx::query_scalar(
            "UPDATE users SET points = points + $2, updated_at = NOW() WHERE id = $1 RETURNING points",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(balance_after) = balance_after else {
            tx.rollback().await?;
            return Ok(None);
        };

        Self::insert_transaction(&mut tx, user_id, amount, transaction_type, description, balance_after)
            .await?;

        tx.commit().await?;
        Ok(Some(balance_after))
    }

    pub async fn redeem_code(pool: &PgPool, user_id: Uuid, code: &str) -> Result<RedeemOutcome> {
        let mut tx = pool.begin().await?;

        let user_exists: Option<i32> =
            sqlx::query_scalar("SELECT points FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if user_exists.is_none() {
            tx.rollback().await?;
            return Ok(RedeemOutcome::UserNotFound);
        }

        // Only one claimant can flip is_used; everyone else sees no row.
        let points: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE redemption_codes
            SET is_used = TRUE, used_by = $2, used_at = NOW()
            WHERE code = $1 AND is_used = FALSE
            RETURNING points
            "#,
        )
        .bind(code)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(points) = points else {
            let existing: Option<bool> =
                sqlx::query_scalar("SELECT is_used FROM redemption_codes WHERE code = $1")
                    .bind(code)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Ok(match existing {
                Some(_) => RedeemOutcome::AlreadyUsed,
                None => RedeemOutcome::CodeNotFound,
            });
        };

        let balance_after: i32 = sqlx::query_scalar(
            "UPDATE users SET points = points + $2, updated_at = NOW() WHERE id = $1 RETURNING points",
        )
        .bind(user_id)
        .bind(points)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_transaction(
            &mut tx,
            user_id,
            points,
            TransactionType::Redeem,
            &format!("兑换码充值 {code}"),
            balance_after,
        )
        .await?;

        tx.commit().await?;
        Ok(RedeemOutcome::Redeemed { points, balance_after })
    }

    pub async fn recent_transactions(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PointTransaction>> {
        let transactions = sqlx::query_as::<_, PointTransaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM point_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(transactions)
    }

    async fn insert_transaction(
        conn: &mut PgConnection,
        user_id: Uuid,
        amount: i32,
        transaction_type: TransactionType,
        description: &str,
        balance_after: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO point_transactions (user_id, amount, type, description, balance_after)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(transaction_type.as_str())
        .bind(description)
        .bind(balance_after)
        .execute(conn)
        .await?;

        Ok(())
    }
}

pub struct RedemptionQueries;

impl RedemptionQueries {
    pub async fn insert_codes(pool: &PgPool, codes: &[String], points: i32) -> Result<Vec<RedemptionCode>> {
        let inserted = sqlx::query_as::<_, RedemptionCode>(&format!(
            r#"
            INSERT INTO redemption_codes (code, points)
            SELECT code, $2 FROM UNNEST($1::text[]) AS code
            RETURNING {CODE_COLUMNS}
            "#
        ))
        .bind(codes)
        .bind(points)
        .fetch_all(pool)
        .await?;

        Ok(inserted)
    }

    pub async fn list_codes(pool: &PgPool, filter: CodeStatusFilter) -> Result<Vec<RedemptionCode>> {
        let used: Option<bool> = match filter {
            CodeStatusFilter::All => None,
            CodeStatusFilter::Unused => Some(false),
            CodeStatusFilter::Used => Some(true),
        };

        let codes = sqlx::query_as::<_, RedemptionCode>(&format!(
            r#"
            SELECT {CODE_COLUMNS}
            FROM redemption_codes
            WHERE $1::boolean IS NULL OR is_used = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(used)
        .fetch_all(pool)
        .await?;

        Ok(codes)
    }

    pub async fn delete_code(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM redemption_codes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct HistoryQueries;

impl HistoryQueries {
    pub async fn insert_and_trim(
        pool: &PgPool,
        record: &NewHistoryRecord,
        keep: i64,
    ) -> Result<GenerationHistory> {
        let mut tx = pool.begin().await?;

        // The user row lock serializes concurrent inserts so the trim sees every row.
        let locked: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = $1 FOR UPDATE")
            .bind(record.user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Err(AppError::NotFound("User"));
        }

        let inserted = sqlx::query_as::<_, GenerationHistory>(&format!(
            r#"
            INSERT INTO generation_history
                (user_id, type, input_images, property_info, listing_result,
                 style_name, scene_name, layout_result, birdview_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {HISTORY_COLUMNS}
            "#
        ))
        .bind(record.user_id)
        .bind(record.kind.as_str())
        .bind(&record.input_images)
        .bind(&record.property_info)
        .bind(&record.listing_result)
        .bind(&record.style_name)
        .bind(&record.scene_name)
        .bind(&record.layout_result)
        .bind(&record.birdview_image)
        .fetch_one(&mut *tx)
        .await?;

        let pruned = sqlx::query(
            r#"
            DELETE FROM generation_history
            WHERE user_id = $1
              AND id NOT IN (
                  SELECT id FROM generation_history
                  WHERE user_id = $1
                  ORDER BY created_at DESC, id DESC
                  LIMIT $2
              )
            "#,
        )
        .bind(record.user_id)
        .bind(keep)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if pruned.rows_affected() > 0 {
            tracing::debug!(
                "Pruned {} history rows for user {}",
                pruned.rows_affected(),
                record.user_id
            );
        }

        Ok(inserted)
    }

    pub async fn recent(pool: &PgPool, user_id: Uuid, limit: i64) -> Result<Vec<GenerationHistory>> {
        let rows = sqlx::query_as::<_, GenerationHistory>(&format!(
            r#"
            SELECT {HISTORY_COLUMNS}
            FROM generation_history
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    pub async fn attach_birdview(pool: &PgPool, user_id: Uuid, image: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE generation_history
            SET birdview_image = $2
            WHERE id = (
                SELECT id FROM generation_history
                WHERE user_id = $1 AND type = 'layout'
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            )
            "#,
        )
        .bind(user_id)
        .bind(image)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
