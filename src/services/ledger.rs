use std::sync::Arc;

use uuid::Uuid;

use crate::auth::RedemptionCodeService;
use crate::errors::{AppError, Result};
use crate::models::{
    BalanceResponse, ChargeReceipt, DebitOutcome, RedeemOutcome, TransactionType,
};
use crate::repositories::{PointsRepository, UserRepository};

const BALANCE_TRANSACTIONS: i64 = 10;

/// Points balance operations. Every mutation goes through a single atomic
/// repository call, so concurrent requests can neither overspend nor
/// consume a code twice.
#[derive(Clone)]
pub struct PointsLedger {
    users: Arc<dyn UserRepository>,
    points: Arc<dyn PointsRepository>,
}

impl PointsLedger {
    pub fn new(users: Arc<dyn UserRepository>, points: Arc<dyn PointsRepository>) -> Self {
        Self { users, points }
    }

    pub async fn charge(&self, user_id: Uuid, amount: i32, description: &str) -> Result<ChargeReceipt> {
        if amount <= 0 {
            return Err(AppError::Validation("Charge amount must be positive".to_string()));
        }

        match self.points.debit(user_id, amount, description).await? {
            DebitOutcome::Debited { balance_after } => {
                tracing::info!(
                    "Charged {} points to user {} ({}), balance {}",
                    amount,
                    user_id,
                    description,
                    balance_after
                );
                Ok(ChargeReceipt {
                    user_id,
                    amount,
                    balance_after,
                    description: description.to_string(),
                })
            }
            DebitOutcome::Insufficient { balance } => Err(AppError::InsufficientPoints {
                required: amount,
                available: balance,
            }),
            DebitOutcome::UserNotFound => Err(AppError::NotFound("User")),
        }
    }

    /// Returns `(points credited, new balance)`.
    pub async fn redeem(&self, user_id: Uuid, raw_code: &str) -> Result<(i32, i32)> {
        let code = RedemptionCodeService::normalize(raw_code);
        if code.is_empty() {
            return Err(AppError::Validation("Redemption code is required".to_string()));
        }
        // A malformed code cannot exist, so it is answered like an unknown one.
        if !RedemptionCodeService::is_well_formed(&code) {
            return Err(AppError::NotFound("Redemption code"));
        }

        match self.points.redeem_code(user_id, &code).await? {
            RedeemOutcome::Redeemed { points, balance_after } => {
                tracing::info!(
                    "User {} redeemed code {} for {} points, balance {}",
                    user_id,
                    code,
                    points,
                    balance_after
                );
                Ok((points, balance_after))
            }
            RedeemOutcome::CodeNotFound => Err(AppError::NotFound("Redemption code")),
            RedeemOutcome::AlreadyUsed => Err(AppError::CodeAlreadyUsed),
            RedeemOutcome::UserNotFound => Err(AppError::NotFound("User")),
        }
    }

    /// Gives back a charge whose generation failed.
    pub async fn refund(&self, receipt: &ChargeReceipt) -> Result<i32> {
        let description = format!("退还: {}", receipt.description);
        let balance = self
            .points
            .credit(receipt.user_id, receipt.amount, TransactionType::Refund, &description)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        tracing::info!(
            "Refunded {} points to user {}, balance {}",
            receipt.amount,
            receipt.user_id,
            balance
        );
        Ok(balance)
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<BalanceResponse> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("User"))?;
        let transactions = self
            .points
            .recent_transactions(user_id, BALANCE_TRANSACTIONS)
            .await?;

        Ok(BalanceResponse {
            points: user.points,
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockPointsRepository, MockUserRepository};
    use mockall::predicate::*;
    use std::sync::Mutex;

    fn ledger(points: MockPointsRepository) -> PointsLedger {
        PointsLedger::new(Arc::new(MockUserRepository::new()), Arc::new(points))
    }

    /// Debit behaves like the conditional update: it only succeeds while
    /// the balance covers the amount.
    fn balance_backed_repo(start: i32) -> MockPointsRepository {
        let balance = Arc::new(Mutex::new(start));
        let mut repo = MockPointsRepository::new();
        repo.expect_debit().returning(move |_, amount, _| {
            let mut current = balance.lock().unwrap();
            if *current >= amount {
                *current -= amount;
                Ok(DebitOutcome::Debited { balance_after: *current })
            } else {
                Ok(DebitOutcome::Insufficient { balance: *current })
            }
        });
        repo
    }

    #[tokio::test]
    async fn test_second_charge_is_rejected_without_going_negative() {
        let user_id = Uuid::new_v4();
        let ledger = ledger(balance_backed_repo(20));

        let receipt = ledger.charge(user_id, 15, "户型分析").await.unwrap();
        assert_eq!(receipt.balance_after, 5);
        assert_eq!(receipt.amount, 15);

        let second = ledger.charge(user_id, 15, "户型分析").await;
        assert!(matches!(
            second,
            Err(AppError::InsufficientPoints { required: 15, available: 5 })
        ));
    }

    #[tokio::test]
    async fn test_charge_rejects_non_positive_amounts() {
        let mut repo = MockPointsRepository::new();
        repo.expect_debit().never();

        let result = ledger(repo).charge(Uuid::new_v4(), 0, "free").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_charge_unknown_user_is_not_found() {
        let mut repo = MockPointsRepository::new();
        repo.expect_debit()
            .returning(|_, _, _| Ok(DebitOutcome::UserNotFound));

        let result = ledger(repo).charge(Uuid::new_v4(), 6, "文案生成").await;
        assert!(matches!(result, Err(AppError::NotFound("User"))));
    }

    #[tokio::test]
    async fn test_redeem_normalizes_code_and_rejects_reuse() {
        let user_id = Uuid::new_v4();
        let used = Arc::new(Mutex::new(false));
        let mut repo = MockPointsRepository::new();
        repo.expect_redeem_code()
            .with(eq(user_id), eq("TEST1234ABCD5678"))
            .times(2)
            .returning(move |_, _| {
                let mut used = used.lock().unwrap();
                if *used {
                    Ok(RedeemOutcome::AlreadyUsed)
                } else {
                    *used = true;
                    Ok(RedeemOutcome::Redeemed { points: 50, balance_after: 50 })
                }
            });
        let ledger = ledger(repo);

        let (points, balance) = ledger.redeem(user_id, " test1234abcd5678 ").await.unwrap();
        assert_eq!((points, balance), (50, 50));

        let again = ledger.redeem(user_id, "TEST1234ABCD5678").await;
        assert!(matches!(again, Err(AppError::CodeAlreadyUsed)));
    }

    #[tokio::test]
    async fn test_redeem_treats_malformed_code_as_unknown_before_storage() {
        let mut repo = MockPointsRepository::new();
        repo.expect_redeem_code().never();
        let ledger = ledger(repo);

        assert!(matches!(
            ledger.redeem(Uuid::new_v4(), "   ").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ledger.redeem(Uuid::new_v4(), "SHORT").await,
            Err(AppError::NotFound("Redemption code"))
        ));
        assert!(matches!(
            ledger.redeem(Uuid::new_v4(), "ABCD-1234-EFGH-56").await,
            Err(AppError::NotFound("Redemption code"))
        ));
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let mut repo = MockPointsRepository::new();
        repo.expect_redeem_code()
            .returning(|_, _| Ok(RedeemOutcome::CodeNotFound));

        let result = ledger(repo).redeem(Uuid::new_v4(), "AAAAAAAAAAAAAAAA").await;
        assert!(matches!(result, Err(AppError::NotFound("Redemption code"))));
    }

    #[tokio::test]
    async fn test_refund_credits_a_refund_transaction() {
        let user_id = Uuid::new_v4();
        let mut repo = MockPointsRepository::new();
        repo.expect_credit()
            .withf(move |id, amount, kind, description| {
                *id == user_id
                    && *amount == 15
                    && *kind == TransactionType::Refund
                    && description.contains("户型分析")
            })
            .times(1)
            .returning(|_, _, _, _| Ok(Some(20)));

        let receipt = ChargeReceipt {
            user_id,
            amount: 15,
            balance_after: 5,
            description: "户型分析".to_string(),
        };
        assert_eq!(ledger(repo).refund(&receipt).await.unwrap(), 20);
    }
}
