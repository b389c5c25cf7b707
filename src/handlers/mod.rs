use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::Config,
    errors::{AppError, Result},
    models::ChargeReceipt,
    repositories::{
        HistoryRepository, PointsRepository, RedemptionCodeRepository, StoreHealth,
        UserRepository,
    },
    services::{AiClients, HistoryStore, PointsLedger},
};

pub mod admin;
pub mod analyze;
pub mod auth;
pub mod generate;
pub mod health;
pub mod history;
pub mod points;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserRepository>,
    pub codes: Arc<dyn RedemptionCodeRepository>,
    pub store_health: Arc<dyn StoreHealth>,
    pub ledger: PointsLedger,
    pub history: HistoryStore,
    pub ai: AiClients,
}

impl AppState {
    /// Wires every storage seam to the same backing store.
    pub fn new<S>(config: Config, store: Arc<S>, ai: AiClients) -> Self
    where
        S: UserRepository
            + PointsRepository
            + RedemptionCodeRepository
            + HistoryRepository
            + StoreHealth
            + 'static,
    {
        let users: Arc<dyn UserRepository> = store.clone();
        let points: Arc<dyn PointsRepository> = store.clone();
        let history: Arc<dyn HistoryRepository> = store.clone();

        Self {
            ledger: PointsLedger::new(users.clone(), points),
            history: HistoryStore::new(history, config.history_limit),
            codes: store.clone(),
            store_health: store,
            users,
            ai,
            config,
        }
    }
}

/// User-facing endpoints identify the caller by the `userId` they send.
pub(crate) fn require_user(user_id: Option<Uuid>) -> Result<Uuid> {
    user_id.ok_or_else(|| AppError::Auth("Login required".to_string()))
}

/// Runs a paid generation step; when refunds are enabled a failure gives
/// the charge back before the error is returned.
pub(crate) async fn refund_on_error<T>(
    state: &AppState,
    receipt: &ChargeReceipt,
    result: Result<T>,
) -> Result<T> {
    if let Err(ref e) = result {
        if state.config.refund_on_failure {
            if let Err(refund_error) = state.ledger.refund(receipt).await {
                tracing::error!(
                    "Refund of {} points to user {} failed: {}",
                    receipt.amount,
                    receipt.user_id,
                    refund_error
                );
            }
        } else {
            tracing::warn!(
                "Generation for user {} failed after charging {} points: {}",
                receipt.user_id,
                receipt.amount,
                e
            );
        }
    }
    result
}
