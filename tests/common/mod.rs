#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use listing_studio::{
    config::{AiConfig, ChatEndpoint, Config, GeminiEndpoint, PricingConfig},
    create_app,
    errors::{AppError, Result},
    handlers::AppState,
    models::{
        CodeStatusFilter, DebitOutcome, GenerationHistory, HistoryKind, NewHistoryRecord,
        NewUser, PointTransaction, RedeemOutcome, RedemptionCode, TransactionType, User,
    },
    repositories::{
        HistoryRepository, PointsRepository, RedemptionCodeRepository, StoreHealth,
        UserRepository,
    },
    services::{AiClients, RetryPolicy},
};

pub const JWT_SECRET: &str = "integration-test-secret";

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    transactions: Vec<PointTransaction>,
    codes: Vec<RedemptionCode>,
    history: Vec<GenerationHistory>,
}

/// Store with the same atomicity as the Postgres queries: every operation
/// holds one lock for its whole read-modify-write.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn points_of(&self, user_id: Uuid) -> Option<i32> {
        self.inner.lock().unwrap().users.get(&user_id).map(|u| u.points)
    }

    pub fn transactions_of(&self, user_id: Uuid) -> Vec<PointTransaction> {
        self.inner
            .lock()
            .unwrap()
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn history_of(&self, user_id: Uuid) -> Vec<GenerationHistory> {
        self.inner
            .lock()
            .unwrap()
            .history
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Inserts a user directly, bypassing registration.
    pub fn seed_user(&self, email: &str, points: i32, is_admin: bool) -> Uuid {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: String::new(),
            username: email.split('@').next().unwrap_or(email).to_string(),
            points,
            is_admin,
            created_at: now,
            updated_at: now,
        };
        let id = user.id;
        self.inner.lock().unwrap().users.insert(id, user);
        id
    }

    pub fn seed_code(&self, code: &str, points: i32) -> Uuid {
        let record = RedemptionCode {
            id: Uuid::new_v4(),
            code: code.to_string(),
            points,
            is_used: false,
            used_by: None,
            used_at: None,
            created_at: Utc::now(),
        };
        let id = record.id;
        self.inner.lock().unwrap().codes.push(record);
        id
    }

    pub fn seed_layout_history(&self, user_id: Uuid) -> Uuid {
        let record = GenerationHistory {
            id: Uuid::new_v4(),
            user_id,
            kind: HistoryKind::Layout.as_str().to_string(),
            input_images: vec!["https://img.example.com/plan.png".to_string()],
            property_info: None,
            listing_result: None,
            style_name: Some("奶油风".to_string()),
            scene_name: Some("独居青年".to_string()),
            layout_result: None,
            birdview_image: None,
            created_at: Utc::now(),
        };
        let id = record.id;
        self.inner.lock().unwrap().history.push(record);
        id
    }
}

fn push_transaction(
    inner: &mut Inner,
    user_id: Uuid,
    amount: i32,
    transaction_type: TransactionType,
    description: &str,
    balance_after: i32,
) {
    inner.transactions.push(PointTransaction {
        id: Uuid::new_v4(),
        user_id,
        amount,
        transaction_type: transaction_type.as_str().to_string(),
        description: description.to_string(),
        balance_after,
        created_at: Utc::now(),
    });
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_with_bonus(&self, new_user: &NewUser, bonus: i32) -> Result<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            username: new_user.username.clone(),
            points: bonus,
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        push_transaction(&mut inner, user.id, bonus, TransactionType::Register, "注册赠送", bonus);
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.lock().unwrap().users.get(&id).cloned())
    }

    async fn touch_login(&self, id: Uuid) -> Result<()> {
        if let Some(user) = self.inner.lock().unwrap().users.get_mut(&id) {
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl PointsRepository for InMemoryStore {
    async fn debit(&self, user_id: Uuid, amount: i32, description: &str) -> Result<DebitOutcome> {
        let mut inner = self.inner.lock().unwrap();
        let Some(user) = inner.users.get_mut(&user_id) else {
            return Ok(DebitOutcome::UserNotFound);
        };
        if user.points < amount {
            return Ok(DebitOutcome::Insufficient { balance: user.points });
        }
        user.points -= amount;
        let balance_after = user.points;
        push_transaction(
            &mut inner,
            user_id,
            -amount,
            TransactionType::Consume,
            description,
            balance_after,
        );
        Ok(DebitOutcome::Debited { balance_after })
    }

    async fn credit(
        &self,
        user_id: Uuid,
        amount: i32,
        transaction_type: TransactionType,
        description: &str,
    ) -> Result<Option<i32>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(user) = inner.users.get_mut(&user_id) else {
            return Ok(None);
        };
        user.points += amount;
        let balance_after = user.points;
        push_transaction(&mut inner, user_id, amount, transaction_type, description, balance_after);
        Ok(Some(balance_after))
    }

    async fn redeem_code(&self, user_id: Uuid, code: &str) -> Result<RedeemOutcome> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.users.contains_key(&user_id) {
            return Ok(RedeemOutcome::UserNotFound);
        }

        let Some(record) = inner.codes.iter_mut().find(|c| c.code == code) else {
            return Ok(RedeemOutcome::CodeNotFound);
        };
        if record.is_used {
            return Ok(RedeemOutcome::AlreadyUsed);
        }
        record.is_used = true;
        record.used_by = Some(user_id);
        record.used_at = Some(Utc::now());
        let points = record.points;

        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or(AppError::NotFound("User"))?;
        user.points += points;
        let balance_after = user.points;
        push_transaction(
            &mut inner,
            user_id,
            points,
            TransactionType::Redeem,
            &format!("兑换码充值 {code}"),
            balance_after,
        );
        Ok(RedeemOutcome::Redeemed { points, balance_after })
    }

    async fn recent_transactions(&self, user_id: Uuid, limit: i64) -> Result<Vec<PointTransaction>> {
        Ok(self
            .transactions_of(user_id)
            .into_iter()
            .rev()
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl RedemptionCodeRepository for InMemoryStore {
    async fn insert_codes(&self, codes: &[String], points: i32) -> Result<Vec<RedemptionCode>> {
        let created: Vec<RedemptionCode> = codes
            .iter()
            .map(|code| RedemptionCode {
                id: Uuid::new_v4(),
                code: code.clone(),
                points,
                is_used: false,
                used_by: None,
                used_at: None,
                created_at: Utc::now(),
            })
            .collect();
        self.inner.lock().unwrap().codes.extend(created.iter().cloned());
        Ok(created)
    }

    async fn list_codes(&self, filter: CodeStatusFilter) -> Result<Vec<RedemptionCode>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .codes
            .iter()
            .rev()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn delete_code(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.codes.len();
        inner.codes.retain(|c| c.id != id);
        Ok(inner.codes.len() < before)
    }
}

#[async_trait]
impl HistoryRepository for InMemoryStore {
    async fn insert_and_trim(&self, record: &NewHistoryRecord, keep: i64) -> Result<GenerationHistory> {
        let saved = GenerationHistory {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            kind: record.kind.as_str().to_string(),
            input_images: record.input_images.clone(),
            property_info: record.property_info.clone(),
            listing_result: record.listing_result.clone(),
            style_name: record.style_name.clone(),
            scene_name: record.scene_name.clone(),
            layout_result: record.layout_result.clone(),
            birdview_image: record.birdview_image.clone(),
            created_at: Utc::now(),
        };

        let mut inner = self.inner.lock().unwrap();
        if !inner.users.contains_key(&record.user_id) {
            return Err(AppError::NotFound("User"));
        }
        inner.history.push(saved.clone());

        let owned: Vec<Uuid> = inner
            .history
            .iter()
            .filter(|h| h.user_id == record.user_id)
            .map(|h| h.id)
            .collect();
        let excess = owned.len().saturating_sub(keep as usize);
        let stale: Vec<Uuid> = owned.into_iter().take(excess).collect();
        inner.history.retain(|h| !stale.contains(&h.id));

        Ok(saved)
    }

    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<GenerationHistory>> {
        Ok(self
            .history_of(user_id)
            .into_iter()
            .rev()
            .take(limit as usize)
            .collect())
    }

    async fn attach_birdview(&self, user_id: Uuid, image: &str) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let latest = inner
            .history
            .iter_mut()
            .rev()
            .find(|h| h.user_id == user_id && h.kind == HistoryKind::Layout.as_str());
        match latest {
            Some(record) => {
                record.birdview_image = Some(image.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Configuration pointing every AI provider at `ai_base_url` (usually a
/// wiremock server). `None` leaves the providers unconfigured.
pub fn test_config(ai_base_url: Option<&str>) -> Config {
    let key = ai_base_url.map(|_| "test-key".to_string());
    Config {
        database_url: "postgresql://localhost/unused".to_string(),
        port: 0,
        jwt_secret: JWT_SECRET.to_string(),
        max_body_bytes: 2 * 1024 * 1024,
        pricing: PricingConfig {
            registration_bonus: 30,
            listing_cost_per_platform: 2,
            layout_cost: 15,
        },
        history_limit: 5,
        refund_on_failure: false,
        ai: AiConfig {
            vision: ChatEndpoint {
                url: ai_base_url.map(|base| format!("{base}/vision/chat/completions")),
                api_key: key.clone(),
                model: "glm-4.6v".to_string(),
            },
            chat: ChatEndpoint {
                url: ai_base_url.map(|base| format!("{base}/chat/completions")),
                api_key: key.clone(),
                model: "deepseek-chat".to_string(),
            },
            gemini: GeminiEndpoint {
                base_url: ai_base_url.unwrap_or("http://127.0.0.1:9").to_string(),
                api_key: key,
                analysis_model: "gemini-2.5-flash-image".to_string(),
                image_model: "gemini-2.5-flash-image".to_string(),
            },
            timeout: Duration::from_secs(5),
            render_retry: RetryPolicy::fixed(3, Duration::ZERO),
        },
    }
}

pub fn app_with(store: Arc<InMemoryStore>, config: Config) -> Router {
    let ai = AiClients::from_config(&config.ai).expect("http client");
    create_app(AppState::new(config, store, ai))
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}
