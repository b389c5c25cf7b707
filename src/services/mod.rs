pub mod ai;
pub mod history;
pub mod ledger;
pub mod parsing;
pub mod prompts;
pub mod retry;

pub use ai::AiClients;
pub use history::HistoryStore;
pub use ledger::PointsLedger;
pub use retry::{Backoff, RetryPolicy};
