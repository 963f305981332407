pub mod classifier;
pub mod decision_engine;
pub mod domain_scanner;
pub mod feed_sync;
pub mod rule_repository;

pub use classifier::{Classifier, Prediction};
pub use decision_engine::DecisionEnginePort;
pub use domain_scanner::DomainScanner;
pub use feed_sync::{BlocklistRefreshPort, FeedSyncPort};
pub use rule_repository::RuleRepository;
