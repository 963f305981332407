use async_trait::async_trait;
use netguard_domain::DomainError;

/// Joint verdict of the two content classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub is_malware: bool,
    pub is_adware: bool,
}

impl Prediction {
    pub fn is_positive(&self) -> bool {
        self.is_malware || self.is_adware
    }
}

/// Application-layer port for the classifier pair.
///
/// The model runtime is not assumed thread-safe; implementations pin each
/// invocation to a single OS thread for its duration.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Feature names in vector position order, loaded once at startup.
    fn feature_order(&self) -> &[String];

    /// Run both models over one feature vector.
    async fn predict(&self, features: Vec<f32>) -> Result<Prediction, DomainError>;
}
