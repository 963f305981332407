use async_trait::async_trait;
use netguard_application::ports::{Classifier, Prediction};
use netguard_domain::config::AiConfig;
use netguard_domain::DomainError;
use std::path::Path;
use std::sync::Arc;
use tract_onnx::prelude::*;
use tracing::info;

const MALWARE_MODEL_FILE: &str = "malware_classifier.onnx";
const ADWARE_MODEL_FILE: &str = "adware_classifier.onnx";
const FEATURE_NAMES_FILE: &str = "feature_names.txt";

/// The models' sole declared output: an i64 label where 1 = positive.
const OUTPUT_LABEL: &str = "output_label";

type OnnxPlan = TypedSimplePlan<TypedModel>;

struct Models {
    malware: Option<OnnxPlan>,
    adware: Option<OnnxPlan>,
    feature_count: usize,
}

impl Models {
    /// Run both enabled models over one vector. A disabled model always
    /// answers negative.
    fn predict(&self, features: &[f32]) -> Result<Prediction, DomainError> {
        if features.len() != self.feature_count {
            return Err(DomainError::ModelInvoke(format!(
                "expected {} features, got {}",
                self.feature_count,
                features.len()
            )));
        }

        let array =
            tract_ndarray::Array2::from_shape_vec((1, self.feature_count), features.to_vec())
                .map_err(|e| DomainError::ModelInvoke(e.to_string()))?;
        let input: Tensor = array.into();

        let is_malware = match &self.malware {
            Some(plan) => Self::run_plan(plan, &input)?,
            None => false,
        };
        let is_adware = match &self.adware {
            Some(plan) => Self::run_plan(plan, &input)?,
            None => false,
        };

        Ok(Prediction {
            is_malware,
            is_adware,
        })
    }

    fn run_plan(plan: &OnnxPlan, input: &Tensor) -> Result<bool, DomainError> {
        let outputs = plan
            .run(tvec!(input.clone().into()))
            .map_err(|e| DomainError::ModelInvoke(e.to_string()))?;

        let labels = outputs[0]
            .to_array_view::<i64>()
            .map_err(|e| DomainError::ModelInvoke(e.to_string()))?;

        Ok(labels.iter().next().copied().unwrap_or(0) == 1)
    }
}

/// Classifier pair backed by ONNX model blobs.
///
/// `feature_names.txt` fixes the input vector's length and positional
/// meaning; both models take `float_input` of shape `[1, N]`. The plans are
/// compiled once at startup and shared behind an `Arc` so each prediction
/// can run inside `spawn_blocking`, pinning the invocation to one OS thread.
#[derive(Clone)]
pub struct OnnxClassifier {
    models: Arc<Models>,
    feature_order: Vec<String>,
}

impl OnnxClassifier {
    pub fn load(cfg: &AiConfig) -> Result<Self, DomainError> {
        let dir = Path::new(&cfg.model_dir);

        let feature_order = Self::load_feature_order(&dir.join(FEATURE_NAMES_FILE))?;
        let feature_count = feature_order.len();
        if feature_count == 0 {
            return Err(DomainError::ModelInit(format!(
                "{FEATURE_NAMES_FILE} is empty"
            )));
        }

        let malware = if cfg.enable_malware_scanner {
            Some(Self::load_plan(&dir.join(MALWARE_MODEL_FILE), feature_count)?)
        } else {
            None
        };
        let adware = if cfg.enable_adware_model {
            Some(Self::load_plan(&dir.join(ADWARE_MODEL_FILE), feature_count)?)
        } else {
            None
        };

        info!(
            features = feature_count,
            malware = malware.is_some(),
            adware = adware.is_some(),
            "Classifier models loaded"
        );

        Ok(Self {
            models: Arc::new(Models {
                malware,
                adware,
                feature_count,
            }),
            feature_order,
        })
    }

    fn load_feature_order(path: &Path) -> Result<Vec<String>, DomainError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DomainError::ModelInit(format!("could not read {}: {e}", path.display()))
        })?;

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn load_plan(path: &Path, feature_count: usize) -> Result<OnnxPlan, DomainError> {
        let mut model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| DomainError::ModelInit(format!("{}: {e}", path.display())))?
            .with_input_fact(0, f32::fact([1, feature_count]).into())
            .map_err(|e| DomainError::ModelInit(e.to_string()))?;

        // Classifier graphs also expose ZipMap'd probabilities; only the
        // label output is wanted, and pruning to it keeps the plan lean.
        model
            .set_output_names([OUTPUT_LABEL])
            .map_err(|e| DomainError::ModelInit(e.to_string()))?;

        model
            .into_optimized()
            .map_err(|e| DomainError::ModelInit(e.to_string()))?
            .into_runnable()
            .map_err(|e| DomainError::ModelInit(e.to_string()))
    }
}

#[async_trait]
impl Classifier for OnnxClassifier {
    fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    async fn predict(&self, features: Vec<f32>) -> Result<Prediction, DomainError> {
        let models = Arc::clone(&self.models);

        tokio::task::spawn_blocking(move || models.predict(&features))
            .await
            .map_err(|e| DomainError::ModelInvoke(format!("prediction task failed: {e}")))?
    }
}
