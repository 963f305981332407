use serde::{Deserialize, Serialize};

/// Content-analysis pipeline settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    /// Run the adware classifier during scans. Default: true.
    #[serde(default = "default_true")]
    pub enable_adware_model: bool,

    /// Run the malware classifier during scans. Default: true.
    #[serde(default = "default_true")]
    pub enable_malware_scanner: bool,

    /// Directory holding `malware_classifier.onnx`, `adware_classifier.onnx`
    /// and `feature_names.txt`.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enable_adware_model: true,
            enable_malware_scanner: true,
            model_dir: default_model_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_model_dir() -> String {
    "./data/models".to_string()
}
