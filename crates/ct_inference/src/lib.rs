pub mod classifier;
pub mod models;
pub mod recovery;

/// Model wiring configuration. `model_name` selects the implementation,
/// `model_variant` the underlying weights, `model_url` the endpoint.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub model_name: Option<String>,
    pub model_variant: Option<String>,
    pub model_url: Option<String>,
}

pub use models::create_model;
pub use recovery::{recover_tips, RecoveredTips, RecoveryTier};

pub mod prelude {
    pub use crate::classifier::classify;
    pub use crate::models::create_model;
    pub use crate::recovery::{recover_tips, RecoveredTips, RecoveryTier};
    pub use crate::Config;
    pub use ct_core::{Article, Error, InferenceModel, Result, Tips};
}
