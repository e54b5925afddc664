use thiserror::Error;

/// Scenario configuration errors. Each one disqualifies a single scenario;
/// the rest of the batch still runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("scenario '{scenario}': asset type '{asset_type}' not found in master generator table")]
    UnknownAssetType { scenario: String, asset_type: String },

    #[error("invalid position map '{value}': {reason}")]
    InvalidPositions { value: String, reason: String },

    #[error("scenario '{scenario}': {reason}")]
    Invalid { scenario: String, reason: String },
}
