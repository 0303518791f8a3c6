/// Failures raised by the measure framework.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// Judgment or result data for a query is missing or malformed.
    #[error("query {query_id}: {reason}")]
    InputStructure { query_id: String, reason: String },

    /// Measure or evaluation parameters are unusable; fatal for the run.
    #[error("measure {measure}: {reason}")]
    Parameter { measure: String, reason: String },

    /// Per-query working storage could not be reserved.
    #[error("query {query_id}: cannot reserve {requested} entries of working storage")]
    Allocation { query_id: String, requested: usize },
}

impl EvalError {
    pub fn input(query_id: &str, reason: impl Into<String>) -> Self {
        Self::InputStructure {
            query_id: query_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn parameter(measure: &str, reason: impl Into<String>) -> Self {
        Self::Parameter {
            measure: measure.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the failure only invalidates one query's result.
    pub fn is_query_local(&self) -> bool {
        matches!(self, Self::InputStructure { .. } | Self::Allocation { .. })
    }
}
