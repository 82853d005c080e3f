use leverage_planner_adapters::AdapterError;
use leverage_planner_config::ConfigError;
use leverage_planner_core::PlanError;
use thiserror::Error;

/// Errors from building or driving the planner service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("adapter error for {context}: {source}")]
    Adapter {
        context: String,
        #[source]
        source: AdapterError,
    },

    #[error(transparent)]
    Plan(#[from] PlanError),
}

impl ServiceError {
    pub(crate) fn adapter(context: impl Into<String>, source: AdapterError) -> Self {
        ServiceError::Adapter {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
