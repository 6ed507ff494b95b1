/// Failures reported by a [`ContainerRuntime`](super::ContainerRuntime)
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{context}: {message}")]
    Command { context: String, message: String },
    #[error("{context}: failed to run runtime client")]
    Spawn {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: unexpected runtime output")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RuntimeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
