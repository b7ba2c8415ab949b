pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("nothing found at {0:?}")]
    NotFound(String),
    #[error("unknown dataset {0:?}")]
    UnknownDataset(String),
    #[error("unknown variable {variable:?} in dataset {dataset:?}")]
    UnknownVariable { dataset: String, variable: String },
    #[error("malformed chunk address {0:?}")]
    MalformedAddress(String),
    #[error("backend read failed: {0}")]
    BackendRead(String),
    #[error("{0}")]
    General(String),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Wrapped(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn general(message: impl Into<String>) -> Self {
        Self::General(message.into())
    }

    pub fn wrap(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Wrapped(Box::new(error))
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::BackendRead(message.into())
    }

    pub fn malformed(address: impl Into<String>) -> Self {
        Self::MalformedAddress(address.into())
    }

    /// Whether the error means the requested resource does not exist,
    /// as opposed to a failure while producing it.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::UnknownDataset(_)
                | Self::UnknownVariable { .. }
                | Self::MalformedAddress(_)
        )
    }
}
