use crate::color::ColorError;

pub type GlitterResult<T> = Result<T, GlitterError>;

#[derive(thiserror::Error, Debug)]
pub enum GlitterError {
    #[error("color error: {0}")]
    Color(#[from] ColorError),

    #[error("import error: {0}")]
    Import(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GlitterError {
    pub fn import(msg: impl Into<String>) -> Self {
        Self::Import(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }
}
