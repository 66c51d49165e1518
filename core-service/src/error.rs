use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Cache error: {0}")]
    Cache(#[from] core_cache::CacheError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
