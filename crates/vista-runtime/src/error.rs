#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("failed to start terrain worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
