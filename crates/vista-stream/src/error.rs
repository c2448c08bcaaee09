use vista_runtime::GeneratorError;
use vista_world::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}
