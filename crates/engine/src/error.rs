use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Stack \"{0}\" not found. Call generate_infrastructure first.")]
    StackNotFound(String),

    #[error("Code generation failed: {0}")]
    CodeGeneration(String),
}
