use thiserror::Error;

/// Errors raised by the reference counting engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot register stat '{name}': statistics are already enabled")]
    RegistrationClosed { name: String },
}
