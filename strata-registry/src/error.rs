use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown check function: {0}")]
    UnknownCheck(String),

    #[error("Malformed parameter '{parameter}' for check function '{name}'")]
    MalformedCheckParameter { name: String, parameter: String },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
