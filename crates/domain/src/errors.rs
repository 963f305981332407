use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    ConfigLoad(String),

    #[error("Store initialization failed: {0}")]
    StoreInit(String),

    #[error("Store operation failed: {0}")]
    StoreOp(String),

    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    #[error("Model invocation failed: {0}")]
    ModelInvoke(String),

    #[error("Packet parse error: {0}")]
    PacketParse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not bind packet queue: {0}")]
    QueueBind(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Operation cancelled")]
    Cancelled,
}
