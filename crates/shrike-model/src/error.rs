use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid type descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("invalid method proto: {0}")]
    InvalidProto(String),
    #[error("invalid method reference: {0}")]
    InvalidMethodReference(String),
    #[error("checksum requested for a class compiled without checksum encoding")]
    ChecksumUnavailable,
}
