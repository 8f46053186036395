use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("cannot build a tree over an empty array")]
    EmptyInput,
    #[error("range [{l}, {r}] is not a valid range over {len} elements")]
    InvalidRange { l: usize, r: usize, len: usize },
    #[error("index {index} is out of bounds for {len} elements")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("elements in [{l}, {r}] would no longer fit in an i64")]
    Overflow { l: usize, r: usize },
    #[error("invalid tree snapshot: {0}")]
    InvalidSnapshot(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
