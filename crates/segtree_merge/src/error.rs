use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SegtreeError {
    #[error("empty domain [{lo}, {hi}]")]
    EmptyDomain { lo: usize, hi: usize },

    #[error("position {position} outside domain [{lo}, {hi}]")]
    OutOfDomain { position: usize, lo: usize, hi: usize },

    #[error("node arena exhausted (limit {limit} nodes)")]
    CapacityExhausted { limit: usize },
}
