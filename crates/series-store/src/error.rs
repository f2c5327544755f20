use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Rejected observation: {0}")]
    InvalidObservation(#[from] CoreError),
}
