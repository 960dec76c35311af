use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("{field} cannot be encoded in a TLE: {value}")]
    Unrepresentable { field: &'static str, value: String },
    #[error("invalid tle: {0}")]
    Tle(#[from] sgp4::TleError),
    #[error("elements error: {0}")]
    Elements(#[from] sgp4::ElementsError),
    #[error("epoch error: {0}")]
    Epoch(String),
    #[error("propagation error: {0}")]
    Propagation(String),
    #[error("propagation produced a non-finite position")]
    NonFinite,
}

impl PropagationError {
    pub(crate) fn unrepresentable(field: &'static str, value: impl ToString) -> Self {
        PropagationError::Unrepresentable {
            field,
            value: value.to_string(),
        }
    }
}
