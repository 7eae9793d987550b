/// Contract violations reported by the normalization engine
#[derive(
    Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum NormalizeError {
    /// Out-of-range leaf value or child access
    #[display("index {index} out of range for length {len}")]
    Index { index: usize, len: usize },
    /// Box-Cox requested on a sample containing a non-positive value
    #[display("Box-Cox transform requires strictly positive values, found {value}")]
    Domain { value: f64 },
    /// Inverse mapping requested where no usable transform record exists
    #[display("invalid state: {reason}")]
    InvalidState { reason: &'static str },
    /// Empty hierarchy, non-finite input, or otherwise invalid argument
    #[display("invalid argument: {reason}")]
    Argument { reason: String },
}

impl NormalizeError {
    pub(crate) fn argument(reason: impl Into<String>) -> Self {
        Self::Argument {
            reason: reason.into(),
        }
    }
}
