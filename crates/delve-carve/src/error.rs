//! Errors raised while building carvers.

/// Errors that can occur when constructing a [`Carver`](crate::Carver).
#[derive(Debug, thiserror::Error)]
pub enum CarveError {
    /// A sampled range has `min > max`.
    #[error("carver `{carver}`: {field} range is inverted ({min} > {max})")]
    InvertedRange {
        carver: String,
        field: &'static str,
        min: i32,
        max: i32,
    },

    /// A vector or scalar parameter is NaN or infinite.
    #[error("carver `{carver}`: {field} must be finite")]
    NonFinite { carver: String, field: &'static str },

    /// The radius range never reaches the minimum running radius of 1.
    #[error("carver `{carver}`: radius max must be at least 1 (got {max})")]
    RadiusTooSmall { carver: String, max: i32 },
}
