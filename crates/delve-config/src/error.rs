//! Configuration error types.

/// Errors that can occur when loading, saving, parsing, or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// A carver range has `min > max`.
    #[error("carver `{carver}`: {field} range is inverted ({min} > {max})")]
    InvertedRange {
        carver: String,
        field: &'static str,
        min: i32,
        max: i32,
    },

    /// Two carvers share an identifier.
    #[error("duplicate carver id: {0}")]
    DuplicateCarver(String),

    /// A biome references a carver that is not defined.
    #[error("biome `{biome}` references unknown carver `{carver}`")]
    UnknownCarver { biome: String, carver: String },

    /// A carve chance is outside `0..=100`.
    #[error("biome `{biome}`: carve chance {chance} for `{carver}` exceeds 100")]
    ChanceOutOfRange {
        biome: String,
        carver: String,
        chance: u32,
    },

    /// A carver's radius range never reaches 1.
    #[error("carver `{carver}`: radius max must be at least 1 (got {max})")]
    RadiusTooSmall { carver: String, max: i32 },
}
