use thiserror::Error;

/// A configuration contract violation.
///
/// These are reported synchronously by the operation that hit them. The engine keeps whatever
/// state it had before the failing operation.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The size policy resolved a length that is not strictly positive (or not finite).
    #[error("item size must be a finite value greater than 0 (index {index}, got {size})")]
    InvalidSize { index: usize, size: f64 },

    /// The smooth-scroll duration policy produced an unusable duration.
    #[error("scroll duration must be a finite value not less than 0 (distance {distance}, got {duration})")]
    InvalidDuration { distance: f64, duration: f64 },
}

pub type Result<T> = core::result::Result<T, ConfigError>;

pub(crate) fn check_size(index: usize, size: f64) -> Result<f64> {
    if size.is_finite() && size > 0.0 {
        Ok(size)
    } else {
        Err(ConfigError::InvalidSize { index, size })
    }
}
