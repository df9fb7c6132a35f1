//! Crate-private logging shims.
//!
//! With `feature = "tracing"` these forward to `tracing` under [`crate::LOG_TARGET`]; without it
//! they expand to nothing, so call sites cost nothing in default builds.

#[cfg(feature = "tracing")]
macro_rules! vtrace {
    ($($tt:tt)*) => { tracing::trace!(target: crate::LOG_TARGET, $($tt)*) };
}

#[cfg(feature = "tracing")]
macro_rules! vdebug {
    ($($tt:tt)*) => { tracing::debug!(target: crate::LOG_TARGET, $($tt)*) };
}

#[cfg(feature = "tracing")]
macro_rules! vwarn {
    ($($tt:tt)*) => { tracing::warn!(target: crate::LOG_TARGET, $($tt)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! vtrace {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! vdebug {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! vwarn {
    ($($tt:tt)*) => {};
}
