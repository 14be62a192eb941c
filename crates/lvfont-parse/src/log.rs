//! Event macros that forward to `tracing` when the feature is enabled.
//!
//! Without the feature they compile to nothing, so call sites never need
//! their own `#[cfg]`.

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(feature = "tracing")]
macro_rules! warn_event {
    ($($arg:tt)*) => { ::tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn_event {
    ($($arg:tt)*) => {{}};
}

pub(crate) use debug;
pub(crate) use warn_event as warn;
