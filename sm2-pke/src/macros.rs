//! Diagnostics forwarded to `tracing` when the `tracing` feature is enabled.
//!
//! Events must never carry key material, key streams, shared coordinates or
//! plaintext.

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::warn!($($arg)*);
    }};
}
