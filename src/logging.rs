//! Logging hooks.
//!
//! With the `logging` feature the macros forward to the `log` facade;
//! without it they expand to nothing and the crate has no logging
//! dependency at all.

macro_rules! log_info {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        {
            log::info!(target: "nnue_tt", $($arg)*);
        }
    };
}

macro_rules! log_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        {
            log::debug!(target: "nnue_tt", $($arg)*);
        }
    };
}

macro_rules! log_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        {
            log::trace!(target: "nnue_tt", $($arg)*);
        }
    };
}

macro_rules! log_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        {
            log::warn!(target: "nnue_tt", $($arg)*);
        }
    };
}

pub(crate) use {log_debug, log_info, log_trace, log_warn};
