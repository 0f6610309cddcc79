//! Call-site macros.
//!
//! Every macro captures `file!()` and `line!()`, opens a
//! [`MessageScope`](crate::MessageScope) on the given sink, writes the
//! formatted message and delivers it when the statement ends. Levels below
//! [`STATIC_FILTER_LEVEL`](crate::STATIC_FILTER_LEVEL) compile to a branch
//! that never evaluates or formats the arguments.
//!
//! # Examples
//!
//! ```
//! use sink_logger::prelude::*;
//! use sink_logger::{info, warn};
//!
//! let sink = StringSink::new().with_system_ids(false);
//!
//! info!(sink, "Server started");
//! let port = 8080;
//! warn!(sink, "Port {} already in use", port);
//!
//! assert_eq!(sink.lines().len(), 2);
//! ```

/// Log at a level chosen at runtime.
///
/// ```
/// # use sink_logger::prelude::*;
/// # let sink = StringSink::new();
/// use sink_logger::log;
/// log!(sink, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($sink:expr, $level:expr, $($arg:tt)+) => {{
        let level: $crate::LogLevel = $level;
        if level.is_statically_enabled() {
            let mut scope = $crate::MessageScope::new(file!(), line!(), level, &$sink);
            let _ = ::std::fmt::Write::write_fmt(&mut scope, format_args!($($arg)+));
        }
    }};
}

#[macro_export]
macro_rules! trace {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log!($sink, $crate::LogLevel::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log!($sink, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log!($sink, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log!($sink, $crate::LogLevel::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log!($sink, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log at FATAL; the first FATAL message of the process arms termination.
///
/// Whether the process actually exits depends on the
/// [`FatalPolicy`](crate::FatalPolicy) of the global coordinator.
#[macro_export]
macro_rules! fatal {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log!($sink, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Log only when `$cond` holds; the condition is evaluated first.
///
/// ```
/// # use sink_logger::prelude::*;
/// # let sink = StringSink::new();
/// use sink_logger::log_if;
/// let retries = 4;
/// log_if!(sink, LogLevel::Warn, retries > 3, "{} retries", retries);
/// assert!(!sink.is_empty());
/// ```
#[macro_export]
macro_rules! log_if {
    ($sink:expr, $level:expr, $cond:expr, $($arg:tt)+) => {
        if $cond {
            $crate::log!($sink, $level, $($arg)+)
        }
    };
}

#[macro_export]
macro_rules! log_if_not {
    ($sink:expr, $level:expr, $cond:expr, $($arg:tt)+) => {
        $crate::log_if!($sink, $level, !($cond), $($arg)+)
    };
}

/// Like [`log!`], but compiled out of release builds except at FATAL.
#[macro_export]
macro_rules! dlog {
    ($sink:expr, $level:expr, $($arg:tt)+) => {{
        let level: $crate::LogLevel = $level;
        if cfg!(debug_assertions) || level == $crate::LogLevel::Fatal {
            $crate::log!($sink, level, $($arg)+)
        }
    }};
}

/// [`log_if!`] in debug builds; in release builds nothing is evaluated,
/// not even at FATAL.
#[macro_export]
macro_rules! dlog_if {
    ($sink:expr, $level:expr, $cond:expr, $($arg:tt)+) => {
        if cfg!(debug_assertions) {
            $crate::log_if!($sink, $level, $cond, $($arg)+)
        }
    };
}

/// FATAL `Assertion failed: <cond>` when `$cond` is false.
///
/// ```
/// # use sink_logger::prelude::*;
/// # FatalCoordinator::global().set_policy(FatalPolicy::NoExit);
/// # let sink = StringSink::new().with_system_ids(false);
/// use sink_logger::log_assert;
/// let queue_len = 3;
/// log_assert!(sink, queue_len < 2);
/// assert!(sink.contents().ends_with("Assertion failed: queue_len < 2\n"));
/// ```
#[macro_export]
macro_rules! log_assert {
    ($sink:expr, $cond:expr) => {
        $crate::log_if!(
            $sink,
            $crate::LogLevel::Fatal,
            !($cond),
            "Assertion failed: {}",
            stringify!($cond)
        )
    };
    ($sink:expr, $cond:expr, $($arg:tt)+) => {
        $crate::log_if!(
            $sink,
            $crate::LogLevel::Fatal,
            !($cond),
            "Assertion failed: {}: {}",
            stringify!($cond),
            format_args!($($arg)+)
        )
    };
}

/// [`log_assert!`] in debug builds only.
#[macro_export]
macro_rules! dlog_assert {
    ($sink:expr, $cond:expr $(, $($arg:tt)+)?) => {
        if cfg!(debug_assertions) {
            $crate::log_assert!($sink, $cond $(, $($arg)+)?)
        }
    };
}

#[cfg(feature = "helper-macros")]
#[doc(hidden)]
#[macro_export]
macro_rules! __check_impl {
    ($sink:expr, $ok:expr, $text:expr) => {
        $crate::log_if!(
            $sink,
            $crate::LogLevel::Fatal,
            !($ok),
            "Check failed: {}",
            $text
        )
    };
    ($sink:expr, $ok:expr, $text:expr, $($arg:tt)+) => {
        $crate::log_if!(
            $sink,
            $crate::LogLevel::Fatal,
            !($ok),
            "Check failed: {}: {}",
            $text,
            format_args!($($arg)+)
        )
    };
}

/// FATAL `Check failed: <cond>[: <message>]` when `$cond` is false.
///
/// ```
/// # use sink_logger::prelude::*;
/// # FatalCoordinator::global().set_policy(FatalPolicy::NoExit);
/// # let sink = StringSink::new().with_system_ids(false);
/// use sink_logger::{check, check_eq};
/// let connections = 0;
/// check!(sink, connections > 0, "pool is empty");
/// check_eq!(sink, connections, 0);
/// assert!(sink.contents().ends_with("Check failed: connections > 0: pool is empty\n"));
/// ```
#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! check {
    ($sink:expr, $cond:expr $(, $($arg:tt)+)?) => {
        $crate::__check_impl!($sink, $cond, stringify!($cond) $(, $($arg)+)?)
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! check_eq {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_impl!(
            $sink,
            ($a) == ($b),
            concat!(stringify!($a), " == ", stringify!($b))
            $(, $($arg)+)?
        )
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! check_ne {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_impl!(
            $sink,
            ($a) != ($b),
            concat!(stringify!($a), " != ", stringify!($b))
            $(, $($arg)+)?
        )
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! check_lt {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_impl!(
            $sink,
            ($a) < ($b),
            concat!(stringify!($a), " < ", stringify!($b))
            $(, $($arg)+)?
        )
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! check_gt {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_impl!(
            $sink,
            ($a) > ($b),
            concat!(stringify!($a), " > ", stringify!($b))
            $(, $($arg)+)?
        )
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! check_le {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_impl!(
            $sink,
            ($a) <= ($b),
            concat!(stringify!($a), " <= ", stringify!($b))
            $(, $($arg)+)?
        )
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! check_ge {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::__check_impl!(
            $sink,
            ($a) >= ($b),
            concat!(stringify!($a), " >= ", stringify!($b))
            $(, $($arg)+)?
        )
    };
}

/// Alias of [`check_ne!`]
#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! check_not_equal {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::check_ne!($sink, $a, $b $(, $($arg)+)?)
    };
}

/// Debug-build checks.
///
/// Each `dcheck*` macro behaves like its `check*` counterpart when
/// `debug_assertions` are on. In release builds the operands still have to
/// type-check but are never evaluated.
///
/// ```
/// # use sink_logger::prelude::*;
/// # FatalCoordinator::global().set_policy(FatalPolicy::NoExit);
/// # let sink = StringSink::new().with_system_ids(false);
/// use sink_logger::dcheck_ge;
/// let free_slots = 0;
/// dcheck_ge!(sink, free_slots, 1, "no free slot");
/// assert_eq!(sink.is_empty(), !cfg!(debug_assertions));
/// ```
#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! dcheck {
    ($sink:expr, $cond:expr $(, $($arg:tt)+)?) => {
        if cfg!(debug_assertions) {
            $crate::check!($sink, $cond $(, $($arg)+)?)
        }
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! dcheck_eq {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        if cfg!(debug_assertions) {
            $crate::check_eq!($sink, $a, $b $(, $($arg)+)?)
        }
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! dcheck_ne {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        if cfg!(debug_assertions) {
            $crate::check_ne!($sink, $a, $b $(, $($arg)+)?)
        }
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! dcheck_not_equal {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        $crate::dcheck_ne!($sink, $a, $b $(, $($arg)+)?)
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! dcheck_lt {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        if cfg!(debug_assertions) {
            $crate::check_lt!($sink, $a, $b $(, $($arg)+)?)
        }
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! dcheck_gt {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        if cfg!(debug_assertions) {
            $crate::check_gt!($sink, $a, $b $(, $($arg)+)?)
        }
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! dcheck_le {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        if cfg!(debug_assertions) {
            $crate::check_le!($sink, $a, $b $(, $($arg)+)?)
        }
    };
}

#[cfg(feature = "helper-macros")]
#[macro_export]
macro_rules! dcheck_ge {
    ($sink:expr, $a:expr, $b:expr $(, $($arg:tt)+)?) => {
        if cfg!(debug_assertions) {
            $crate::check_ge!($sink, $a, $b $(, $($arg)+)?)
        }
    };
}
