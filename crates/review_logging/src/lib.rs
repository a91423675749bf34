#![deny(missing_docs)]
//! Shared logging utilities for the edit review workspace.
//!
//! This crate provides the `review_*` logging macros used across the codebase,
//! a per-thread task context that prefixes every message, and a minimal test
//! initializer for the global logger.

use std::cell::RefCell;
use std::marker::PhantomData;

#[doc(hidden)]
pub use log as __log;

thread_local! {
    /// Identifier of the edit task the current thread is working on, if any.
    static TASK_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Sets the task context for the current thread.
/// Messages logged through the `review_*` macros are prefixed with it until cleared.
pub fn set_task_context(task_id: impl Into<String>) {
    let task_id = task_id.into();
    TASK_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(task_id));
}

/// Removes the task context of the current thread.
pub fn clear_task_context() {
    TASK_CONTEXT.with(|ctx| *ctx.borrow_mut() = None);
}

/// Returns the task context of the current thread, if one is set.
pub fn current_task_context() -> Option<String> {
    TASK_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Restores the previous task context when dropped.
///
/// The guard is tied to the thread that created it and cannot be held across
/// an `.await` in a `Send` future.
#[must_use = "the context is cleared as soon as the guard is dropped"]
pub struct TaskContextGuard {
    previous: Option<String>,
    _thread_bound: PhantomData<*const ()>,
}

impl Drop for TaskContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        TASK_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    }
}

/// Sets the task context for the lifetime of the returned guard.
pub fn scoped_task_context(task_id: impl Into<String>) -> TaskContextGuard {
    let task_id = task_id.into();
    let previous = TASK_CONTEXT.with(|ctx| ctx.borrow_mut().replace(task_id));
    TaskContextGuard {
        previous,
        _thread_bound: PhantomData,
    }
}

/// Renders the message prefix for the current task context.
/// Returns an empty string when no context is set.
#[doc(hidden)]
pub fn context_prefix() -> String {
    TASK_CONTEXT.with(|ctx| match ctx.borrow().as_deref() {
        Some(task_id) => format!("[task {task_id}] "),
        None => String::new(),
    })
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! review_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! review_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! review_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! review_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! review_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("{}{}", $crate::context_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
