//! Diagnostic warnings with colored terminal output.
//!
//! Each distinct message is printed once per process (or until
//! [`clear_warnings`] is called), so a malformed page cannot flood stderr.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Messages already printed, keyed by `[component] message`.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// When set, warnings are still deduplicated but never printed.
static QUIET: AtomicBool = AtomicBool::new(false);

/// Print a warning the first time a given `(component, message)` pair is seen.
///
/// # Example
/// ```ignore
/// warn_once("HTML Builder", "nesting deeper than 256 levels; flattening");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let first_time = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if first_time && !QUIET.load(Ordering::Relaxed) {
        eprintln!("{}", format!("[bramble {component}] warning: {message}").yellow());
    }
}

/// Forget every recorded warning (call before loading an unrelated document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Silence (or re-enable) warning output for the whole process.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_warnings_are_recorded_once() {
        set_quiet(true);
        warn_once("Test", "first");
        warn_once("Test", "first");
        let count = WARNED
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |set| set.iter().filter(|k| k.ends_with("first")).count());
        assert_eq!(count, 1);
    }
}
