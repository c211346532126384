//! Test helpers for environment-driven configuration.

use crate::config::MAX_INPUT_LENGTH_ENV;

/// Holds [`MAX_INPUT_LENGTH_ENV`] at a fixed value and puts the previous
/// value back on drop.
#[derive(Debug)]
pub struct MaxLengthEnv {
    previous: Option<String>,
}

impl MaxLengthEnv {
    /// Set the variable to `value`, or remove it when `value` is `None`.
    pub fn new(value: Option<&str>) -> Self {
        let previous = std::env::var(MAX_INPUT_LENGTH_ENV).ok();
        // SAFETY: one test in this crate reads the environment and it holds
        // the guard for its whole body.
        unsafe { apply(value) };
        Self { previous }
    }
}

impl Drop for MaxLengthEnv {
    fn drop(&mut self) {
        // SAFETY: see `MaxLengthEnv::new`.
        unsafe { apply(self.previous.as_deref()) };
    }
}

unsafe fn apply(value: Option<&str>) {
    match value {
        Some(v) => unsafe { std::env::set_var(MAX_INPUT_LENGTH_ENV, v) },
        None => unsafe { std::env::remove_var(MAX_INPUT_LENGTH_ENV) },
    }
}
