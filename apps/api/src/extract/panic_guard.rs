use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Result};

/// Runs a third-party parser call, turning a panic into an ordinary error so
/// it is reported like any other parser fault.
pub fn contain_parser_panic<T>(parser: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(anyhow!("{parser} parser panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
