//! Panic capture for dispatch.
//!
//! A caught panic payload only carries the message. The hook installed here
//! records the panic location and a backtrace on the panicking thread, where
//! [`panic_fault`] picks them up right after `catch_unwind` returns.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic;
use std::sync::Once;

use sextant_core::{Fault, PanicReport};

thread_local! {
    static LAST_PANIC: RefCell<Option<(Option<String>, Vec<String>)>> = const { RefCell::new(None) };
}

static INSTALL: Once = Once::new();

/// Installs the recording hook once per process.
///
/// The hook that was installed before still runs after recording.
pub(crate) fn install_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
            let backtrace = Backtrace::force_capture()
                .to_string()
                .lines()
                .map(str::to_string)
                .collect();
            // Ignored during thread teardown, when the slot is gone.
            let _ = LAST_PANIC.try_with(|slot| *slot.borrow_mut() = Some((location, backtrace)));
            previous(info);
        }));
    });
}

/// Builds a fault from a caught panic payload and the recorded site.
pub(crate) fn panic_fault(payload: &(dyn std::any::Any + Send)) -> Fault {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());

    let mut report = PanicReport::new(message);
    if let Some((location, backtrace)) = LAST_PANIC
        .try_with(|slot| slot.borrow_mut().take())
        .ok()
        .flatten()
    {
        report.location = location;
        report.backtrace = backtrace;
    }
    Fault::Panic(report)
}
