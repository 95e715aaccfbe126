// Process-wide SIGINT handling
//
// SIGINT is blocked on the installing thread (and so on every thread it
// spawns afterwards) and collected by a dedicated thread with sigwait. The
// action taken depends on what the process is doing, so callers swap the
// hook as they move between phases.
use crate::input::Input;
use crossbeam::channel::Sender;
use nix::sys::signal::{SigSet, Signal};
use p2pchat_transport::AcceptCanceller;
use once_cell::sync::Lazy;
use std::io;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;

/// Exit status used when an interrupt arrives with no hook set.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

type Hook = Box<dyn Fn() + Send>;

struct InterruptState {
    installed: AtomicBool,
    hook: Mutex<Option<Hook>>,
}

// Global state singleton - initialized lazily and never dropped
static INTERRUPTS: Lazy<InterruptState> = Lazy::new(|| InterruptState {
    installed: AtomicBool::new(false),
    hook: Mutex::new(None),
});

/// Start the watcher thread. Call from `main` before spawning any other
/// thread, otherwise those threads may still receive SIGINT directly.
pub fn install() -> io::Result<()> {
    if INTERRUPTS.installed.swap(true, Ordering::AcqRel) {
        return Ok(());
    }

    let mut mask = SigSet::empty();
    mask.add(Signal::SIGINT);
    mask.thread_block()?;

    thread::Builder::new()
        .name("chat-signals".to_string())
        .spawn(move || watch(mask))?;
    Ok(())
}

fn watch(mask: SigSet) {
    loop {
        match mask.wait() {
            Ok(signal) => {
                tracing::debug!(?signal, "interrupt received");
                fire();
            }
            Err(e) => {
                tracing::warn!(error = %e, "sigwait failed, interrupts no longer handled");
                return;
            }
        }
    }
}

fn fire() {
    let hook = INTERRUPTS.hook.lock().unwrap_or_else(|e| e.into_inner());
    match hook.as_ref() {
        Some(hook) => hook(),
        None => process::exit(INTERRUPTED_EXIT_CODE),
    }
}

/// Replace the action run on the next interrupt.
pub fn on_interrupt<F>(hook: F)
where
    F: Fn() + Send + 'static,
{
    *INTERRUPTS.hook.lock().unwrap_or_else(|e| e.into_inner()) = Some(Box::new(hook));
}

/// Go back to exiting immediately on interrupt.
pub fn clear_interrupt_hook() {
    *INTERRUPTS.hook.lock().unwrap_or_else(|e| e.into_inner()) = None;
}

/// Interrupt action for prompts and the session: the pending read of
/// operator input returns `Input::Cancelled`.
pub fn cancel_input(input: Sender<Input>) -> impl Fn() + Send + 'static {
    move || {
        let _ = input.send(Input::Cancelled);
    }
}

/// Interrupt action while waiting for a peer. Wakes the accept, and also
/// queues `Input::Cancelled` so an interrupt landing just after the accept
/// completed still ends the session.
pub fn cancel_accept(canceller: AcceptCanceller, input: Sender<Input>) -> impl Fn() + Send + 'static {
    move || {
        canceller.cancel();
        let _ = input.send(Input::Cancelled);
    }
}
