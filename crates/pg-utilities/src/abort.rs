use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use log::info;

/// Process-wide cooperative abort flag, shared by every long-running solve.
///
/// Timeouts and manual cancellation are both implemented outside the core algorithms by
/// flipping this flag from another thread (see the `pgsolve` binary's `--timeout` handling);
/// solvers only ever poll it, never spawn threads themselves.
static ABORT: AtomicBool = AtomicBool::new(false);

/// Requests that any in-progress solve stop at its next poll point.
pub fn request_abort() {
    info!("abort requested");
    ABORT.store(true, Ordering::SeqCst);
}

/// Returns whether an abort has been requested since the last [`clear_abort`].
pub fn check_abort() -> bool {
    ABORT.load(Ordering::SeqCst)
}

/// Resets the abort flag. Intended for test isolation between successive solves in the
/// same process.
pub fn clear_abort() {
    ABORT.store(false, Ordering::SeqCst);
}
