//! Unix process supervision
//!
//! The child is placed in its own process group so that `SIGINT`/`SIGTERM`
//! received by the parent can be forwarded to the whole group in one
//! `kill(-pgid, sig)` call, reaching grandchildren the child itself may
//! have forked. If process-group creation fails at spawn time we fall back
//! to signalling the direct child only, and log a warning — the scenario
//! still replays, it just cannot reach the child's own descendants.

use super::{classify_spawn_error, ChildOutcome};
use crate::error::{ReplayError, Result};
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::collections::HashMap;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn spawn_and_supervise(
    command: &str,
    args: &[String],
    env: &HashMap<String, String>,
    cwd: Option<&Path>,
) -> Result<ChildOutcome> {
    let mut cmd = Command::new(command);
    cmd.args(args);
    for (k, v) in env {
        cmd.env(k, v);
    }
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    // Put the child in its own process group (pgid == its own pid) so
    // forwarded signals reach its descendants too.
    let has_own_group = Arc::new(AtomicBool::new(true));
    let group_flag = has_own_group.clone();
    unsafe {
        cmd.pre_exec(move || {
            if nix::unistd::setpgid(nix::unistd::Pid::from_raw(0), nix::unistd::Pid::from_raw(0))
                .is_err()
            {
                group_flag.store(false, Ordering::SeqCst);
            }
            Ok(())
        });
    }

    let child = cmd.spawn().map_err(|e| classify_spawn_error(command, e))?;
    let child_pid = Pid::from_raw(child.id() as i32);
    let target_pid = if has_own_group.load(Ordering::SeqCst) {
        // Negative pid addresses the whole process group in `kill(2)`.
        Pid::from_raw(-(child.id() as i32))
    } else {
        tracing::warn!("process-group creation failed; falling back to single-process signal forwarding");
        child_pid
    };

    let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(|e| ReplayError::ChildSpawn {
        command: command.to_string(),
        source: e,
    })?;
    let forwarding_done = Arc::new(AtomicBool::new(false));
    let done_flag = forwarding_done.clone();
    let handle = signals.handle();
    let forwarder = std::thread::spawn(move || {
        for sig in signals.forever() {
            if done_flag.load(Ordering::SeqCst) {
                break;
            }
            let forward_sig = match sig {
                SIGINT => Signal::SIGINT,
                SIGTERM => Signal::SIGTERM,
                _ => continue,
            };
            let _ = kill(target_pid, forward_sig);
        }
    });

    let outcome = wait_for_child(child_pid);

    forwarding_done.store(true, Ordering::SeqCst);
    handle.close();
    let _ = forwarder.join();

    // Guaranteed cleanup: the direct child has exited, but it may have
    // left descendants behind in its process group.
    // This runs unconditionally, on every exit path, success or failure.
    // Only signal the group as a whole when the child actually got one —
    // otherwise `-pid` would address our own process group.
    if has_own_group.load(Ordering::SeqCst) {
        terminate_group(-(child.id() as i32));
    } else {
        terminate_group(child.id() as i32);
    }

    outcome
}

fn wait_for_child(pid: Pid) -> Result<ChildOutcome> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(ChildOutcome::Exited(code)),
            Ok(WaitStatus::Signaled(_, sig, _)) => {
                return Ok(ChildOutcome::KilledBySignal(sig as i32))
            }
            Ok(_) => continue,
            Err(nix::errno::Errno::EINTR) => continue,
            Err(e) => {
                return Err(ReplayError::ChildExit {
                    message: format!("wait failed: {}", e),
                })
            }
        }
    }
}

/// Terminate `pid` (a process group id if negative) with `SIGTERM`, wait
/// briefly, then `SIGKILL` if it is still alive.
pub fn terminate_group(pid: i32) {
    let target = Pid::from_raw(pid);
    let _ = kill(target, Signal::SIGTERM);
    std::thread::sleep(Duration::from_millis(100));
    let _ = kill(target, Signal::SIGKILL);
    let _ = waitpid(Pid::from_raw(pid.abs()), Some(WaitPidFlag::WNOHANG));
}
