//! Supervisor: the parent process spawns the real sync worker as a child
//! process and restarts it after any nonzero exit.

use std::env;
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const RESTART_DELAY: Duration = Duration::from_secs(5);

/// Spawn the current executable as a child with `--worker` appended, wait
/// for it, and respawn after `RESTART_DELAY` on any nonzero exit. Returns
/// once a SIGINT/SIGTERM has been delivered and the child has exited.
pub fn run(config_path: &Path, verbose: bool) -> std::io::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_handler = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        tracing::info!("supervisor received shutdown signal");
        shutdown_handler.store(true, Ordering::SeqCst);
    })
    .expect("failed to install signal handler");

    let exe = env::current_exe()?;

    while !shutdown.load(Ordering::SeqCst) {
        let mut command = Command::new(&exe);
        command.arg(config_path).arg("--worker");
        if verbose {
            command.arg("--verbose");
        }

        tracing::info!("spawning worker");
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                tracing::error!(error = %err, "failed to spawn worker");
                sleep_unless_shutdown(&shutdown, RESTART_DELAY);
                continue;
            }
        };

        let status = wait_with_shutdown(&mut child, &shutdown);

        match status {
            Ok(status) if status.success() => {
                tracing::info!("worker exited cleanly");
            }
            Ok(status) => {
                tracing::warn!(status = %status, "worker exited with error, restarting");
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to wait on worker");
            }
        }

        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        sleep_unless_shutdown(&shutdown, RESTART_DELAY);
    }

    Ok(())
}

fn wait_with_shutdown(
    child: &mut std::process::Child,
    shutdown: &Arc<AtomicBool>,
) -> std::io::Result<ExitStatus> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if shutdown.load(Ordering::SeqCst) {
            // The worker installs its own handler and shares our process
            // group, so it receives the same signal directly; we just wait
            // for it to finish exiting instead of killing it ourselves.
            return child.wait();
        }
        std::thread::sleep(Duration::from_millis(200));
    }
}

fn sleep_unless_shutdown(shutdown: &Arc<AtomicBool>, duration: Duration) {
    let step = Duration::from_millis(200);
    let mut waited = Duration::from_secs(0);
    while waited < duration {
        if shutdown.load(Ordering::SeqCst) {
            return;
        }
        std::thread::sleep(step);
        waited += step;
    }
}
