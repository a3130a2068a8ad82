//! Optional process-wide resource caps, applied at worker startup on Unix.

#[cfg(unix)]
pub fn apply_caps() {
    const ADDRESS_SPACE_BYTES: libc::rlim_t = 4 * 1024 * 1024 * 1024;
    const CPU_SECONDS: libc::rlim_t = 3600;

    unsafe {
        let as_limit = libc::rlimit {
            rlim_cur: ADDRESS_SPACE_BYTES,
            rlim_max: ADDRESS_SPACE_BYTES,
        };
        if libc::setrlimit(libc::RLIMIT_AS, &as_limit) != 0 {
            tracing::warn!("failed to set RLIMIT_AS, continuing without it");
        }

        let cpu_limit = libc::rlimit {
            rlim_cur: CPU_SECONDS,
            rlim_max: CPU_SECONDS,
        };
        if libc::setrlimit(libc::RLIMIT_CPU, &cpu_limit) != 0 {
            tracing::warn!("failed to set RLIMIT_CPU, continuing without it");
        }
    }
}

#[cfg(not(unix))]
pub fn apply_caps() {}
