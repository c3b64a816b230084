//! Resident memory sampling
//!
//! Reads the peak resident set size of the current process via
//! `getrusage(RUSAGE_SELF)`. Values are reported in KiB on every platform.

#![allow(unsafe_code)] // getrusage() requires unsafe

use log::debug;

/// Source of memory samples taken at load boundaries
pub trait MemoryProbe {
    /// Current resident memory in KiB
    fn sample(&self) -> u64;
}

impl<F: Fn() -> u64> MemoryProbe for F {
    fn sample(&self) -> u64 {
        self()
    }
}

/// Peak resident set size of this process
#[derive(Debug, Default, Clone, Copy)]
pub struct RusageProbe;

impl MemoryProbe for RusageProbe {
    fn sample(&self) -> u64 {
        let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();

        // SAFETY: `usage` points to writable memory sized for `rusage`;
        // getrusage fully initialises it when it returns 0
        let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
        if rc != 0 {
            debug!("getrusage failed: {}", std::io::Error::last_os_error());
            return 0;
        }

        // SAFETY: initialised by the successful call above
        let max_rss = unsafe { usage.assume_init() }.ru_maxrss;
        let max_rss = u64::try_from(max_rss).unwrap_or(0);

        // macOS reports bytes, Linux and the BSDs report KiB
        if cfg!(target_os = "macos") {
            max_rss / 1024
        } else {
            max_rss
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rusage_probe_reports_memory() {
        let probe = RusageProbe;
        assert!(probe.sample() > 0, "a running process has a resident set");
    }

    #[test]
    fn test_rusage_probe_grows_after_touching_memory() {
        let probe = RusageProbe;
        let before = probe.sample();

        let buffer = vec![1u8; 32 * 1024 * 1024];
        let after = probe.sample();
        drop(buffer);

        assert!(after >= before);
    }

    #[test]
    fn test_closure_probe() {
        let probe = || 42u64;
        assert_eq!(probe.sample(), 42);
    }
}
