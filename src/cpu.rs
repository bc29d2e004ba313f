//! CPU topology and thread-affinity helpers used by the warm-up spin and by
//! sizing the worker/consumer pools.

use crate::error::{CrackError, Result};

/// Number of logical CPU cores visible to this process.
pub fn get_cpu_count() -> usize {
    num_cpus::get()
}

/// Pin the calling thread to a single CPU core. Real binding on Linux via
/// `sched_setaffinity`; unsupported elsewhere.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu_id: usize) -> Result<()> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    if cpu_id >= get_cpu_count() {
        return Err(CrackError::config(format!(
            "invalid CPU id {cpu_id} (max: {})",
            get_cpu_count() - 1
        )));
    }

    let mut cpu_set = CpuSet::new();
    cpu_set
        .set(cpu_id)
        .map_err(|e| CrackError::config(format!("failed to build CPU set: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpu_set)
        .map_err(|e| CrackError::config(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(_cpu_id: usize) -> Result<()> {
    Err(CrackError::config("thread affinity is not supported on this platform"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_at_least_one_cpu() {
        assert!(get_cpu_count() >= 1);
    }

    #[test]
    fn rejects_out_of_range_cpu_id() {
        assert!(pin_to_cpu(get_cpu_count() + 1000).is_err());
    }
}
