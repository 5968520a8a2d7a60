use crate::core::error::{Result, VcmError};
use log::{error, warn};

/// Validate and normalize a requested worker count.
pub fn determine_allowed_cpus(desired: usize) -> Result<usize> {
    if desired == 0 {
        error!("Must select > 0 threads");
        Err(VcmError::config("Too few threads selected. Min 1"))
    } else if desired > num_cpus::get() {
        warn!(
            "Specified more threads ({}) than are available ({})",
            desired,
            num_cpus::get()
        );
        Ok(desired)
    } else {
        Ok(desired)
    }
}

/// Build a dedicated Rayon pool with the validated worker count.
pub fn build_rayon_pool(size: usize) -> Result<rayon::ThreadPool> {
    let cpus = determine_allowed_cpus(size)?;
    rayon::ThreadPoolBuilder::new()
        .num_threads(cpus)
        .build()
        .map_err(|err| VcmError::config(format!("Failed to build thread pool: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threads_is_a_configuration_error() {
        assert!(matches!(
            determine_allowed_cpus(0),
            Err(VcmError::Configuration(_))
        ));
    }

    #[test]
    fn oversubscription_is_allowed() {
        let many = num_cpus::get() + 8;
        assert_eq!(determine_allowed_cpus(many).unwrap(), many);
    }
}
