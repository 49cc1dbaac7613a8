use crate::types::HealthRes;

/// Simple health service used by the web host and its binaries.
///
/// This service provides a standardised way to check the health status of the PHQ-9 app.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "PHQ-9 is alive".into(),
        }
    }
}
