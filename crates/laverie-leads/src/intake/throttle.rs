use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use crate::config::RateLimitConfig;

/// Sliding-window admission control keyed by client identifier.
///
/// The window map is the only cross-request shared mutable state in the
/// crate. Admission is fully synchronous, so the lock is never held across
/// an await point. Clients behind the same proxy or NAT share one bucket;
/// that is accepted behavior for a low-volume lead form.
pub struct SubmissionThrottle {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Vec<Instant>>>,
}

impl SubmissionThrottle {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or refuse one submission from `client_id`, recording it on
    /// admission. Refused submissions are not recorded.
    pub fn admit(&self, client_id: &str) -> bool {
        self.admit_at(client_id, Instant::now())
    }

    fn admit_at(&self, client_id: &str, now: Instant) -> bool {
        if !self.config.enabled {
            return true;
        }

        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Prune every bucket, dropping the ones that empty out, so memory
        // stays bounded under churn of distinct identifiers.
        windows.retain(|_, stamps| {
            stamps.retain(|stamp| now.duration_since(*stamp) < self.config.window);
            !stamps.is_empty()
        });

        let stamps = windows.entry(client_id.to_string()).or_default();
        if stamps.len() >= self.config.max_submissions {
            return false;
        }

        stamps.push(now);
        true
    }
}
