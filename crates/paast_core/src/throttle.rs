//! Per-client cooldown between accepted paste submissions.

use crate::error::AppError;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Outcome of [`SubmissionThrottle::allow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed,
    Denied { retry_after: Duration },
}

impl ThrottleDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Remaining wait rounded up to whole seconds; 0 when allowed.
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            Self::Allowed => 0,
            Self::Denied { retry_after } => {
                retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0)
            }
        }
    }

    /// Convert a denial into [`AppError::RateLimited`].
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied { .. } => Err(AppError::RateLimited {
                retry_after_secs: self.retry_after_secs(),
            }),
        }
    }
}

/// Throttle key for a connection peer: its IP address without the port.
///
/// IPv4-mapped IPv6 peers share a key with the plain IPv4 address.
pub fn client_key(peer: &SocketAddr) -> String {
    ip_key(peer.ip())
}

/// Throttle key for a bare client address, such as one reported by a proxy.
pub fn ip_key(ip: IpAddr) -> String {
    ip.to_canonical().to_string()
}

/// Tracks the last accepted submission per client key.
///
/// Entries live for the lifetime of the process; there is no eviction.
#[derive(Debug)]
pub struct SubmissionThrottle {
    cooldown: Duration,
    last_accepted: Mutex<HashMap<String, Instant>>,
}

impl SubmissionThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Check `client` against its cooldown at the current instant.
    ///
    /// # Errors
    /// Returns [`AppError::LockPoisoned`] if the table lock is poisoned.
    pub fn allow(&self, client: &str) -> Result<ThrottleDecision, AppError> {
        self.allow_at(client, Instant::now())
    }

    /// Check `client` against its cooldown at `now`.
    ///
    /// Allowed calls record `now` as the client's last accepted submission.
    /// Denied calls leave the entry untouched, so retrying early never pushes
    /// the window out.
    pub fn allow_at(&self, client: &str, now: Instant) -> Result<ThrottleDecision, AppError> {
        let mut table = self.table()?;
        if let Some(last) = table.get(client) {
            let next_eligible = *last + self.cooldown;
            if now < next_eligible {
                let retry_after = next_eligible - now;
                tracing::debug!(client, ?retry_after, "submission throttled");
                return Ok(ThrottleDecision::Denied { retry_after });
            }
        }
        table.insert(client.to_string(), now);
        Ok(ThrottleDecision::Allowed)
    }

    /// Number of client keys seen so far.
    pub fn tracked_clients(&self) -> Result<usize, AppError> {
        Ok(self.table()?.len())
    }

    fn table(&self) -> Result<MutexGuard<'_, HashMap<String, Instant>>, AppError> {
        self.last_accepted
            .lock()
            .map_err(|_| AppError::LockPoisoned("throttle"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::sync::{Arc, Barrier};
    use std::thread;

    const WINDOW: Duration = Duration::from_secs(5);

    #[test]
    fn first_submission_is_allowed() {
        let throttle = SubmissionThrottle::new(WINDOW);
        let decision = throttle.allow("10.0.0.1").unwrap();
        assert!(decision.is_allowed());
        assert_eq!(decision.retry_after_secs(), 0);
        assert_eq!(throttle.tracked_clients().unwrap(), 1);
    }

    #[test]
    fn client_is_denied_inside_window_and_allowed_at_its_end() {
        let throttle = SubmissionThrottle::new(WINDOW);
        let t0 = Instant::now();
        assert!(throttle.allow_at("10.0.0.1", t0).unwrap().is_allowed());

        let mut previous = u64::MAX;
        for millis in [1, 500, 1_000, 2_500, 4_000, 4_999] {
            let decision = throttle
                .allow_at("10.0.0.1", t0 + Duration::from_millis(millis))
                .unwrap();
            assert!(!decision.is_allowed(), "denied at +{millis}ms");
            assert!(decision.retry_after_secs() <= previous);
            previous = decision.retry_after_secs();
        }

        assert!(throttle.allow_at("10.0.0.1", t0 + WINDOW).unwrap().is_allowed());
    }

    #[test]
    fn retry_after_rounds_up_and_shrinks_each_second() {
        let throttle = SubmissionThrottle::new(WINDOW);
        let t0 = Instant::now();
        throttle.allow_at("client", t0).unwrap();

        let waits: Vec<u64> = [500, 1_500, 2_500, 3_500, 4_500]
            .into_iter()
            .map(|ms| {
                throttle
                    .allow_at("client", t0 + Duration::from_millis(ms))
                    .unwrap()
                    .retry_after_secs()
            })
            .collect();
        assert_eq!(waits, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn denied_attempts_do_not_extend_the_window() {
        let throttle = SubmissionThrottle::new(WINDOW);
        let t0 = Instant::now();
        throttle.allow_at("client", t0).unwrap();
        for secs in 1..5 {
            let decision = throttle
                .allow_at("client", t0 + Duration::from_secs(secs))
                .unwrap();
            assert!(!decision.is_allowed());
        }
        assert!(throttle
            .allow_at("client", t0 + Duration::from_secs(5))
            .unwrap()
            .is_allowed());
    }

    #[test]
    fn clients_are_throttled_independently() {
        let throttle = SubmissionThrottle::new(WINDOW);
        let t0 = Instant::now();
        assert!(throttle.allow_at("10.0.0.1", t0).unwrap().is_allowed());
        assert!(throttle.allow_at("10.0.0.2", t0).unwrap().is_allowed());
        assert!(!throttle.allow_at("10.0.0.1", t0).unwrap().is_allowed());
    }

    #[test]
    fn denial_converts_to_rate_limited_error() {
        let denied = ThrottleDecision::Denied {
            retry_after: Duration::from_millis(3_200),
        };
        match denied.into_result() {
            Err(AppError::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 4),
            other => panic!("unexpected {other:?}"),
        }
        assert!(ThrottleDecision::Allowed.into_result().is_ok());
    }

    #[test]
    fn simultaneous_submissions_from_one_client_allow_exactly_one() {
        let throttle = Arc::new(SubmissionThrottle::new(WINDOW));
        let barrier = Arc::new(Barrier::new(16));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let throttle = throttle.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    throttle.allow("192.168.1.7").unwrap().is_allowed()
                })
            })
            .collect();
        let allowed = handles
            .into_iter()
            .map(|h| h.join().expect("join"))
            .filter(|allowed| *allowed)
            .count();
        assert_eq!(allowed, 1);
    }

    #[test]
    fn client_key_strips_port_and_unmaps_ipv4() {
        let v4 = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9)), 51234);
        assert_eq!(client_key(&v4), "203.0.113.9");

        let mapped = SocketAddr::new(
            IpAddr::V6(Ipv4Addr::new(203, 0, 113, 9).to_ipv6_mapped()),
            443,
        );
        assert_eq!(client_key(&mapped), "203.0.113.9");

        let v6 = SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 8080);
        assert_eq!(client_key(&v6), "::1");
    }

    #[test]
    fn ip_key_matches_client_key_for_the_same_address() {
        let ip = IpAddr::V6(Ipv4Addr::new(198, 51, 100, 4).to_ipv6_mapped());
        assert_eq!(ip_key(ip), "198.51.100.4");
        assert_eq!(ip_key(ip), client_key(&SocketAddr::new(ip, 1)));
    }
}
