//! Fixed-window admission control keyed by (rule scope, client).
//!
//! Each bucket records a counter and the instant its window opened. Once a
//! full window has elapsed the counter resets and the window restarts at the
//! current instant. Fixed windows allow a burst of up to twice the limit
//! across a window boundary; that is accepted in exchange for O(1) state per
//! bucket.
//!
//! All rules that apply to a request are checked and charged under a single
//! lock acquisition: either every bucket is incremented or none is. Rejected
//! requests never consume quota.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::quota::QuotaRule;

/// Source of the current instant. Swapped out in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The monotonic system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// The request would exceed `scope`'s quota. Try again after `retry_after`.
    Rejected { scope: String, retry_after: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BucketKey {
    scope: String,
    client: String,
}

#[derive(Debug)]
struct QuotaBucket {
    count: u32,
    window_start: Instant,
    window: Duration,
}

impl QuotaBucket {
    fn new(now: Instant, window: Duration) -> Self {
        Self {
            count: 0,
            window_start: now,
            window,
        }
    }

    fn expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.window_start) >= self.window
    }

    /// Start a fresh window if the current one has run out.
    fn roll(&mut self, now: Instant) {
        if self.expired(now) {
            self.count = 0;
            self.window_start = now;
        }
    }

    fn remaining(&self, now: Instant) -> Duration {
        self.window
            .saturating_sub(now.saturating_duration_since(self.window_start))
    }
}

/// Per-client request quotas shared by every request handler.
pub struct AdmissionController {
    buckets: Mutex<HashMap<BucketKey, QuotaBucket>>,
    exempt: HashSet<String>,
    clock: Arc<dyn Clock>,
}

impl AdmissionController {
    pub fn new(exempt: impl IntoIterator<Item = String>) -> Self {
        Self::with_clock(exempt, Arc::new(SystemClock))
    }

    pub fn with_clock(exempt: impl IntoIterator<Item = String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            exempt: exempt.into_iter().collect(),
            clock,
        }
    }

    pub fn is_exempt(&self, client: &str) -> bool {
        self.exempt.contains(client)
    }

    /// Admit `client` only if every rule in `rules` has room, charging each
    /// of them once on success.
    pub fn admit(&self, client: &str, rules: &[QuotaRule]) -> Admission {
        if self.is_exempt(client) {
            return Admission::Admitted;
        }

        let now = self.clock.now();
        let mut buckets = self.buckets.lock();

        let mut blocked: Option<(&str, Duration)> = None;
        for rule in rules {
            let bucket = buckets
                .entry(key(rule, client))
                .or_insert_with(|| QuotaBucket::new(now, rule.window()));
            bucket.roll(now);

            if bucket.count >= rule.limit() {
                let retry_after = bucket.remaining(now);
                // Every rule must pass, so the longest wait is the real one.
                if blocked.is_none_or(|(_, longest)| retry_after > longest) {
                    blocked = Some((rule.scope(), retry_after));
                }
            }
        }

        if let Some((scope, retry_after)) = blocked {
            debug!(client, scope, ?retry_after, "quota exhausted");
            return Admission::Rejected {
                scope: scope.to_string(),
                retry_after,
            };
        }

        for rule in rules {
            if let Some(bucket) = buckets.get_mut(&key(rule, client)) {
                bucket.count += 1;
            }
        }
        Admission::Admitted
    }

    /// Requests charged to `client` under `scope` in the current window.
    pub fn count(&self, client: &str, scope: &str) -> u32 {
        let now = self.clock.now();
        let key = BucketKey {
            scope: scope.to_string(),
            client: client.to_string(),
        };
        self.buckets
            .lock()
            .get(&key)
            .filter(|b| !b.expired(now))
            .map_or(0, |b| b.count)
    }

    /// Number of live buckets.
    pub fn tracked_buckets(&self) -> usize {
        self.buckets.lock().len()
    }

    /// Drop buckets whose window has run out. Such a bucket would reset on
    /// its next use anyway, so removing it changes no admission decision.
    ///
    /// Returns the number of buckets removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock();
        let before = buckets.len();
        buckets.retain(|_, bucket| !bucket.expired(now));
        before - buckets.len()
    }
}

fn key(rule: &QuotaRule, client: &str) -> BucketKey {
    BucketKey {
        scope: rule.scope().to_string(),
        client: client.to_string(),
    }
}

/// Hand-driven clock for tests.
#[cfg(test)]
pub(crate) struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        })
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn rule(scope: &str, limit: u32, secs: u64) -> QuotaRule {
        QuotaRule::new(scope, limit, Duration::from_secs(secs)).unwrap()
    }

    fn controller(clock: &Arc<ManualClock>) -> AdmissionController {
        AdmissionController::with_clock(["127.0.0.1".to_string()], clock.clone())
    }

    #[test]
    fn admits_up_to_limit_then_rejects() {
        let clock = ManualClock::new();
        let ctl = controller(&clock);
        let rules = [rule("/predict", 3, 60)];

        for _ in 0..3 {
            assert_eq!(ctl.admit("10.0.0.1", &rules), Admission::Admitted);
        }
        assert!(matches!(
            ctl.admit("10.0.0.1", &rules),
            Admission::Rejected { .. }
        ));
    }

    #[test]
    fn clients_have_independent_buckets() {
        let clock = ManualClock::new();
        let ctl = controller(&clock);
        let rules = [rule("/predict", 2, 60)];

        ctl.admit("10.0.0.1", &rules);
        ctl.admit("10.0.0.1", &rules);
        assert!(matches!(
            ctl.admit("10.0.0.1", &rules),
            Admission::Rejected { .. }
        ));
        assert_eq!(ctl.admit("10.0.0.2", &rules), Admission::Admitted);
    }

    #[test]
    fn rejection_does_not_consume_quota() {
        let clock = ManualClock::new();
        let ctl = controller(&clock);
        let rules = [rule("/predict", 2, 60)];

        ctl.admit("c", &rules);
        ctl.admit("c", &rules);
        for _ in 0..10 {
            ctl.admit("c", &rules);
        }
        assert_eq!(ctl.count("c", "/predict"), 2);
    }

    #[test]
    fn window_resets_after_full_window() {
        let clock = ManualClock::new();
        let ctl = controller(&clock);
        let rules = [rule("/predict", 2, 60)];

        ctl.admit("c", &rules);
        ctl.admit("c", &rules);

        clock.advance(Duration::from_secs(59));
        assert!(matches!(ctl.admit("c", &rules), Admission::Rejected { .. }));

        clock.advance(Duration::from_secs(1));
        assert_eq!(ctl.admit("c", &rules), Admission::Admitted);
        assert_eq!(ctl.count("c", "/predict"), 1);
    }

    #[test]
    fn fixed_window_allows_boundary_burst() {
        // Documented tradeoff: limit requests at the end of one window and
        // limit more at the start of the next.
        let clock = ManualClock::new();
        let ctl = controller(&clock);
        let rules = [rule("/predict", 5, 60)];

        ctl.admit("c", &rules);
        clock.advance(Duration::from_secs(59));
        for _ in 0..4 {
            assert_eq!(ctl.admit("c", &rules), Admission::Admitted);
        }
        clock.advance(Duration::from_secs(1));
        for _ in 0..5 {
            assert_eq!(ctl.admit("c", &rules), Admission::Admitted);
        }
    }

    #[test]
    fn retry_hint_is_time_left_in_window() {
        let clock = ManualClock::new();
        let ctl = controller(&clock);
        let rules = [rule("/predict", 1, 60)];

        ctl.admit("c", &rules);
        clock.advance(Duration::from_secs(45));
        assert_eq!(
            ctl.admit("c", &rules),
            Admission::Rejected {
                scope: "/predict".into(),
                retry_after: Duration::from_secs(15),
            }
        );
    }

    #[test]
    fn every_rule_must_pass() {
        let clock = ManualClock::new();
        let ctl = controller(&clock);
        let global = rule("global", 3, 3_600);
        let predict = [global.clone(), rule("/predict", 10, 60)];
        let index = [global, rule("/", 10, 60)];

        ctl.admit("c", &predict);
        ctl.admit("c", &index);
        ctl.admit("c", &predict);

        // Global is shared across routes and is now exhausted.
        assert_eq!(
            ctl.admit("c", &index),
            Admission::Rejected {
                scope: "global".into(),
                retry_after: Duration::from_secs(3_600),
            }
        );
        assert_eq!(ctl.count("c", "global"), 3);
        assert_eq!(ctl.count("c", "/predict"), 2);
        assert_eq!(ctl.count("c", "/"), 1);
    }

    #[test]
    fn rejection_by_one_rule_charges_none() {
        let clock = ManualClock::new();
        let ctl = controller(&clock);
        let rules = [rule("global", 100, 3_600), rule("/predict", 1, 60)];

        ctl.admit("c", &rules);
        assert!(matches!(ctl.admit("c", &rules), Admission::Rejected { .. }));
        assert_eq!(ctl.count("c", "global"), 1);
    }

    #[test]
    fn longest_wait_wins_when_several_rules_block() {
        let clock = ManualClock::new();
        let ctl = controller(&clock);
        let rules = [rule("/predict", 1, 60), rule("global", 1, 3_600)];

        ctl.admit("c", &rules);
        assert_eq!(
            ctl.admit("c", &rules),
            Admission::Rejected {
                scope: "global".into(),
                retry_after: Duration::from_secs(3_600),
            }
        );
    }

    #[test]
    fn exempt_client_is_always_admitted() {
        let clock = ManualClock::new();
        let ctl = controller(&clock);
        let rules = [rule("/predict", 1, 60)];

        for _ in 0..1_000 {
            assert_eq!(ctl.admit("127.0.0.1", &rules), Admission::Admitted);
        }
        assert_eq!(ctl.tracked_buckets(), 0);
    }

    #[test]
    fn no_rules_means_admitted() {
        let ctl = AdmissionController::new(Vec::new());
        assert_eq!(ctl.admit("c", &[]), Admission::Admitted);
    }

    #[test]
    fn purge_removes_only_expired_buckets() {
        let clock = ManualClock::new();
        let ctl = controller(&clock);
        let short = [rule("/predict", 5, 60)];
        let long = [rule("global", 5, 3_600)];

        ctl.admit("a", &short);
        ctl.admit("a", &long);
        ctl.admit("b", &short);
        assert_eq!(ctl.tracked_buckets(), 3);

        clock.advance(Duration::from_secs(61));
        assert_eq!(ctl.purge_expired(), 2);
        assert_eq!(ctl.tracked_buckets(), 1);
        assert_eq!(ctl.count("a", "global"), 1);
    }

    #[test]
    fn concurrent_admits_never_exceed_limit() {
        let ctl = Arc::new(AdmissionController::new(Vec::new()));
        let rules: Arc<[QuotaRule]> = Arc::from(vec![
            rule("global", 1_000, 3_600),
            rule("/predict", 50, 60),
        ]);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ctl = Arc::clone(&ctl);
                let rules = Arc::clone(&rules);
                thread::spawn(move || {
                    (0..20)
                        .filter(|_| ctl.admit("same-client", &rules) == Admission::Admitted)
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
        assert_eq!(ctl.count("same-client", "/predict"), 50);
        assert_eq!(ctl.count("same-client", "global"), 50);
    }
}
