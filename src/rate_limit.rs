use dashmap::DashMap;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_PER_WINDOW: u32 = 8;
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);

// Rate limit entry - tracks requests per client in the current window
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

/// Fixed-window request counter keyed by client identifier.
///
/// Every check mutates the client's entry, rejected ones included, so a
/// client that keeps hammering stays over quota until its window rolls over.
/// A burst at the end of one window followed by a burst at the start of the
/// next is admitted (up to twice the quota in a short span).
#[derive(Debug)]
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    max_per_window: u32,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PER_WINDOW, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(max_per_window: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_per_window,
            window,
        }
    }

    pub fn max_per_window(&self) -> u32 {
        self.max_per_window
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admit or reject one request from `client_id` observed at `now`.
    pub fn check_admit(&self, client_id: &str, now: Instant) -> bool {
        // entry() holds the shard lock across read-increment-compare
        let mut entry = self
            .entries
            .entry(client_id.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        // first request or window expired..? start a fresh one
        if entry.count == 0 || self.is_expired(&entry, now) {
            entry.count = 1;
            entry.window_start = now;
            return true;
        }

        entry.count = entry.count.saturating_add(1);
        entry.count <= self.max_per_window
    }

    pub fn check(&self, client_id: &str) -> bool {
        self.check_admit(client_id, Instant::now())
    }

    /// Drop entries whose window has already expired.
    ///
    /// An expired entry is reset on its next read anyway, so removing it
    /// never changes an admit/reject decision.
    pub fn purge_stale(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry, now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, client_id: &str) -> Option<RateLimitEntry> {
        self.entries.get(client_id).map(|e| *e)
    }

    fn is_expired(&self, entry: &RateLimitEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.window_start) > self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(8, Duration::from_millis(60_000))
    }

    #[test]
    fn admits_up_to_quota_then_rejects() {
        let limiter = limiter();
        let t0 = Instant::now();

        for i in 0..8 {
            assert!(limiter.check_admit("a", t0), "request {} should pass", i + 1);
        }
        assert!(!limiter.check_admit("a", t0));
        assert_eq!(limiter.entry("a").unwrap().count, 9);
    }

    #[test]
    fn default_is_eight_per_minute() {
        let limiter = RateLimiter::default();
        assert_eq!(limiter.max_per_window(), 8);
        assert_eq!(limiter.window(), Duration::from_secs(60));
        assert!(limiter.is_empty());
    }

    #[test]
    fn window_rollover_resets_count() {
        let limiter = limiter();
        let t0 = Instant::now();

        for _ in 0..9 {
            limiter.check_admit("a", t0);
        }

        let later = t0 + Duration::from_millis(60_001);
        assert!(limiter.check_admit("a", later));

        let entry = limiter.entry("a").unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.window_start, later);
    }

    #[test]
    fn exactly_one_window_later_is_still_same_window() {
        let limiter = limiter();
        let t0 = Instant::now();

        for _ in 0..8 {
            limiter.check_admit("a", t0);
        }
        assert!(!limiter.check_admit("a", t0 + Duration::from_millis(60_000)));
    }

    #[test]
    fn rejections_keep_counting() {
        let limiter = RateLimiter::new(2, Duration::from_millis(1_000));
        let t0 = Instant::now();

        for _ in 0..50 {
            limiter.check_admit("a", t0);
        }
        assert_eq!(limiter.entry("a").unwrap().count, 50);

        // still the same window, still rejected
        assert!(!limiter.check_admit("a", t0 + Duration::from_millis(999)));
        assert_eq!(limiter.entry("a").unwrap().count, 51);

        // after rollover the backlog is forgotten
        assert!(limiter.check_admit("a", t0 + Duration::from_millis(1_001)));
        assert!(limiter.check_admit("a", t0 + Duration::from_millis(1_002)));
        assert!(!limiter.check_admit("a", t0 + Duration::from_millis(1_003)));
    }

    #[test]
    fn clients_are_independent() {
        let limiter = limiter();
        let t0 = Instant::now();

        for _ in 0..20 {
            limiter.check_admit("a", t0);
        }
        assert!(!limiter.check_admit("a", t0));
        assert!(limiter.check_admit("b", t0));
        assert_eq!(limiter.entry("b").unwrap().count, 1);
    }

    #[test]
    fn boundary_burst_is_allowed() {
        let limiter = RateLimiter::new(3, Duration::from_millis(100));
        let t0 = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_admit("a", t0 + Duration::from_millis(99)));
        }
        // the window opened at the first request, so t0+99+101 is a new one
        for _ in 0..3 {
            assert!(limiter.check_admit("a", t0 + Duration::from_millis(200)));
        }
    }

    #[test]
    fn purge_removes_only_expired_entries() {
        let limiter = limiter();
        let t0 = Instant::now();

        limiter.check_admit("old", t0);
        limiter.check_admit("fresh", t0 + Duration::from_millis(30_000));

        let removed = limiter.purge_stale(t0 + Duration::from_millis(60_500));
        assert_eq!(removed, 1);
        assert!(limiter.entry("old").is_none());
        assert!(limiter.entry("fresh").is_some());
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn concurrent_checks_never_exceed_quota() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU32, Ordering};

        let limiter = Arc::new(limiter());
        let admitted = Arc::new(AtomicU32::new(0));
        let t0 = Instant::now();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let admitted = Arc::clone(&admitted);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        if limiter.check_admit("shared", t0) {
                            admitted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::Relaxed), 8);
        assert_eq!(limiter.entry("shared").unwrap().count, 160);
    }
}
