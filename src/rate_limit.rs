use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Client-side limiter: a single implicit identifier (the local session),
/// tracked as a time-ordered sequence of accepted timestamps.
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    timestamps: VecDeque<Instant>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            timestamps: VecDeque::new(),
        }
    }

    /// Returns `true` if the action is admitted and records it; rejection
    /// records nothing and has no other side effect.
    pub fn check_and_record(&mut self) -> bool {
        self.check_and_record_at(Instant::now())
    }

    fn check_and_record_at(&mut self, now: Instant) -> bool {
        while let Some(oldest) = self.timestamps.front() {
            if now.duration_since(*oldest) >= self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() >= self.max_requests {
            return false;
        }
        self.timestamps.push_back(now);
        true
    }
}

struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Server-side limiter: a fixed window per identifier (caller IP, or the
/// shared `"unknown"` bucket). Entries are created lazily and reset lazily
/// once their window has elapsed; they are never explicitly evicted.
///
/// The map sits behind a mutex so concurrent invocations cannot lose
/// increments on the same key.
pub struct KeyedRateLimiter {
    max_requests: u32,
    window: Duration,
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl KeyedRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn check_and_record(&self, identifier: &str) -> bool {
        self.check_and_record_at(identifier, Instant::now())
    }

    fn check_and_record_at(&self, identifier: &str, now: Instant) -> bool {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            // A poisoned map still holds valid counters.
            Err(poisoned) => poisoned.into_inner(),
        };

        match entries.get_mut(identifier) {
            Some(entry) if now <= entry.reset_at => {
                if entry.count >= self.max_requests {
                    return false;
                }
                entry.count += 1;
                true
            }
            _ => {
                entries.insert(
                    identifier.to_string(),
                    WindowEntry {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }
}
