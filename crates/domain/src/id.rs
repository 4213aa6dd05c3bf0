//! ID generation utilities.
//!
//! Collections, requests and history items are keyed by a 64-bit integer
//! derived from the wall clock in milliseconds. Ids handed out by one process
//! are strictly increasing even when several are requested within the same
//! millisecond.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generates a new unique, time-based identifier.
#[must_use]
pub fn generate_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_ID.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_uniqueness() {
        let id1 = generate_id();
        let id2 = generate_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_id_is_monotonic() {
        let ids: Vec<i64> = (0..1000).map(|_| generate_id()).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_generate_id_tracks_wall_clock() {
        let before = Utc::now().timestamp_millis();
        let id = generate_id();
        assert!(id >= before);
    }
}
