use std::time::{Duration, Instant};

use freight_core::{RateLimiter, DEFAULT_WINDOW};

#[test]
fn first_fifteen_calls_do_not_wait() {
    let start = Instant::now();
    let mut limiter = RateLimiter::with_defaults(start);
    for call in 0..15 {
        let now = start + Duration::from_millis(call * 100);
        assert_eq!(limiter.reserve(now), Duration::ZERO);
    }
    assert_eq!(limiter.calls_in_window(), 15);
}

#[test]
fn sixteenth_call_waits_for_window_to_elapse() {
    let start = Instant::now();
    let mut limiter = RateLimiter::with_defaults(start);

    let mut now = start;
    for _ in 0..15 {
        now += Duration::from_millis(50);
        limiter.reserve(now);
    }
    let wait = limiter.reserve(now);
    let begins_at = now + wait;

    let epsilon = Duration::from_millis(1);
    assert!(begins_at.duration_since(start) >= DEFAULT_WINDOW);
    assert!(begins_at.duration_since(start) <= DEFAULT_WINDOW + epsilon);
    assert_eq!(limiter.window_start(), begins_at);
    assert_eq!(limiter.calls_in_window(), 1);
}

#[test]
fn no_wait_when_window_already_elapsed() {
    let start = Instant::now();
    let mut limiter = RateLimiter::new(2, Duration::from_secs(10), start);
    limiter.reserve(start);
    limiter.reserve(start);

    let later = start + Duration::from_secs(12);
    assert_eq!(limiter.reserve(later), Duration::ZERO);
    assert_eq!(limiter.window_start(), later);
}

#[test]
fn reset_opens_a_fresh_window() {
    let start = Instant::now();
    let mut limiter = RateLimiter::new(1, Duration::from_secs(10), start);
    limiter.reserve(start);

    let restart = start + Duration::from_secs(1);
    limiter.reset(restart);
    assert_eq!(limiter.reserve(restart), Duration::ZERO);
    assert_eq!(limiter.reserve(restart), Duration::from_secs(10));
}

#[test]
fn zero_budget_is_treated_as_one_call() {
    let limiter = RateLimiter::new(0, Duration::from_secs(1), Instant::now());
    assert_eq!(limiter.max_calls(), 1);
}
