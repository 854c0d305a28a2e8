// 🎠 Carousel State Machine - autoplay with manual override
//
// States: Playing (timer armed) / Paused (no timer), both carrying the index.
//
//   tick (Playing only)      -> index + 1, stay Playing, re-arm
//   next / prev / go_to      -> move, always Paused
//   pause / resume / toggle  -> switch state, index untouched
//
// The armed timer lives in a `TimerGuard`; dropping the carousel drops the
// guard, which cancels the timer.

use crate::error::{CatalogError, CatalogResult};
use crate::timer::{TickToken, TimerGuard, TimerSource};
use std::time::Duration;

/// Autoplay period of the testimonials section
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
}

pub struct Carousel<T, S: TimerSource> {
    slides: Vec<T>,
    index: usize,
    interval: Duration,
    source: S,
    /// Some iff Playing
    timer: Option<TimerGuard>,
    generation: u64,
}

impl<T, S: TimerSource> Carousel<T, S> {
    /// Start Playing at index 0 with the timer armed
    pub fn new(slides: Vec<T>, source: S, interval: Duration) -> CatalogResult<Self> {
        if slides.is_empty() {
            return Err(CatalogError::EmptySequence);
        }

        let mut carousel = Carousel {
            slides,
            index: 0,
            interval,
            source,
            timer: None,
            generation: 0,
        };
        carousel.arm();
        Ok(carousel)
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// Timer fire. Honoured only while Playing and only for the armed token;
    /// returns whether the carousel advanced.
    pub fn on_tick(&mut self, token: TickToken) -> bool {
        let armed = self.timer.as_ref().map(TimerGuard::token);
        if armed != Some(token) {
            tracing::debug!(?token, ?armed, "ignoring stale carousel tick");
            return false;
        }

        self.index = (self.index + 1) % self.slides.len();
        self.arm();
        true
    }

    /// Manual navigation cancels autoplay
    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.slides.len();
        self.pause();
    }

    pub fn prev(&mut self) {
        let len = self.slides.len();
        self.index = (self.index + len - 1) % len;
        self.pause();
    }

    /// Jump to a slide; out-of-range leaves everything untouched
    pub fn go_to(&mut self, index: usize) -> CatalogResult<()> {
        let len = self.slides.len();
        if index >= len {
            return Err(CatalogError::IndexOutOfRange { index, len });
        }

        self.index = index;
        self.pause();
        Ok(())
    }

    /// Hover start. Idempotent.
    pub fn pause(&mut self) {
        if let Some(guard) = self.timer.take() {
            tracing::debug!(index = self.index, token = ?guard.token(), "carousel paused");
            drop(guard);
        }
    }

    /// Hover end. Idempotent.
    pub fn resume(&mut self) {
        if self.timer.is_none() {
            self.arm();
            tracing::debug!(index = self.index, "carousel resumed");
        }
    }

    /// User-facing play/pause control
    pub fn toggle_autoplay(&mut self) {
        match self.play_state() {
            PlayState::Playing => self.pause(),
            PlayState::Paused => self.resume(),
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &T {
        &self.slides[self.index]
    }

    pub fn is_playing(&self) -> bool {
        self.timer.is_some()
    }

    pub fn play_state(&self) -> PlayState {
        if self.is_playing() {
            PlayState::Playing
        } else {
            PlayState::Paused
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slides(&self) -> &[T] {
        &self.slides
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timer_source(&self) -> &S {
        &self.source
    }

    /// Cancel any previous timer before arming the next one
    fn arm(&mut self) {
        self.timer = None;
        self.generation += 1;
        let token = TickToken(self.generation);
        self.timer = Some(self.source.arm(token, self.interval));
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::DeadlineClock;
    use std::time::Instant;

    fn carousel(len: usize) -> (Carousel<usize, DeadlineClock>, DeadlineClock) {
        let clock = DeadlineClock::new();
        let carousel = Carousel::new((0..len).collect(), clock.clone(), DEFAULT_INTERVAL).unwrap();
        (carousel, clock)
    }

    /// Let the pending deadline elapse and deliver it
    fn fire(carousel: &mut Carousel<usize, DeadlineClock>, clock: &DeadlineClock) -> bool {
        match clock.take_due(Instant::now() + Duration::from_secs(3600)) {
            Some(token) => carousel.on_tick(token),
            None => false,
        }
    }

    #[test]
    fn test_starts_playing_at_zero() {
        let (carousel, clock) = carousel(3);
        assert_eq!(carousel.current_index(), 0);
        assert!(carousel.is_playing());
        assert!(clock.is_armed());
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let result = Carousel::<u8, _>::new(vec![], DeadlineClock::new(), DEFAULT_INTERVAL);
        assert!(matches!(result, Err(CatalogError::EmptySequence)));
    }

    #[test]
    fn test_ticks_then_prev() {
        let (mut carousel, clock) = carousel(5);
        for _ in 0..3 {
            assert!(fire(&mut carousel, &clock));
        }
        assert_eq!(carousel.current_index(), 3);
        assert!(carousel.is_playing());

        carousel.prev();
        assert_eq!(carousel.current_index(), 2);
        assert_eq!(carousel.play_state(), PlayState::Paused);
        assert!(!clock.is_armed());
    }

    #[test]
    fn test_wraps_both_ways() {
        let (mut carousel, _clock) = carousel(3);
        carousel.prev();
        assert_eq!(carousel.current_index(), 2);
        carousel.next();
        assert_eq!(carousel.current_index(), 0);
    }

    #[test]
    fn test_tick_wraps_to_zero() {
        let (mut carousel, clock) = carousel(2);
        fire(&mut carousel, &clock);
        fire(&mut carousel, &clock);
        assert_eq!(carousel.current_index(), 0);
    }

    #[test]
    fn test_go_to_out_of_range_changes_nothing() {
        let (mut carousel, _clock) = carousel(5);
        let err = carousel.go_to(10).unwrap_err();

        assert_eq!(err, CatalogError::IndexOutOfRange { index: 10, len: 5 });
        assert_eq!(carousel.current_index(), 0);
        assert!(carousel.is_playing());
    }

    #[test]
    fn test_navigation_always_pauses() {
        let (mut carousel, _clock) = carousel(4);

        carousel.go_to(3).unwrap();
        assert_eq!(carousel.current_index(), 3);
        assert!(!carousel.is_playing());

        carousel.resume();
        carousel.next();
        assert!(!carousel.is_playing());

        carousel.resume();
        carousel.prev();
        assert!(!carousel.is_playing());
    }

    #[test]
    fn test_no_tick_while_paused() {
        let (mut carousel, clock) = carousel(4);
        let stale = clock.take_due(Instant::now() + Duration::from_secs(60)).unwrap();

        carousel.pause();
        assert!(!carousel.on_tick(stale));
        assert!(!fire(&mut carousel, &clock));
        assert_eq!(carousel.current_index(), 0);
    }

    #[test]
    fn test_pause_resume_no_missed_or_double_advance() {
        let (mut carousel, clock) = carousel(4);

        carousel.pause();
        carousel.pause();
        carousel.resume();
        carousel.resume();
        assert!(carousel.is_playing());
        assert_eq!(carousel.current_index(), 0);

        // exactly one pending fire
        assert!(fire(&mut carousel, &clock));
        assert_eq!(carousel.current_index(), 1);
    }

    #[test]
    fn test_stale_token_after_rearm_is_ignored() {
        let (mut carousel, clock) = carousel(4);
        let first = clock.take_due(Instant::now() + Duration::from_secs(60)).unwrap();

        carousel.pause();
        carousel.resume();
        assert!(!carousel.on_tick(first));
        assert_eq!(carousel.current_index(), 0);
    }

    #[test]
    fn test_toggle_autoplay() {
        let (mut carousel, clock) = carousel(3);
        carousel.toggle_autoplay();
        assert!(!carousel.is_playing());
        assert!(!clock.is_armed());

        carousel.toggle_autoplay();
        assert!(carousel.is_playing());
        assert!(clock.is_armed());
    }

    #[test]
    fn test_teardown_cancels_timer() {
        let (carousel, clock) = carousel(3);
        drop(carousel);
        assert!(!clock.is_armed());
    }

    #[test]
    fn test_teardown_on_unwind_cancels_timer() {
        let (carousel, clock) = carousel(3);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _owned = carousel;
            panic!("view crashed");
        }));

        assert!(result.is_err());
        assert!(!clock.is_armed());
    }
}
