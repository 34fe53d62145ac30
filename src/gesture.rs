//! Turns a horizontal card drag into a vote.
//!
//! Voting is purely geometric: the first time the card's box leaves the
//! container completely on one side, that side wins (right accepts, left
//! rejects). Release velocity decides whether the card is thrown off screen
//! or springs back. A thrown card ends up fully outside the container on the
//! side it was thrown to, so the throw counts as an exit on that side.

use crate::session::Vote;
use log::debug;
use std::collections::VecDeque;

const VELOCITY_WINDOW_MS: f64 = 100.0;
const MAX_VELOCITY_SAMPLES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Minimum release speed in px/s for the card to be thrown away.
    pub min_fly_force: f64,
    /// Speed in px/s from which a release has a direction at all.
    pub direction_threshold: f64,
    /// Share of the pointer travel applied to a card that is still constrained.
    pub drag_elastic: f64,
}

impl GestureConfig {
    /// Card offset for a pointer that travelled `travel` pixels.
    pub fn offset(&self, travel: f64) -> f64 {
        travel * self.drag_elastic
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_fly_force: 300.0,
            direction_threshold: 1.0,
            drag_elastic: 0.7,
        }
    }
}

/// Horizontal extent of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(left: f64, width: f64) -> Self {
        Self {
            left,
            right: left + width,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn translated(&self, dx: f64) -> Self {
        Self {
            left: self.left + dx,
            right: self.right + dx,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn from_velocity(velocity: f64, threshold: f64) -> Option<Self> {
        if velocity >= threshold {
            Some(Direction::Right)
        } else if velocity <= -threshold {
            Some(Direction::Left)
        } else {
            None
        }
    }

    /// Side of the container a card leaves through when moving this way.
    pub fn vote(self) -> Vote {
        match self {
            Direction::Left => Vote::Reject,
            Direction::Right => Vote::Accept,
        }
    }

    fn sign(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

pub fn exit_vote(card: &Rect, container: &Rect) -> Option<Vote> {
    if container.left >= card.right {
        Some(Vote::Reject)
    } else if container.right <= card.left {
        Some(Vote::Accept)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    FlyAway { direction: Direction, distance: f64 },
    SnapBack,
}

/// Per-drag state. A new session is started for every pointer-down.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    vote: Option<Vote>,
}

impl DragSession {
    pub fn start() -> Self {
        Self::default()
    }

    /// Vote already cast during this drag, if any.
    pub fn vote(&self) -> Option<Vote> {
        self.vote
    }

    /// Returns a vote at most once per drag. Missing geometry is inconclusive.
    pub fn sample(&mut self, card: Option<Rect>, container: Option<Rect>) -> Option<Vote> {
        if self.vote.is_some() {
            return None;
        }

        let (Some(card), Some(container)) = (card, container) else {
            debug!("Card geometry unavailable, skipping sample");
            return None;
        };

        let vote = exit_vote(&card, &container)?;
        self.record(vote)
    }

    /// Vote for a card thrown off screen in `direction`. Like `sample`, it
    /// yields nothing if this drag already voted.
    pub fn throw(&mut self, direction: Direction) -> Option<Vote> {
        self.record(direction.vote())
    }

    fn record(&mut self, vote: Vote) -> Option<Vote> {
        if self.vote.is_some() {
            return None;
        }
        self.vote = Some(vote);
        Some(vote)
    }

    pub fn release(
        &self,
        velocity: f64,
        card: Option<Rect>,
        container: Option<Rect>,
        config: &GestureConfig,
    ) -> Release {
        let Some(direction) = Direction::from_velocity(velocity, config.direction_threshold) else {
            return Release::SnapBack;
        };
        if velocity.abs() < config.min_fly_force {
            return Release::SnapBack;
        }

        let (Some(card), Some(container)) = (card, container) else {
            debug!("Card geometry unavailable on release, snapping back");
            return Release::SnapBack;
        };

        let distance = direction.sign() * (container.width() / 2.0 + card.width() / 2.0);
        Release::FlyAway {
            direction,
            distance,
        }
    }
}

/// Horizontal velocity estimate from recent `(position, timestamp)` samples.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(f64, f64)>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, position: f64, time_ms: f64) {
        if self.samples.len() == MAX_VELOCITY_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back((position, time_ms));
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Pixels per second across the samples of the last 100 ms.
    pub fn velocity(&self) -> f64 {
        let Some(&(last_position, last_time)) = self.samples.back() else {
            return 0.0;
        };

        let first = self
            .samples
            .iter()
            .find(|(_, time)| last_time - time <= VELOCITY_WINDOW_MS);

        match first {
            Some(&(position, time)) if last_time > time => {
                (last_position - position) / (last_time - time) * 1000.0
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Rect {
        Rect::new(0.0, 400.0)
    }

    fn centered_card() -> Rect {
        Rect::new(100.0, 200.0)
    }

    #[test]
    fn exit_on_the_right_accepts_once() {
        let mut drag = DragSession::start();
        let card = centered_card();

        assert_eq!(drag.sample(Some(card), Some(container())), None);
        assert_eq!(drag.sample(Some(card.translated(250.0)), Some(container())), None);
        assert_eq!(
            drag.sample(Some(card.translated(301.0)), Some(container())),
            Some(Vote::Accept)
        );
        assert_eq!(drag.sample(Some(card.translated(350.0)), Some(container())), None);
        assert_eq!(drag.sample(Some(card.translated(-400.0)), Some(container())), None);
        assert_eq!(drag.vote(), Some(Vote::Accept));
    }

    #[test]
    fn exit_on_the_left_rejects() {
        let mut drag = DragSession::start();
        assert_eq!(
            drag.sample(Some(centered_card().translated(-300.0)), Some(container())),
            Some(Vote::Reject)
        );
    }

    #[test]
    fn touching_edges_count_as_exit() {
        assert_eq!(
            exit_vote(&Rect::new(400.0, 200.0), &container()),
            Some(Vote::Accept)
        );
        assert_eq!(
            exit_vote(&Rect::new(-200.0, 200.0), &container()),
            Some(Vote::Reject)
        );
        assert_eq!(exit_vote(&Rect::new(399.0, 200.0), &container()), None);
    }

    #[test]
    fn missing_geometry_is_inconclusive() {
        let mut drag = DragSession::start();
        let far_right = centered_card().translated(1000.0);
        assert_eq!(drag.sample(None, Some(container())), None);
        assert_eq!(drag.sample(Some(far_right), None), None);
        assert_eq!(drag.vote(), None);
        assert_eq!(
            drag.sample(Some(far_right), Some(container())),
            Some(Vote::Accept)
        );
    }

    #[test]
    fn fast_release_flies_off_by_half_widths() {
        let drag = DragSession::start();
        let config = GestureConfig::default();

        let release = drag.release(800.0, Some(centered_card()), Some(container()), &config);
        assert_eq!(
            release,
            Release::FlyAway {
                direction: Direction::Right,
                distance: 300.0,
            }
        );

        let release = drag.release(-300.0, Some(centered_card()), Some(container()), &config);
        assert_eq!(
            release,
            Release::FlyAway {
                direction: Direction::Left,
                distance: -300.0,
            }
        );
    }

    #[test]
    fn every_throw_votes_for_its_direction() {
        let config = GestureConfig::default();

        // container widths from 200 to 1400 px in 1/60 px steps
        for step in 0..72_000u32 {
            let width = 200.0 + f64::from(step) / 60.0;
            let container = Rect::new(0.0, width);
            let inset = width * 0.08;
            let card = Rect::new(inset, width - 2.0 * inset);

            for (velocity, expected) in [(800.0, Vote::Accept), (-800.0, Vote::Reject)] {
                let mut drag = DragSession::start();
                let release = drag.release(velocity, Some(card), Some(container), &config);
                let Release::FlyAway { direction, distance } = release else {
                    panic!("expected fly away at width {width}, got {release:?}");
                };
                assert_eq!(distance.signum(), velocity.signum());
                assert_eq!(drag.throw(direction), Some(expected), "width {width}");
                assert_eq!(drag.throw(direction), None);
                assert_eq!(drag.vote(), Some(expected));
            }
        }
    }

    #[test]
    fn throw_after_mid_drag_exit_does_not_vote_again() {
        let mut drag = DragSession::start();
        let card = centered_card().translated(320.0);

        assert_eq!(drag.sample(Some(card), Some(container())), Some(Vote::Accept));
        assert_eq!(drag.throw(Direction::Left), None);
        assert_eq!(drag.vote(), Some(Vote::Accept));
    }

    #[test]
    fn slow_release_snaps_back_without_voting() {
        let mut drag = DragSession::start();
        let config = GestureConfig::default();
        let card = centered_card().translated(120.0);

        assert_eq!(drag.sample(Some(card), Some(container())), None);
        assert_eq!(
            drag.release(299.0, Some(card), Some(container()), &config),
            Release::SnapBack
        );
        assert_eq!(
            drag.release(0.5, Some(card), Some(container()), &config),
            Release::SnapBack
        );
        assert_eq!(drag.vote(), None);
    }

    #[test]
    fn flick_that_crossed_mid_drag_keeps_its_vote() {
        let mut drag = DragSession::start();
        let card = centered_card().translated(-310.0);

        assert_eq!(drag.sample(Some(card), Some(container())), Some(Vote::Reject));
        assert_eq!(
            drag.release(-50.0, Some(card), Some(container()), &GestureConfig::default()),
            Release::SnapBack
        );
        assert_eq!(drag.vote(), Some(Vote::Reject));
    }

    #[test]
    fn release_without_geometry_snaps_back() {
        let release = DragSession::start().release(900.0, None, None, &GestureConfig::default());
        assert_eq!(release, Release::SnapBack);
    }

    #[test]
    fn direction_needs_threshold_speed() {
        assert_eq!(Direction::from_velocity(1.0, 1.0), Some(Direction::Right));
        assert_eq!(Direction::from_velocity(-1.0, 1.0), Some(Direction::Left));
        assert_eq!(Direction::from_velocity(0.9, 1.0), None);
    }

    #[test]
    fn offset_is_damped_by_elasticity() {
        let offset = GestureConfig::default().offset(100.0);
        assert!((offset - 70.0).abs() < 1e-9);
    }

    #[test]
    fn velocity_uses_recent_window() {
        let mut tracker = VelocityTracker::new();
        assert_eq!(tracker.velocity(), 0.0);

        tracker.push(0.0, 0.0);
        assert_eq!(tracker.velocity(), 0.0);

        tracker.push(500.0, 500.0);
        tracker.push(520.0, 520.0);
        tracker.push(560.0, 560.0);
        // samples older than 100 ms are ignored
        assert!((tracker.velocity() - 1000.0).abs() < 1e-9);

        tracker.push(540.0, 580.0);
        assert!((tracker.velocity() - 500.0).abs() < 1e-9);

        tracker.reset();
        assert_eq!(tracker.velocity(), 0.0);
    }
}
