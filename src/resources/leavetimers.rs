//! Cancellable one-shot timers used to forget detected objects.
//!
//! [`LeaveTimers`] owns every pending "forget" reset in the world. A sensor
//! schedules a reset when its target leaves the volume and keeps the returned
//! [`TimerHandle`]; any later enter or exit cancels that handle before doing
//! anything else. Cancelled timers are removed immediately, so a stale reset
//! can never fire.
//!
//! The queue keeps its own clock, advanced by
//! [`update_leave_timers`](crate::systems::time::update_leave_timers) with the
//! scaled frame delta.

use bevy_ecs::prelude::{Entity, Resource};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Opaque identifier of a scheduled reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Something that can schedule and cancel delayed resets on behalf of an owner.
///
/// Implemented by [`LeaveTimers`]; sensor logic only depends on this trait.
pub trait ResetScheduler {
    /// Schedule a reset for `owner` after `delay` seconds.
    fn schedule(&mut self, delay: f32, owner: Entity) -> TimerHandle;
    /// Cancel a pending reset. Returns false if it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct ScheduledReset {
    owner: Entity,
    deadline: f64,
}

/// Expired timers returned by [`LeaveTimers::advance`], in deadline order.
pub type ExpiredTimers = SmallVec<[(TimerHandle, Entity); 4]>;

#[derive(Debug, Default, Resource)]
pub struct LeaveTimers {
    /// Queue clock in seconds; f64 keeps sub-millisecond resolution over days.
    now: f64,
    next_id: u64,
    pending: FxHashMap<TimerHandle, ScheduledReset>,
}

impl LeaveTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `dt` seconds and remove every timer whose
    /// deadline has been reached.
    pub fn advance(&mut self, dt: f32) -> ExpiredTimers {
        self.now += f64::from(dt.max(0.0));
        let now = self.now;
        let mut expired: SmallVec<[(TimerHandle, ScheduledReset); 4]> = self
            .pending
            .iter()
            .filter(|(_, timer)| timer.deadline <= now)
            .map(|(handle, timer)| (*handle, *timer))
            .collect();
        expired.sort_by(|(ha, a), (hb, b)| a.deadline.total_cmp(&b.deadline).then(ha.cmp(hb)));
        for (handle, _) in &expired {
            self.pending.remove(handle);
        }
        expired
            .into_iter()
            .map(|(handle, timer)| (handle, timer.owner))
            .collect()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Seconds left before `handle` fires, if it is still pending.
    pub fn remaining(&self, handle: TimerHandle) -> Option<f32> {
        self.pending
            .get(&handle)
            .map(|timer| (timer.deadline - self.now).max(0.0) as f32)
    }

    /// Number of pending timers scheduled by `owner`.
    pub fn pending_for(&self, owner: Entity) -> usize {
        self.pending
            .values()
            .filter(|timer| timer.owner == owner)
            .count()
    }

    /// Drop every pending timer owned by `owner` (e.g. when it is despawned).
    pub fn cancel_all_for(&mut self, owner: Entity) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, timer| timer.owner != owner);
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl ResetScheduler for LeaveTimers {
    fn schedule(&mut self, delay: f32, owner: Entity) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.insert(
            handle,
            ScheduledReset {
                owner,
                deadline: self.now + f64::from(delay.max(0.0)),
            },
        );
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;

    fn owners(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn test_timer_fires_after_delay() {
        let owner = owners(1)[0];
        let mut timers = LeaveTimers::new();
        let handle = timers.schedule(2.0, owner);

        assert!(timers.advance(1.0).is_empty());
        assert!(timers.is_pending(handle));
        assert!((timers.remaining(handle).unwrap() - 1.0).abs() < 1e-6);

        let fired = timers.advance(1.0);
        assert_eq!(fired.as_slice(), &[(handle, owner)]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let owner = owners(1)[0];
        let mut timers = LeaveTimers::new();
        let handle = timers.schedule(1.0, owner);
        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert!(timers.advance(5.0).is_empty());
    }

    #[test]
    fn test_expired_timers_come_out_in_deadline_order() {
        let ids = owners(2);
        let mut timers = LeaveTimers::new();
        let late = timers.schedule(3.0, ids[0]);
        let early = timers.schedule(1.0, ids[1]);
        let fired = timers.advance(4.0);
        assert_eq!(fired.as_slice(), &[(early, ids[1]), (late, ids[0])]);
    }

    #[test]
    fn test_handles_are_unique() {
        let owner = owners(1)[0];
        let mut timers = LeaveTimers::new();
        let a = timers.schedule(1.0, owner);
        let b = timers.schedule(1.0, owner);
        assert_ne!(a, b);
        assert_eq!(timers.pending_for(owner), 2);
        assert_eq!(timers.cancel_all_for(owner), 2);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_short_delay_keeps_precision_late_in_a_session() {
        let owner = owners(1)[0];
        let mut timers = LeaveTimers::new();
        // Roughly 28 hours in; an f32 clock steps in 1/128 s here.
        assert!(timers.advance(100_000.0).is_empty());
        let handle = timers.schedule(0.01, owner);

        assert!(timers.advance(0.004).is_empty());
        assert!(timers.is_pending(handle));
        let remaining = timers.remaining(handle).unwrap();
        assert!((remaining - 0.006).abs() < 1e-4, "remaining {remaining}");

        assert_eq!(timers.advance(0.006).as_slice(), &[(handle, owner)]);
    }

    #[test]
    fn test_zero_delay_fires_on_next_advance() {
        let owner = owners(1)[0];
        let mut timers = LeaveTimers::new();
        let handle = timers.schedule(0.0, owner);
        assert_eq!(timers.advance(0.0).as_slice(), &[(handle, owner)]);
    }
}
