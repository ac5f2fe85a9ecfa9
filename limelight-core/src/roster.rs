//! Follower roster — the trailing formation behind the watcher.
//!
//! Registration assigns a monotonically increasing slot that is never reused
//! within a session; formation rank is the record's 1-based position among
//! the *currently* registered followers, so later followers close the gap
//! when an earlier one leaves. Each follower's height is pinned at
//! registration and never re-sampled — a follower pushed below its pinned
//! height snaps back on the next tick.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::actor::ActorRecord;
use crate::config::RosterConfig;
use crate::events::{EngineEvent, EventQueue};
use crate::types::{ActorId, Pose, Vec3};

/// One follower's registration data.
#[derive(Debug, Clone, Copy)]
pub struct FollowerRecord {
    /// The following actor.
    pub actor: ActorId,
    /// Session-unique slot index (monotonic, never reused).
    pub slot: u64,
    /// Height captured at registration; never re-sampled.
    pub pinned_height: f32,
    /// Score contribution of this follower.
    pub point_value: u32,
}

/// Ordered collection of won-over actors trailing the watcher.
#[derive(Debug, Default)]
pub struct FollowerRoster {
    records: Vec<FollowerRecord>,
    next_slot: u64,
}

impl FollowerRoster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently registered followers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Sum of the point values of all registered followers.
    #[must_use]
    pub fn point_total(&self) -> u32 {
        self.records.iter().map(|r| r.point_value).sum()
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.records.iter().any(|r| r.actor == id)
    }

    /// Registered followers in slot order.
    #[must_use]
    pub fn records(&self) -> &[FollowerRecord] {
        &self.records
    }

    /// Register an actor as a follower.
    ///
    /// Re-registering an already-registered actor is a no-op, not an error.
    /// The actor's current height is pinned at this moment.
    pub fn register(&mut self, record: &ActorRecord, queue: &mut EventQueue) {
        if self.contains(record.id) {
            debug!(actor = %record.id, "already following, ignoring register");
            return;
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        self.records.push(FollowerRecord {
            actor: record.id,
            slot,
            pinned_height: record.pose.position.y,
            point_value: record.point_value,
        });
        debug!(actor = %record.id, slot, "follower registered");
        self.emit_count_changed(queue);
    }

    /// Remove an actor from the roster. Idempotent; the freed slot index is
    /// never reused, later followers simply close the gap.
    pub fn unregister(&mut self, id: ActorId, queue: &mut EventQueue) {
        let before = self.records.len();
        self.records.retain(|r| r.actor != id);
        if self.records.len() != before {
            debug!(actor = %id, "follower unregistered");
            self.emit_count_changed(queue);
        }
    }

    /// Reposition all followers toward their formation targets.
    ///
    /// Stale records (actors no longer in the registry) are pruned rather
    /// than failing the update.
    pub fn tick(
        &mut self,
        watcher: &Pose,
        actors: &mut HashMap<ActorId, ActorRecord>,
        dt: f64,
        config: &RosterConfig,
        queue: &mut EventQueue,
    ) {
        if dt <= 0.0 {
            return;
        }

        let before = self.records.len();
        self.records.retain(|r| {
            let known = actors.contains_key(&r.actor);
            if !known {
                warn!(actor = %r.actor, "pruning stale follower");
            }
            known
        });
        if self.records.len() != before {
            self.emit_count_changed(queue);
        }

        let back = watcher
            .forward
            .flattened()
            .normalized()
            .unwrap_or(Vec3::new(0.0, 0.0, 1.0));
        let dt_f32 = dt as f32;

        for (index, record) in self.records.iter().enumerate() {
            let Some(actor) = actors.get_mut(&record.actor) else {
                continue;
            };
            let rank = (index + 1) as f32;

            let mut target = watcher.position.sub(back.scale(config.spacing * rank));
            target.y = record.pinned_height;

            // Bounded movement toward the target, never a teleport.
            let delta = target.sub(actor.pose.position);
            let distance = delta.length();
            let step = config.follow_speed * dt_f32;
            if distance <= step || distance < f32::EPSILON {
                actor.pose.position = target;
            } else {
                actor.pose.position = actor.pose.position.add(delta.scale(step / distance));
            }

            // Safety: external interference can push a follower below its
            // pinned height; snap it back.
            if actor.pose.position.y < record.pinned_height - config.height_tolerance {
                actor.pose.position.y = record.pinned_height;
            }

            actor.pose.forward = turn_toward(
                actor.pose.forward,
                watcher.position.sub(actor.pose.position),
                config.turn_rate_deg_per_sec.to_radians() * dt_f32,
            );
        }
    }

    fn emit_count_changed(&self, queue: &mut EventQueue) {
        queue.emit(EngineEvent::FollowerCountChanged {
            count: self.count(),
            point_total: self.point_total(),
        });
    }
}

/// Rotate `current` toward the horizontal direction of `toward` by at most
/// `max_step_rad` radians around the vertical axis.
fn turn_toward(current: Vec3, toward: Vec3, max_step_rad: f32) -> Vec3 {
    let Some(desired) = toward.flattened().normalized() else {
        return current;
    };
    let Some(flat_current) = current.flattened().normalized() else {
        return desired;
    };

    let current_yaw = flat_current.x.atan2(flat_current.z);
    let desired_yaw = desired.x.atan2(desired.z);
    let mut diff = desired_yaw - current_yaw;
    // Shortest arc.
    while diff > std::f32::consts::PI {
        diff -= std::f32::consts::TAU;
    }
    while diff < -std::f32::consts::PI {
        diff += std::f32::consts::TAU;
    }

    let yaw = current_yaw + diff.clamp(-max_step_rad, max_step_rad);
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorSpec;
    use crate::config::EmotionConfig;
    use crate::profile::ProfileSet;

    fn make_actor(position: Vec3, point_value: u32) -> ActorRecord {
        let spec = ActorSpec {
            point_value,
            pose: Pose::at(position),
            ..ActorSpec::default()
        };
        let table = ProfileSet::new().resolve(&EmotionConfig::default());
        ActorRecord::new(ActorId::new(), &spec, table)
    }

    fn insert(actors: &mut HashMap<ActorId, ActorRecord>, record: ActorRecord) -> ActorId {
        let id = record.id;
        actors.insert(id, record);
        id
    }

    #[test]
    fn register_is_idempotent_and_counts_points() {
        let mut queue = EventQueue::new();
        let mut roster = FollowerRoster::new();
        let actor = make_actor(Vec3::new(1.0, 0.5, 0.0), 3);

        roster.register(&actor, &mut queue);
        roster.register(&actor, &mut queue);
        assert_eq!(roster.count(), 1);
        assert_eq!(roster.point_total(), 3);

        let count_events = queue
            .drain()
            .iter()
            .filter(|e| matches!(e, EngineEvent::FollowerCountChanged { .. }))
            .count();
        assert_eq!(count_events, 1, "duplicate register emits nothing");
    }

    #[test]
    fn slots_are_monotonic_and_never_reused() {
        let mut queue = EventQueue::new();
        let mut roster = FollowerRoster::new();
        let a = make_actor(Vec3::ZERO, 1);
        let b = make_actor(Vec3::ZERO, 1);
        let c = make_actor(Vec3::ZERO, 1);

        roster.register(&a, &mut queue);
        roster.register(&b, &mut queue);
        roster.unregister(a.id, &mut queue);
        roster.register(&c, &mut queue);

        let slots: Vec<u64> = roster.records().iter().map(|r| r.slot).collect();
        assert_eq!(slots, vec![1, 2], "freed slot 0 is never reassigned");
    }

    #[test]
    fn unregister_is_idempotent() {
        let mut queue = EventQueue::new();
        let mut roster = FollowerRoster::new();
        let a = make_actor(Vec3::ZERO, 1);
        roster.register(&a, &mut queue);
        queue.drain();

        roster.unregister(a.id, &mut queue);
        roster.unregister(a.id, &mut queue);
        assert_eq!(roster.count(), 0);
        assert_eq!(queue.drain().len(), 1, "second unregister emits nothing");
    }

    #[test]
    fn followers_close_ranks_and_trail_behind_watcher() {
        let config = RosterConfig::default(); // spacing 1.5
        let mut queue = EventQueue::new();
        let mut roster = FollowerRoster::new();
        let mut actors = HashMap::new();

        let a = insert(&mut actors, make_actor(Vec3::new(0.0, 0.0, -2.0), 1));
        let b = insert(&mut actors, make_actor(Vec3::new(0.0, 0.0, -3.0), 1));
        roster.register(&actors[&a].clone(), &mut queue);
        roster.register(&actors[&b].clone(), &mut queue);

        // Watcher at origin facing +Z; run until the formation settles.
        let watcher = Pose::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        for _ in 0..200 {
            roster.tick(&watcher, &mut actors, 0.05, &config, &mut queue);
        }
        assert!((actors[&a].pose.position.z - (-1.5)).abs() < 0.01);
        assert!((actors[&b].pose.position.z - (-3.0)).abs() < 0.01);

        // First follower leaves: the second closes the gap to rank 1.
        roster.unregister(a, &mut queue);
        for _ in 0..200 {
            roster.tick(&watcher, &mut actors, 0.05, &config, &mut queue);
        }
        assert!((actors[&b].pose.position.z - (-1.5)).abs() < 0.01);
    }

    #[test]
    fn movement_speed_is_bounded() {
        let config = RosterConfig::default(); // 3.5 units/s
        let mut queue = EventQueue::new();
        let mut roster = FollowerRoster::new();
        let mut actors = HashMap::new();

        let far = insert(&mut actors, make_actor(Vec3::new(100.0, 0.0, 0.0), 1));
        roster.register(&actors[&far].clone(), &mut queue);

        let watcher = Pose::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let before = actors[&far].pose.position;
        roster.tick(&watcher, &mut actors, 0.1, &config, &mut queue);
        let moved = actors[&far].pose.position.distance(before);
        assert!(moved <= 3.5 * 0.1 + 1e-4, "moved {moved} in one 0.1s tick");
    }

    #[test]
    fn height_snaps_back_within_one_tick() {
        let config = RosterConfig::default();
        let mut queue = EventQueue::new();
        let mut roster = FollowerRoster::new();
        let mut actors = HashMap::new();

        let a = insert(&mut actors, make_actor(Vec3::new(0.0, 2.0, -1.5), 1));
        roster.register(&actors[&a].clone(), &mut queue);

        // External force drops the follower 5 units below its pinned height.
        actors.get_mut(&a).expect("actor").pose.position.y = -3.0;

        let watcher = Pose::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        roster.tick(&watcher, &mut actors, 0.016, &config, &mut queue);
        let height = actors[&a].pose.position.y;
        assert!(
            (height - 2.0).abs() <= config.height_tolerance + 1e-4,
            "height {height} not restored to pinned 2.0"
        );
    }

    #[test]
    fn followers_turn_to_face_the_watcher() {
        let config = RosterConfig::default();
        let mut queue = EventQueue::new();
        let mut roster = FollowerRoster::new();
        let mut actors = HashMap::new();

        // Behind the watcher, initially facing away.
        let mut record = make_actor(Vec3::new(0.0, 0.0, -1.5), 1);
        record.pose.forward = Vec3::new(0.0, 0.0, -1.0);
        let a = insert(&mut actors, record);
        roster.register(&actors[&a].clone(), &mut queue);

        let watcher = Pose::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        for _ in 0..100 {
            roster.tick(&watcher, &mut actors, 0.05, &config, &mut queue);
        }
        let toward_watcher = watcher
            .position
            .sub(actors[&a].pose.position)
            .flattened()
            .normalized()
            .expect("non-zero");
        assert!(actors[&a].pose.forward.dot(toward_watcher) > 0.99);
    }

    #[test]
    fn stale_followers_are_pruned_on_tick() {
        let config = RosterConfig::default();
        let mut queue = EventQueue::new();
        let mut roster = FollowerRoster::new();
        let mut actors = HashMap::new();

        let a = insert(&mut actors, make_actor(Vec3::ZERO, 2));
        roster.register(&actors[&a].clone(), &mut queue);
        queue.drain();

        // Actor removed from the registry without unregistering.
        actors.remove(&a);
        let watcher = Pose::default();
        roster.tick(&watcher, &mut actors, 0.1, &config, &mut queue);

        assert_eq!(roster.count(), 0);
        assert!(matches!(
            queue.drain().as_slice(),
            [EngineEvent::FollowerCountChanged { count: 0, point_total: 0 }]
        ));
    }
}
