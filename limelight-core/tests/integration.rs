//! Integration Tests — End-to-End Gaze Flows
//!
//! These tests drive the full engine through its public surface only:
//! register → gaze → trigger → sequence → win-over → follow, plus the
//! challenge path and config loading from disk.

use limelight_core::actor::{ActorLifecycleState, ActorSpec};
use limelight_core::config::EngineConfig;
use limelight_core::engine::Engine;
use limelight_core::error::EngineError;
use limelight_core::events::EngineEvent;
use limelight_core::profile::{EmotionProfile, ProfileSet};
use limelight_core::sequence::{Sequence, TransitionRule};
use limelight_core::types::{EmotionKind, Pose, Vec3};

fn watcher_facing(forward: Vec3) -> Pose {
    Pose::new(Vec3::ZERO, forward)
}

fn spec_at(position: Vec3) -> ActorSpec {
    ActorSpec {
        pose: Pose::at(position),
        ..ActorSpec::default()
    }
}

// ---------------------------------------------------------------------------
// Full flow: gaze → trigger → sustained engagement → won over → following
// ---------------------------------------------------------------------------

#[test]
fn sustained_gaze_wins_an_actor_over() {
    let mut engine = Engine::default();
    let id = engine.register_actor(spec_at(Vec3::new(0.0, 0.0, 2.0)));
    engine.set_watcher_pose(watcher_facing(Vec3::new(0.0, 0.0, 1.0)));

    // Watcher's Neutral matches the actor's starting Neutral: 8s of
    // required interaction accrues at double rate.
    for _ in 0..100 {
        engine.tick(0.1);
    }

    assert_eq!(engine.lifecycle_of(id), Some(ActorLifecycleState::Following));
    assert!(engine.is_following(id));
    assert_eq!(engine.follower_count(), 1);

    let events = engine.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::GazeStatusChanged { gazed: true, .. }
    )));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, EngineEvent::EmotionTriggered(_))),
        "default trigger threshold crossed under sustained gaze"
    );
    assert!(events.iter().any(|e| matches!(e, EngineEvent::ActorWonOver { .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::FollowerCountChanged { count: 1, point_total: 1 }
    )));
}

// ---------------------------------------------------------------------------
// Two actors won over in turn: point totals and single-engagement ordering
// ---------------------------------------------------------------------------

#[test]
fn actors_are_engaged_one_at_a_time_and_points_accumulate() {
    let mut engine = Engine::default();
    let near = engine.register_actor(ActorSpec {
        point_value: 2,
        ..spec_at(Vec3::new(0.0, 0.0, 2.0))
    });
    let far = engine.register_actor(ActorSpec {
        point_value: 3,
        ..spec_at(Vec3::new(0.0, 0.0, 3.0))
    });
    engine.set_watcher_pose(watcher_facing(Vec3::new(0.0, 0.0, 1.0)));

    // First win: the nearer actor. With the Neutral/Neutral match bonus the
    // 8s requirement accrues in 4s; 5s is past the first promotion but well
    // short of the second.
    for _ in 0..50 {
        engine.tick(0.1);
    }
    assert!(engine.is_following(near));
    assert_eq!(engine.lifecycle_of(far), Some(ActorLifecycleState::Engaged));

    // Second win once engagement passes to the remaining actor.
    for _ in 0..100 {
        engine.tick(0.1);
    }
    assert!(engine.is_following(far));
    assert_eq!(engine.follower_count(), 2);
    assert_eq!(engine.follower_point_total(), 5);
}

// ---------------------------------------------------------------------------
// Challenge path: gate opens at intensity, failure resumes, success follows
// ---------------------------------------------------------------------------

#[test]
fn challenge_actor_promotes_only_through_challenge_success() {
    let mut engine = Engine::default();
    let id = engine.register_actor(ActorSpec {
        requires_challenge: true,
        ..spec_at(Vec3::new(0.0, 0.0, 2.0))
    });
    engine.set_watcher_pose(watcher_facing(Vec3::new(0.0, 0.0, 1.0)));

    // Default buildup 0.25/s reaches the 0.7 gate in ~2.8s of gaze.
    let mut ready = false;
    for _ in 0..40 {
        engine.tick(0.1);
        if engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, EngineEvent::ChallengeReady { .. }))
        {
            ready = true;
            break;
        }
    }
    assert!(ready, "challenge gate should open under sustained gaze");
    assert_eq!(
        engine.lifecycle_of(id),
        Some(ActorLifecycleState::AwaitingChallenge)
    );

    // Failure: back to Engaged, never Following.
    engine.resolve_challenge(id, false);
    assert_eq!(engine.lifecycle_of(id), Some(ActorLifecycleState::Engaged));
    assert!(!engine.is_following(id));

    // The gate re-opens (intensity is still above threshold) and success
    // promotes.
    engine.tick(0.1);
    engine.resolve_challenge(id, true);
    assert_eq!(engine.lifecycle_of(id), Some(ActorLifecycleState::Following));
    assert!(engine.is_following(id));
}

// ---------------------------------------------------------------------------
// Trigger → auto sequence chain through authored profiles
// ---------------------------------------------------------------------------

#[test]
fn trigger_auto_starts_the_mapped_sequence() {
    let mut engine = Engine::default();

    let mut profiles = ProfileSet::new();
    // Hot-headed archetype: fast buildup, late trigger, short dwell. The
    // trigger fires above the sequence-eligible threshold (0.9).
    profiles.insert(
        EmotionKind::Neutral,
        EmotionProfile::new(1.0, 0.1, 2.0, 0.95, 0.2),
    );
    engine.add_archetype("hothead", profiles);
    engine.register_sequence(Sequence::new(
        "delight",
        vec![TransitionRule::new(
            EmotionKind::Neutral,
            EmotionKind::Happy,
            0.5,
            0.0,
        )],
        false,
    ));
    engine.set_auto_sequence(EmotionKind::Neutral, "delight");

    let id = engine.register_actor(ActorSpec {
        archetype: Some("hothead".to_string()),
        ..spec_at(Vec3::new(0.0, 0.0, 2.0))
    });
    engine.set_watcher_pose(watcher_facing(Vec3::new(0.0, 0.0, 1.0)));

    for _ in 0..10 {
        engine.tick(0.1);
    }

    assert_eq!(engine.emotion_of(id), Some(EmotionKind::Happy));
    let events = engine.drain_events();
    assert!(events.iter().any(|e| matches!(e, EngineEvent::EmotionTriggered(_))));
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::SequenceFinished { final_kind: EmotionKind::Happy, .. }
    )));
}

// ---------------------------------------------------------------------------
// Fever mode: the global multiplier accelerates buildup
// ---------------------------------------------------------------------------

#[test]
fn fever_multiplier_accelerates_buildup() {
    let run = |multiplier: f32| -> f32 {
        let mut engine = Engine::default();
        let id = engine.register_actor(spec_at(Vec3::new(0.0, 0.0, 2.0)));
        engine.set_watcher_pose(watcher_facing(Vec3::new(0.0, 0.0, 1.0)));
        engine.set_intensity_multiplier(multiplier);
        for _ in 0..10 {
            engine.tick(0.1);
        }
        engine.intensity_of(id).expect("registered")
    };

    let base = run(1.0);
    let fever = run(3.0);
    assert!(fever > base * 2.5, "fever {fever} vs base {base}");
}

// ---------------------------------------------------------------------------
// Idle forget: un-gazed, un-triggered actors drift back to Neutral
// ---------------------------------------------------------------------------

#[test]
fn idle_actor_forgets_back_to_neutral() {
    let mut engine = Engine::default();
    // Behind the watcher: never gazed.
    let id = engine.register_actor(spec_at(Vec3::new(0.0, 0.0, -3.0)));
    engine.set_watcher_pose(watcher_facing(Vec3::new(0.0, 0.0, 1.0)));

    engine.set_actor_emotion(id, EmotionKind::Angry);
    engine.drain_events();

    // Default forget window is 4s.
    for _ in 0..45 {
        engine.tick(0.1);
    }

    assert_eq!(engine.emotion_of(id), Some(EmotionKind::Neutral));
    let resets: Vec<_> = engine
        .drain_events()
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                EngineEvent::EmotionKindChanged { new: EmotionKind::Neutral, .. }
            )
        })
        .collect();
    assert_eq!(resets.len(), 1, "forget fires exactly once");
}

// ---------------------------------------------------------------------------
// Follower formation trails the watcher
// ---------------------------------------------------------------------------

#[test]
fn follower_converges_on_its_formation_slot() {
    let mut engine = Engine::default();
    let id = engine.register_actor(spec_at(Vec3::new(0.0, 0.0, 2.0)));
    engine.set_watcher_pose(watcher_facing(Vec3::new(0.0, 0.0, 1.0)));
    for _ in 0..100 {
        engine.tick(0.1);
    }
    assert!(engine.is_following(id));

    // Watcher relocates; the follower walks to 1.5 units behind the new
    // facing at bounded speed.
    engine.set_watcher_pose(Pose::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)));
    for _ in 0..120 {
        engine.tick(0.05);
    }

    let pose = engine.pose_of(id).expect("registered");
    let target = Vec3::new(8.5, 0.0, 0.0);
    assert!(
        pose.position.distance(target) < 0.05,
        "follower at {:?}, expected near {target:?}",
        pose.position
    );
}

// ---------------------------------------------------------------------------
// Config loading from disk
// ---------------------------------------------------------------------------

#[test]
fn config_file_overrides_merge_with_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("limelight.toml");
    std::fs::write(
        &path,
        r#"
[gaze]
max_distance = 10.0

[lifecycle]
required_interaction_seconds = 3.0
"#,
    )
    .expect("write config");

    let config = EngineConfig::from_file(&path).expect("load");
    assert!((config.gaze.max_distance - 10.0).abs() < 1e-6);
    assert!((config.lifecycle.required_interaction_seconds - 3.0).abs() < 1e-9);
    // Untouched sections keep their defaults.
    assert!((config.gaze.cone_half_angle_deg - 60.0).abs() < 1e-6);
    assert!((config.emotion.forget_seconds - 4.0).abs() < 1e-9);
}

#[test]
fn malformed_config_file_is_a_config_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[gaze\nmax_distance = ten").expect("write config");

    match EngineConfig::from_file(&path) {
        Err(EngineError::Config(_)) => {}
        other => panic!("expected Config error, got {other:?}"),
    }
}
