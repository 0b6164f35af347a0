//! Turn pointer clicks into motion through the puppy's reaction state
//! machine. The machine is the collection of pieces that govern how the
//! sprite answers a stream of retargeting requests:
//!
//! - Freeze the sprite at its live rendered position, so a click landing
//!   mid-flight never teleports it.
//! - Hold a startled pose for a fixed reaction delay, still facing the old
//!   direction.
//! - Turn toward the target, then glide there at constant speed with no
//!   easing.
//! - Settle back to idle on arrival.
//!
//! New clicks always supersede, never queue: every timed obligation lives in
//! a single owned slot on [`MotionController`], and replacing that slot is
//! what cancels the previous sequence.

use std::time::Duration;

use bevy::prelude::*;

use crate::{AppSystems, PausableSystems};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<TargetSelected>();
    app.add_systems(
        Update,
        (
            tick_motion.in_set(AppSystems::TickTimers),
            (apply_target_selections, apply_rendered_position)
                .chain()
                .in_set(AppSystems::Update),
        )
            .in_set(PausableSystems),
    );
}

/// A new destination for the puppy, in world coordinates. The pointer input
/// system is responsible for any coordinate reconciliation; past this point
/// positions are already in the rendered layout's space.
#[derive(Message, Debug, Clone, Copy)]
pub struct TargetSelected {
    pub position: Vec2,
}

/// Behavioral phase of the sprite. Exactly one is active at any instant.
#[derive(Reflect, Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum MotionPhase {
    #[default]
    Idle,
    Reacting,
    Moving,
}

/// Snapshot of everything the rendering side needs. `position` is the live,
/// interpolated on-screen point at the instant of the read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteState {
    pub position: Vec2,
    pub phase: MotionPhase,
    pub facing_right: bool,
    pub transition_active: bool,
    pub transition_duration_secs: f32,
}

/// An in-flight glide segment. Both axes share one normalized clock.
#[derive(Reflect, Debug, Clone, Copy)]
struct MotionTween {
    start: Vec2,
    target: Vec2,
    duration_secs: f32,
}

impl MotionTween {
    fn sample(&self, fraction: f32) -> Vec2 {
        self.start.lerp(self.target, fraction.clamp(0.0, 1.0))
    }
}

/// What a [`ScheduledTransition`] does once its timer completes.
#[derive(Reflect, Debug, Clone, Copy)]
enum TransitionAction {
    /// Apply the deferred turn and start gliding toward the target.
    EnterMoving { target: Vec2, face_right: Option<bool> },
    /// Arrived: settle back to idle.
    EnterIdle,
}

/// A deferred phase change. The controller owns at most one; dropping it is
/// cancellation, so a superseded transition can never fire.
#[derive(Reflect, Debug, Clone)]
struct ScheduledTransition {
    timer: Timer,
    action: TransitionAction,
}

/// The motion state machine for a sprite. Owns the authoritative position,
/// phase and facing; consumes targets through [`Self::set_target`]; advances
/// through [`Self::tick`]. Dropping the component releases every pending
/// timer with it.
#[derive(Component, Reflect)]
#[reflect(Component)]
pub struct MotionController {
    /// Committed position: the frozen baseline while reacting, the
    /// destination once a glide has started. The on-screen point is
    /// [`Self::rendered_position`].
    position: Vec2,
    phase: MotionPhase,
    facing_right: bool,
    /// Glide speed in pixels per second. Constant and linear, no easing.
    pub max_speed: f32,
    schedule: Option<ScheduledTransition>,
    tween: Option<MotionTween>,
}

impl Default for MotionController {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl MotionController {
    /// Pause between noticing a new target and starting to move.
    pub const REACTION_DELAY: Duration = Duration::from_millis(500);
    /// Targets closer than this are ignored, so near-zero re-clicks don't
    /// restart the sequence.
    pub const DEAD_ZONE: f32 = 10.0;
    /// 500 pixels per second is a nice trot for a 140 px puppy.
    pub const DEFAULT_SPEED: f32 = 500.0;

    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            phase: MotionPhase::Idle,
            facing_right: true,
            max_speed: Self::DEFAULT_SPEED,
            schedule: None,
            tween: None,
        }
    }

    /// Select a new destination. Safe to call at any time, including
    /// mid-reaction or mid-flight of a previous request; the newest target
    /// always wins.
    ///
    /// `live_position` is the rendering layer's current layout for the
    /// sprite, preferred over internal state so a retarget mid-glide starts
    /// from the point actually on screen. Without it the controller falls
    /// back to its own interpolated position.
    pub fn set_target(&mut self, target: Vec2, live_position: Option<Vec2>) {
        let start = live_position.unwrap_or_else(|| self.rendered_position());

        // Drop anything pending, then freeze at the on-screen point. From
        // here no residual tween and no stale timer exist.
        self.cancel();
        self.position = start;

        let delta = target - start;
        if delta.length() < Self::DEAD_ZONE {
            // Too close to bother. Phase and facing stay as they are.
            return;
        }

        // The turn is deferred to the end of the reaction, so the puppy
        // visibly notices before it turns to run. dx == 0 keeps the current
        // facing.
        let face_right = match delta.x {
            dx if dx > 0.0 => Some(true),
            dx if dx < 0.0 => Some(false),
            _ => None,
        };

        self.phase = MotionPhase::Reacting;
        self.schedule = Some(ScheduledTransition {
            timer: Timer::new(Self::REACTION_DELAY, TimerMode::Once),
            action: TransitionAction::EnterMoving { target, face_right },
        });
    }

    /// Advance the pending transition. Cascades when `delta` crosses more
    /// than one boundary, crediting the overshoot to the next clock, so a
    /// long frame can finish the reaction and a short glide in one call.
    pub fn tick(&mut self, delta: Duration) {
        let mut budget = delta;
        loop {
            let excess = match &mut self.schedule {
                Some(schedule) => {
                    let excess = (schedule.timer.elapsed() + budget)
                        .saturating_sub(schedule.timer.duration());
                    schedule.timer.tick(budget);
                    if !schedule.timer.is_finished() {
                        return;
                    }
                    excess
                }
                None => return,
            };
            if let Some(transition) = self.schedule.take() {
                self.fire(transition.action);
            }
            budget = excess;
        }
    }

    fn fire(&mut self, action: TransitionAction) {
        match action {
            TransitionAction::EnterMoving { target, face_right } => {
                if let Some(face_right) = face_right {
                    self.facing_right = face_right;
                }
                let duration_secs = self.position.distance(target) / self.max_speed;
                self.phase = MotionPhase::Moving;
                self.tween = Some(MotionTween {
                    start: self.position,
                    target,
                    duration_secs,
                });
                // Commit the destination; rendering keeps reading the tween
                // until the arrival transition below fires.
                self.position = target;
                self.schedule = Some(ScheduledTransition {
                    timer: Timer::from_seconds(duration_secs, TimerMode::Once),
                    action: TransitionAction::EnterIdle,
                });
            }
            TransitionAction::EnterIdle => {
                self.phase = MotionPhase::Idle;
                self.tween = None;
            }
        }
    }

    /// Drop every outstanding timed obligation. Idempotent, and fine to call
    /// after all timers have already fired.
    pub fn cancel(&mut self) {
        self.schedule = None;
        self.tween = None;
    }

    /// The point the sprite should be drawn at right now: the glide sampled
    /// on the shared clock while moving, the committed position otherwise.
    pub fn rendered_position(&self) -> Vec2 {
        match (&self.tween, &self.schedule) {
            (Some(tween), Some(schedule)) => tween.sample(schedule.timer.fraction()),
            _ => self.position,
        }
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    /// Pure read of the render-facing state, safe at any frequency.
    pub fn state(&self) -> SpriteState {
        SpriteState {
            position: self.rendered_position(),
            phase: self.phase,
            facing_right: self.facing_right,
            transition_active: self.tween.is_some(),
            transition_duration_secs: self.tween.map_or(0.0, |tween| tween.duration_secs),
        }
    }
}

fn tick_motion(time: Res<Time>, mut motion_query: Query<&mut MotionController>) {
    for mut controller in &mut motion_query {
        controller.tick(time.delta());
    }
}

/// Feed newly selected targets into the controllers, snapshotting the live
/// layout so each sequence restarts from the point actually on screen.
fn apply_target_selections(
    mut targets: MessageReader<TargetSelected>,
    mut motion_query: Query<(&mut MotionController, &Transform)>,
) {
    for target in targets.read() {
        debug!("New target at {}", target.position);
        for (mut controller, transform) in &mut motion_query {
            controller.set_target(target.position, Some(transform.translation.truncate()));
        }
    }
}

/// The rendering half of the glide: write the interpolated point into the
/// sprite's transform every frame.
fn apply_rendered_position(mut motion_query: Query<(&MotionController, &mut Transform)>) {
    for (controller, mut transform) in &mut motion_query {
        let position = controller.rendered_position();
        transform.translation.x = position.x;
        transform.translation.y = position.y;
    }
}
