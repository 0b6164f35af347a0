//! Puppy sprite animation.
//! The artwork is a single cutout image, so every pose is procedural:
//! squash, hop and tilt applied to the visual child's transform, the way a
//! paper puppet would be wiggled.

use bevy::prelude::*;
use rand::prelude::*;
use std::f32::consts::TAU;
use std::time::Duration;

use crate::{
    AppSystems, PausableSystems,
    game::{
        effects,
        movement::{MotionController, MotionPhase},
        puppy::{PUPPY_SIZE, Puppy, PuppyVisual},
    },
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (
            update_animation_timer.in_set(AppSystems::TickTimers),
            (
                update_animation_state,
                update_puppy_pose,
                update_facing,
                sync_reaction_bubble,
                animate_bubble_pop,
                trigger_step_dust,
            )
                .chain()
                .in_set(AppSystems::Update),
        )
            .in_set(PausableSystems),
    );
}

/// Derive the animation state (idling/reacting/running) from the motion
/// controller's phase.
fn update_animation_state(
    motion_query: Query<&MotionController>,
    mut animation_query: Query<(&ChildOf, &mut PuppyAnimation)>,
) {
    for (child_of, mut animation) in &mut animation_query {
        let Ok(controller) = motion_query.get(child_of.parent()) else {
            continue;
        };

        let state = match controller.phase() {
            MotionPhase::Idle => PuppyAnimationState::Idling,
            MotionPhase::Reacting => PuppyAnimationState::Reacting,
            MotionPhase::Moving => PuppyAnimationState::Running,
        };

        animation.update_state(state);
    }
}

/// Update the animation timers.
fn update_animation_timer(time: Res<Time>, mut query: Query<&mut PuppyAnimation>) {
    for mut animation in &mut query {
        animation.update_timer(time.delta());
    }
}

/// Apply the current procedural pose to the visual child's transform.
fn update_puppy_pose(
    mut visual_query: Query<(&PuppyAnimation, &mut Transform), With<PuppyVisual>>,
) {
    for (animation, mut transform) in &mut visual_query {
        let pose = animation.pose();
        transform.translation = Vec3::new(0.0, pose.hop, 0.0);
        transform.rotation = Quat::from_rotation_z(pose.tilt);
        transform.scale = pose.scale.extend(1.0);
    }
}

/// The image faces right by default; mirror it while the controller faces
/// left. Facing only changes at the reaction-to-move boundary, so no flip is
/// ever seen mid-reaction.
fn update_facing(
    motion_query: Query<&MotionController>,
    mut visual_query: Query<(&ChildOf, &mut Sprite), With<PuppyVisual>>,
) {
    for (child_of, mut sprite) in &mut visual_query {
        let Ok(controller) = motion_query.get(child_of.parent()) else {
            continue;
        };
        sprite.flip_x = !controller.facing_right();
    }
}

/// Keep a "!" bubble above the puppy exactly while it is startled.
fn sync_reaction_bubble(
    mut commands: Commands,
    motion_query: Query<(Entity, &MotionController), With<Puppy>>,
    bubble_query: Query<(Entity, &ChildOf), With<ReactionBubble>>,
) {
    for (puppy_entity, controller) in &motion_query {
        let bubble = bubble_query
            .iter()
            .find(|(_, child_of)| child_of.parent() == puppy_entity);
        match (controller.phase(), bubble) {
            (MotionPhase::Reacting, None) => {
                commands.entity(puppy_entity).with_children(|parent| {
                    parent.spawn(reaction_bubble());
                });
            }
            (MotionPhase::Reacting, Some(_)) | (_, None) => {}
            (_, Some((bubble_entity, _))) => {
                commands.entity(bubble_entity).despawn();
            }
        }
    }
}

/// Pop the bubble in with a little overshoot.
fn animate_bubble_pop(
    time: Res<Time>,
    mut bubble_query: Query<(&mut ReactionBubble, &mut Transform)>,
) {
    for (mut bubble, mut transform) in &mut bubble_query {
        bubble.timer.tick(time.delta());
        let fraction = bubble.timer.fraction();
        let scale = if fraction < 0.6 {
            1.1 * (fraction / 0.6)
        } else {
            1.1 - 0.1 * ((fraction - 0.6) / 0.4)
        };
        transform.scale = Vec3::splat(scale);
    }
}

/// While the puppy is running, kick up a puff of dust in sync with each
/// bounce landing.
fn trigger_step_dust(
    mut commands: Commands,
    motion_query: Query<&MotionController>,
    visual_query: Query<(&ChildOf, &PuppyAnimation)>,
) {
    for (child_of, animation) in &visual_query {
        if !animation.just_stepped() {
            continue;
        }
        let Ok(controller) = motion_query.get(child_of.parent()) else {
            continue;
        };
        let rng = &mut rand::rng();
        let offset = Vec2::new(rng.random_range(-18.0..18.0), -PUPPY_SIZE * 0.45);
        commands.spawn(effects::step_dust(controller.rendered_position() + offset));
    }
}

/// The "!" bubble shown while the puppy is startled.
#[derive(Component)]
struct ReactionBubble {
    timer: Timer,
}

fn reaction_bubble() -> impl Bundle {
    (
        Name::new("Reaction Bubble"),
        ReactionBubble {
            timer: Timer::from_seconds(0.3, TimerMode::Once),
        },
        Text2d::new("!"),
        TextFont {
            font_size: 48.0,
            ..default()
        },
        TextColor(Color::srgb(0.86, 0.18, 0.18)),
        Transform::from_translation(Vec3::new(0.0, PUPPY_SIZE * 0.65 + 16.0, 1.0))
            .with_scale(Vec3::ZERO),
    )
}

#[derive(Reflect, Debug, PartialEq, Copy, Clone)]
pub enum PuppyAnimationState {
    Idling,
    Reacting,
    Running,
}

/// A procedural pose for one frame of the visual child.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Pose {
    pub scale: Vec2,
    /// Z rotation in radians.
    pub tilt: f32,
    /// Vertical offset in pixels, positive up.
    pub hop: f32,
}

/// Component that tracks the puppy's animation state and drives its pose.
#[derive(Component, Reflect)]
#[reflect(Component)]
pub struct PuppyAnimation {
    timer: Timer,
    state: PuppyAnimationState,
    half: usize,
    stepped: bool,
}

impl PuppyAnimation {
    /// One slow breath while idling.
    const IDLE_CYCLE: Duration = Duration::from_millis(2500);
    /// One startled pop, played once per reaction.
    const REACT_DURATION: Duration = Duration::from_millis(400);
    /// One bounce cycle (two hops) while running.
    const RUN_CYCLE: Duration = Duration::from_millis(350);
    /// Heights of the two hops in a bounce cycle.
    const RUN_HOP: f32 = 20.0;
    const RUN_HOP_BACK: f32 = 15.0;
    /// Lean into each hop, in radians.
    const RUN_TILT: f32 = 5.0 * std::f32::consts::PI / 180.0;

    fn idling() -> Self {
        Self {
            timer: Timer::new(Self::IDLE_CYCLE, TimerMode::Repeating),
            state: PuppyAnimationState::Idling,
            half: 0,
            stepped: false,
        }
    }

    fn reacting() -> Self {
        Self {
            timer: Timer::new(Self::REACT_DURATION, TimerMode::Once),
            state: PuppyAnimationState::Reacting,
            half: 0,
            stepped: false,
        }
    }

    fn running() -> Self {
        Self {
            timer: Timer::new(Self::RUN_CYCLE, TimerMode::Repeating),
            state: PuppyAnimationState::Running,
            half: 0,
            stepped: false,
        }
    }

    pub fn new() -> Self {
        Self::idling()
    }

    /// Update animation timers.
    pub fn update_timer(&mut self, delta: Duration) {
        self.timer.tick(delta);
        self.stepped = false;
        if self.state == PuppyAnimationState::Running {
            // Two footfalls per bounce cycle, one as each hop lands.
            let half = (self.timer.fraction() * 2.0) as usize % 2;
            if half != self.half {
                self.stepped = true;
            }
            self.half = half;
        }
    }

    /// Switch animation state if it changed, restarting the pose clock.
    pub fn update_state(&mut self, state: PuppyAnimationState) {
        if self.state != state {
            *self = match state {
                PuppyAnimationState::Idling => Self::idling(),
                PuppyAnimationState::Reacting => Self::reacting(),
                PuppyAnimationState::Running => Self::running(),
            };
        }
    }

    /// Whether a bounce landed this tick.
    pub fn just_stepped(&self) -> bool {
        self.stepped
    }

    pub fn state(&self) -> PuppyAnimationState {
        self.state
    }

    /// The pose for the current clock value.
    pub fn pose(&self) -> Pose {
        let fraction = self.timer.fraction();
        match self.state {
            PuppyAnimationState::Idling => {
                // Slow breathing: widen a touch while settling down.
                let breath = 0.5 * (1.0 - (TAU * fraction).cos());
                Pose {
                    scale: Vec2::new(1.0 + 0.03 * breath, 1.0 - 0.03 * breath),
                    tilt: 0.0,
                    hop: 0.0,
                }
            }
            PuppyAnimationState::Reacting => {
                // One-shot startle: pop up with overshoot, dip, settle.
                let (scale, hop) = if fraction < 0.4 {
                    let t = fraction / 0.4;
                    (1.0 + 0.2 * t, 10.0 * t)
                } else if fraction < 0.8 {
                    let t = (fraction - 0.4) / 0.4;
                    (1.2 - 0.25 * t, 10.0 * (1.0 - t))
                } else {
                    let t = (fraction - 0.8) / 0.2;
                    (0.95 + 0.05 * t, 0.0)
                };
                Pose {
                    scale: Vec2::splat(scale),
                    tilt: 0.0,
                    hop,
                }
            }
            PuppyAnimationState::Running => {
                // Two hops per cycle, the second slightly lower, leaning
                // into each one.
                let wave = (TAU * fraction).sin();
                let height = if wave >= 0.0 {
                    Self::RUN_HOP
                } else {
                    Self::RUN_HOP_BACK
                };
                Pose {
                    scale: Vec2::splat(1.0 + 0.05 * wave.abs()),
                    tilt: Self::RUN_TILT * wave,
                    hop: height * wave.abs(),
                }
            }
        }
    }
}
