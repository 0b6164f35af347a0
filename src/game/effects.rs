//! Short-lived stage garnish: the ripple marking a click and the dust the
//! puppy kicks up while running. Everything here fades, grows a little, and
//! despawns itself.

use bevy::prelude::*;

use crate::{AppSystems, PausableSystems, game::movement::TargetSelected};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (spawn_click_ripples, fade_out)
            .in_set(AppSystems::Update)
            .in_set(PausableSystems),
    );
}

/// Fades and grows the entity for the timer's length, then despawns it.
#[derive(Component)]
pub struct FadeOut {
    timer: Timer,
    /// Scale multiplier reached at the end of the fade.
    growth: f32,
    start_alpha: f32,
}

impl FadeOut {
    fn new(seconds: f32, growth: f32, start_alpha: f32) -> Self {
        Self {
            timer: Timer::from_seconds(seconds, TimerMode::Once),
            growth,
            start_alpha,
        }
    }
}

/// Mark every accepted click with a spreading ripple.
fn spawn_click_ripples(mut commands: Commands, mut targets: MessageReader<TargetSelected>) {
    for target in targets.read() {
        commands.spawn(click_ripple(target.position));
    }
}

fn click_ripple(position: Vec2) -> impl Bundle {
    (
        Name::new("Click Ripple"),
        FadeOut::new(1.0, 3.0, 0.30),
        Sprite::from_color(Color::srgba(0.86, 0.18, 0.18, 0.30), Vec2::splat(16.0)),
        Transform::from_translation(position.extend(0.5)),
    )
}

/// A puff of paper dust at a footfall.
pub fn step_dust(position: Vec2) -> impl Bundle {
    (
        Name::new("Step Dust"),
        FadeOut::new(0.4, 2.0, 0.35),
        Sprite::from_color(Color::srgba(0.55, 0.48, 0.38, 0.35), Vec2::splat(6.0)),
        Transform::from_translation(position.extend(0.5)),
    )
}

fn fade_out(
    time: Res<Time>,
    mut commands: Commands,
    mut fade_query: Query<(Entity, &mut FadeOut, &mut Transform, &mut Sprite)>,
) {
    for (entity, mut fade, mut transform, mut sprite) in &mut fade_query {
        fade.timer.tick(time.delta());
        if fade.timer.is_finished() {
            commands.entity(entity).despawn();
            continue;
        }
        let fraction = fade.timer.fraction();
        transform.scale = Vec3::splat(1.0 + (fade.growth - 1.0) * fraction);
        let alpha = fade.start_alpha * (1.0 - fraction);
        sprite.color = sprite.color.with_alpha(alpha);
    }
}
