//! The puppy stage: click-to-move motion, pose animation, pointer input and
//! transient effects.

use bevy::prelude::*;

mod animation;
mod effects;
pub mod movement;
pub mod puppy;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod animation_tests;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        animation::plugin,
        effects::plugin,
        movement::plugin,
        puppy::plugin,
    ));
}
