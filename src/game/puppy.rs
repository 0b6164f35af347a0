//! Puppy-specific behavior: the sprite entity, its image asset, and the
//! pointer input that selects its destinations.

use bevy::{
    image::{ImageLoaderSettings, ImageSampler},
    prelude::*,
    window::PrimaryWindow,
};

use crate::{
    AppSystems, PausableSystems,
    asset_tracking::LoadResource,
    game::{
        animation::PuppyAnimation,
        movement::{MotionController, TargetSelected},
    },
};

/// Side length of the rendered puppy, in pixels.
pub const PUPPY_SIZE: f32 = 140.0;

pub(super) fn plugin(app: &mut App) {
    app.load_resource::<PuppyAssets>();

    // The puppy appears once its image is ready, in the middle of the stage.
    app.add_systems(
        Update,
        spawn_puppy
            .run_if(resource_exists::<PuppyAssets>)
            .in_set(AppSystems::Update),
    );

    // Record pointer clicks as movement targets.
    app.add_systems(
        Update,
        record_pointer_target
            .in_set(AppSystems::RecordInput)
            .in_set(PausableSystems),
    );
}

/// The puppy root, driven by its [`MotionController`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub struct Puppy;

/// The child entity carrying the sprite. Pose animation squashes and hops
/// this one, so it never fights the controller for the root transform.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub struct PuppyVisual;

/// The puppy sprite with its motion controller.
pub fn puppy(position: Vec2, puppy_assets: &PuppyAssets) -> impl Bundle {
    (
        Name::new("Puppy"),
        Puppy,
        MotionController::new(position),
        Transform::from_translation(position.extend(1.0)),
        Visibility::default(),
        children![(
            Name::new("Puppy Visual"),
            PuppyVisual,
            PuppyAnimation::new(),
            Sprite {
                image: puppy_assets.image.clone(),
                custom_size: Some(Vec2::splat(PUPPY_SIZE)),
                ..default()
            },
            Transform::default(),
        )],
    )
}

fn spawn_puppy(
    mut commands: Commands,
    puppy_assets: Res<PuppyAssets>,
    puppies: Query<(), With<Puppy>>,
) {
    // Only one puppy on the stage.
    if !puppies.is_empty() {
        return;
    }
    info!("Puppy image ready, spawning");
    commands.spawn(puppy(Vec2::ZERO, &puppy_assets));
}

/// Convert a left click into a world-space [`TargetSelected`] message. This
/// is the only place where viewport and world coordinates are reconciled;
/// clicks mean nothing while no puppy exists.
fn record_pointer_target(
    mouse_button: Res<ButtonInput<MouseButton>>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform), With<Camera2d>>,
    puppies: Query<(), With<Puppy>>,
    mut targets: MessageWriter<TargetSelected>,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }
    if puppies.is_empty() {
        return;
    }
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let (camera, camera_transform) = *camera;
    let Ok(position) = camera.viewport_to_world_2d(camera_transform, cursor) else {
        return;
    };
    targets.write(TargetSelected { position });
}

#[derive(Resource, Asset, Clone, Reflect)]
#[reflect(Resource)]
pub struct PuppyAssets {
    /// The displayable puppy image. Where it came from is irrelevant here: a
    /// freshly generated cutout and a bundled placeholder behave the same.
    #[dependency]
    pub image: Handle<Image>,
}

impl FromWorld for PuppyAssets {
    fn from_world(world: &mut World) -> Self {
        let assets = world.resource::<AssetServer>();
        Self {
            image: assets.load_with_settings(
                "images/puppy.png",
                |settings: &mut ImageLoaderSettings| {
                    // Use `nearest` image sampling to keep the cutout edges crisp.
                    settings.sampler = ImageSampler::nearest();
                },
            ),
        }
    }
}
