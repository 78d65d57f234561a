//! Interactive replay of a recorded trace (feature `viewer`)
//!
//! One circle per body; each frame moves the circles to the next sample and
//! wraps around at the end of the trace.

use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};
use bevy::math::primitives::Circle;

use crate::analysis::sampler::PositionTrace;
use crate::visualization::animation::body_color;

#[derive(Component)]
struct BodyIndex(pub usize);

#[derive(Resource)]
struct Replay {
    trace: PositionTrace,
    frame: usize,
    scale: f32, // world units -> pixels
}

const VIEW_HALF_WIDTH: f32 = 300.0;
const BODY_RADIUS_PX: f32 = 4.0;

pub fn run_viewer(trace: PositionTrace) {
    tracing::info!(bodies = trace.body_count(), samples = trace.sample_count(), "starting replay viewer");

    // fit the whole trace into the window
    let extent = trace.max_abs_coordinate().max(1e-9) as f32;
    let scale = VIEW_HALF_WIDTH / extent;

    App::new()
        .insert_resource(Replay { trace, frame: 0, scale })
        .add_plugins(DefaultPlugins)
        .add_systems(Startup, setup_bodies_system)
        .add_systems(Update, (advance_frame_system, sync_transforms_system).chain())
        .run();
}

fn setup_bodies_system(mut commands: Commands, replay: Res<Replay>, mut meshes: ResMut<Assets<Mesh>>, mut materials: ResMut<Assets<ColorMaterial>>) {
    commands.spawn(Camera2dBundle::default());

    for i in 0..replay.trace.body_count() {
        let (x, y) = sample(&replay, i, 0).unwrap_or((0.0, 0.0));
        let c = body_color(i);

        commands.spawn((
            MaterialMesh2dBundle {
                mesh: Mesh2dHandle(meshes.add(Circle::new(BODY_RADIUS_PX))),
                material: materials.add(ColorMaterial::from(Color::srgb_u8(c.0, c.1, c.2))),
                transform: Transform::from_xyz(x, y, 0.0),
                ..Default::default()
            },
            BodyIndex(i),
        ));
    }
}

fn advance_frame_system(mut replay: ResMut<Replay>) {
    let n = replay.trace.sample_count();
    if n > 0 {
        replay.frame = (replay.frame + 1) % n;
    }
}

fn sync_transforms_system(replay: Res<Replay>, mut query: Query<(&BodyIndex, &mut Transform)>) {
    for (BodyIndex(i), mut transform) in &mut query {
        if let Some((x, y)) = sample(&replay, *i, replay.frame) {
            transform.translation.x = x;
            transform.translation.y = y;
        }
    }
}

/// Screen position of body `i` at sample `k`
fn sample(replay: &Replay, i: usize, k: usize) -> Option<(f32, f32)> {
    let trace = &replay.trace;
    if i >= trace.body_count() || k >= trace.sample_count() {
        return None;
    }
    Some((trace.x[(i, k)] as f32 * replay.scale, trace.y[(i, k)] as f32 * replay.scale))
}
