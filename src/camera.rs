use bevy::prelude::*;

use crate::components::{MainCamera, Player};
use crate::constants::*;

/// pixel snapping helper – keeps the camera on whole pixels so sprites never
/// land on half‑pixels and shimmer
#[inline]
fn snap(v: f32) -> f32 {
    v.round()
}

/// camera follows the player; only the floor is clamped since the world
/// streams forever sideways
///
/// NOTE: runs in **PostUpdate**, after physics wrote the player transform.
pub fn camera_follow_system(
    mut cam_q: Query<&mut Transform, (With<MainCamera>, Without<Player>)>,
    player_q: Query<&Transform, With<Player>>,
    window_q: Query<&Window>,
) {
    let Ok(mut cam_tf) = cam_q.get_single_mut() else { return };
    let Ok(player_tf) = player_q.get_single() else { return };
    let Ok(window) = window_q.get_single() else { return };

    let half_h = window.height() * 0.5;
    let y = player_tf.translation.y.max(WORLD_FLOOR_Y + half_h);

    cam_tf.translation.x = snap(player_tf.translation.x);
    cam_tf.translation.y = snap(y);
}

/// Streaming focal point: the camera's x in world space.
pub fn focal_x(cam_q: &Query<&Transform, With<MainCamera>>) -> f32 {
    cam_q.get_single().map_or(0.0, |tf| tf.translation.x)
}
