//! the angler: spawn, walking, jumping, swimming and ground contacts

use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::components::*;
use crate::config::WorldConfig;
use crate::constants::*;
use crate::hook::Facing;
use crate::session::FishingSession;

pub const TERRAIN_GROUP: Group = Group::GROUP_1;
pub const PLAYER_GROUP: Group = Group::GROUP_2;
pub const HOOK_GROUP: Group = Group::GROUP_3;

/* ===========================================================
   spawn
   =========================================================== */
pub fn spawn_player(mut commands: Commands, world: Res<WorldConfig>) {
    let spawn_y = world.terrain.ceiling_y() + PLAYER_SPAWN_CLEARANCE;
    commands.spawn((
        Sprite::from_color(PLAYER_COLOR, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
        Transform::from_xyz(TILE_SIZE * 0.5, spawn_y, 10.0),
        Player::default(),
        GroundContacts::default(),
        RigidBody::Dynamic,
        Collider::cuboid(PLAYER_WIDTH * 0.5, PLAYER_HEIGHT * 0.5),
        CollisionGroups::new(PLAYER_GROUP, TERRAIN_GROUP),
        LockedAxes::ROTATION_LOCKED,
        Friction::coefficient(0.0),
        Velocity::zero(),
        GravityScale(1.0),
        ActiveEvents::COLLISION_EVENTS,
    ));
}

/* ===========================================================
   input (A / D / Space)
   =========================================================== */
pub fn player_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut q: Query<(&mut Velocity, &mut Sprite, &mut Player)>,
) {
    let Ok((mut vel, mut sprite, mut ply)) = q.get_single_mut() else { return };
    match (keys.pressed(KeyCode::KeyA), keys.pressed(KeyCode::KeyD)) {
        (true, false) => {
            vel.linvel.x = -WALK_SPEED;
            ply.facing = Facing::Left;
        }
        (false, true) => {
            vel.linvel.x = WALK_SPEED;
            ply.facing = Facing::Right;
        }
        _ => vel.linvel.x = 0.0,
    }
    // collider must never be mirrored
    sprite.flip_x = ply.facing == Facing::Left;
    if keys.just_pressed(KeyCode::Space) && (ply.grounded || ply.swimming) {
        vel.linvel.y = JUMP_SPEED;
    }
}

/* ===========================================================
   contacts
   =========================================================== */

/// Count terrain contacts for the player and the hook.
pub fn ground_contact_system(
    mut events: EventReader<CollisionEvent>,
    blocks: Query<(), With<TerrainBlock>>,
    mut bodies: Query<&mut GroundContacts>,
) {
    for event in events.read() {
        let (a, b, started) = match event {
            CollisionEvent::Started(a, b, _) => (*a, *b, true),
            CollisionEvent::Stopped(a, b, _) => (*a, *b, false),
        };
        for (body, other) in [(a, b), (b, a)] {
            if !blocks.contains(other) {
                continue;
            }
            if let Ok(mut contacts) = bodies.get_mut(body) {
                contacts.0 = if started {
                    contacts.0 + 1
                } else {
                    contacts.0.saturating_sub(1)
                };
            }
        }
    }
}

pub fn player_grounded_system(mut q: Query<(&mut Player, &GroundContacts, &Velocity)>) {
    for (mut ply, contacts, vel) in &mut q {
        ply.grounded = contacts.0 > 0 && vel.linvel.y <= 1.0;
    }
}

/// Lighter gravity in water; basins are deeper than a jump.
pub fn player_swim_system(
    session: Res<FishingSession>,
    mut q: Query<(&Transform, &mut Player, &mut GravityScale)>,
) {
    for (tf, mut ply, mut gravity) in &mut q {
        ply.swimming = session.is_in_water(tf.translation.truncate());
        gravity.0 = if ply.swimming { SWIM_GRAVITY_SCALE } else { 1.0 };
    }
}
