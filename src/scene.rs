//! bevy side of the game: engine adapters and the per-frame systems that
//! drive a [`FishingSession`]
use std::sync::Arc;

use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_rapier2d::prelude::*;
use parking_lot::Mutex;

use crate::camera::focal_x;
use crate::catch::{CatchLog, CaughtItem};
use crate::components::*;
use crate::constants::*;
use crate::error::{HookError, WorldResult};
use crate::fishing::{CatchCallback, FishingEvent, FishingState, FrameInput};
use crate::hook::{Facing, HookPhysics};
use crate::player::{HOOK_GROUP, TERRAIN_GROUP};
use crate::population::ZoneType;
use crate::session::FishingSession;
use crate::terrain::{BlockHandle, BlockSpec, CollidableFactory};
use crate::water::{WaterZone, ZoneHandle, ZoneRenderer};

const HOOK_Z: f32 = 15.0;
const WATER_Z: f32 = 5.0;

fn entity_of(bits: u64) -> Option<Entity> {
    Entity::try_from_bits(bits).ok()
}

/* ===========================================================
   block + zone adapter
   =========================================================== */

/// Spawns terrain blocks and water sprites through `Commands`.
pub struct SceneCommands<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
}

impl CollidableFactory for SceneCommands<'_, '_, '_> {
    fn spawn_block(&mut self, spec: &BlockSpec) -> WorldResult<BlockHandle> {
        let half = spec.size * 0.5;
        let id = self
            .commands
            .spawn((
                Sprite::from_color(spec.material.color(), Vec2::splat(spec.size)),
                Transform::from_xyz(spec.center.x, spec.center.y, 0.0),
                TerrainBlock,
                RigidBody::Fixed,
                Collider::cuboid(half, half),
                CollisionGroups::new(TERRAIN_GROUP, Group::ALL),
            ))
            .id();
        Ok(BlockHandle(id.to_bits()))
    }

    fn deactivate_block(&mut self, handle: BlockHandle) {
        let Some(mut block) = entity_of(handle.0).and_then(|e| self.commands.get_entity(e)) else {
            return;
        };
        block.insert((Visibility::Hidden, ColliderDisabled, RigidBodyDisabled));
    }

    fn reactivate_block(&mut self, handle: BlockHandle) {
        let Some(mut block) = entity_of(handle.0).and_then(|e| self.commands.get_entity(e)) else {
            return;
        };
        block
            .insert(Visibility::Inherited)
            .remove::<(ColliderDisabled, RigidBodyDisabled)>();
    }

    fn release_block(&mut self, handle: BlockHandle) {
        if let Some(block) = entity_of(handle.0).and_then(|e| self.commands.get_entity(e)) {
            block.despawn_recursive();
        }
    }
}

pub fn zone_color(kind: ZoneType) -> Color {
    match kind {
        ZoneType::Lake => LAKE_COLOR,
        ZoneType::River => RIVER_COLOR,
        ZoneType::Ocean => OCEAN_COLOR,
    }
}

impl ZoneRenderer for SceneCommands<'_, '_, '_> {
    fn show_zone(&mut self, zone: &WaterZone) -> WorldResult<ZoneHandle> {
        let center = zone.area.center();
        let id = self
            .commands
            .spawn((
                Sprite::from_color(zone_color(zone.kind), zone.area.size()),
                Transform::from_xyz(center.x, center.y, WATER_Z),
                WaterZoneSprite,
            ))
            .id();
        Ok(ZoneHandle(id.to_bits()))
    }

    fn release_zone(&mut self, handle: ZoneHandle) {
        if let Some(sprite) = entity_of(handle.0).and_then(|e| self.commands.get_entity(e)) {
            sprite.despawn_recursive();
        }
    }
}

/* ===========================================================
   hook adapter
   =========================================================== */
#[derive(Debug, Clone, Copy, PartialEq)]
enum HookCommand {
    Launch { origin: Vec2, velocity: Vec2 },
    Hold,
    Deactivate,
}

/// Frame snapshot of the hook body; writes are queued and applied after the
/// state machine ran.
#[derive(Debug, Default)]
pub struct RapierHook {
    entity: Option<Entity>,
    position: Vec2,
    grounded: bool,
    queued: Vec<HookCommand>,
}

impl RapierHook {
    pub fn snapshot(entity: Entity, tf: &Transform, contacts: &GroundContacts) -> Self {
        Self {
            entity: Some(entity),
            position: tf.translation.truncate(),
            grounded: contacts.0 > 0,
            queued: Vec::new(),
        }
    }

    /// No hook body in the world; every query fails.
    pub fn missing() -> Self {
        Self::default()
    }

    fn present(&self) -> Result<(), HookError> {
        self.entity.map(|_| ()).ok_or(HookError::Missing)
    }

    pub fn apply(self, commands: &mut Commands) {
        let Some(mut hook) = self.entity.and_then(|e| commands.get_entity(e)) else {
            return;
        };
        for cmd in self.queued {
            match cmd {
                HookCommand::Launch { origin, velocity } => {
                    hook.insert((
                        Transform::from_translation(origin.extend(HOOK_Z)),
                        Velocity::linear(velocity),
                        GravityScale(1.0),
                        GroundContacts::default(),
                        Visibility::Inherited,
                    ))
                    .remove::<(RigidBodyDisabled, ColliderDisabled)>();
                }
                HookCommand::Hold => {
                    hook.insert((Velocity::zero(), GravityScale(0.0)));
                }
                HookCommand::Deactivate => {
                    hook.insert((
                        Velocity::zero(),
                        GravityScale(0.0),
                        GroundContacts::default(),
                        Visibility::Hidden,
                        RigidBodyDisabled,
                        ColliderDisabled,
                    ));
                }
            }
        }
    }
}

impl HookPhysics for RapierHook {
    fn launch(&mut self, origin: Vec2, velocity: Vec2) -> Result<(), HookError> {
        self.present()?;
        self.position = origin;
        self.grounded = false;
        self.queued.push(HookCommand::Launch { origin, velocity });
        Ok(())
    }

    fn position(&self) -> Result<Vec2, HookError> {
        self.present().map(|_| self.position)
    }

    fn is_touching_ground(&self) -> Result<bool, HookError> {
        self.present().map(|_| self.grounded)
    }

    fn hold(&mut self) -> Result<(), HookError> {
        self.present()?;
        self.queued.push(HookCommand::Hold);
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), HookError> {
        self.present()?;
        self.queued.push(HookCommand::Deactivate);
        Ok(())
    }
}

/* ===========================================================
   catch log
   =========================================================== */
#[derive(Resource, Clone, Default)]
pub struct SharedCatchLog(pub Arc<Mutex<CatchLog>>);

impl SharedCatchLog {
    /// Callback for [`crate::fishing::FishingStateMachine::on_catch`].
    pub fn recorder(&self) -> CatchCallback {
        let log = Arc::clone(&self.0);
        Box::new(move |item: &CaughtItem| {
            let mut log = log.lock();
            log.record(item);
            info!(
                "{} landed; {} catches, {} kinds so far",
                item.item_type,
                log.total(),
                log.species_caught()
            );
        })
    }
}

/* ===========================================================
   input
   =========================================================== */

/// Edge-triggered fishing buttons for this frame.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct FishingControls {
    pub cast: bool,
    pub reel: bool,
    pub retract: bool,
    pub pointer: Option<Vec2>,
}

/// LMB cast, E reel, Q retract, T toggles auto-retract.
pub fn fishing_input_system(
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    window_q: Query<&Window, With<PrimaryWindow>>,
    cam_q: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut controls: ResMut<FishingControls>,
    mut session: ResMut<FishingSession>,
) {
    controls.cast = mouse.just_pressed(MouseButton::Left);
    controls.reel = keys.just_pressed(KeyCode::KeyE);
    controls.retract = keys.just_pressed(KeyCode::KeyQ);
    controls.pointer = window_q
        .get_single()
        .ok()
        .and_then(|w| w.cursor_position())
        .zip(cam_q.get_single().ok())
        .and_then(|(cursor, (cam, cam_tf))| cam.viewport_to_world_2d(cam_tf, cursor).ok());

    if keys.just_pressed(KeyCode::KeyT) {
        let enabled = !session.fishing.auto_retract_enabled();
        session.fishing.set_auto_retract(enabled);
        info!("auto-retract {}", if enabled { "on" } else { "off" });
    }
}

/* ===========================================================
   per-frame world + fishing
   =========================================================== */

/// Fishing side effects, re-published for other systems.
#[derive(Event, Debug, Clone)]
pub struct FishingNotice(pub FishingEvent);

/// Streams terrain, then water, then runs the fishing machine.
#[allow(clippy::too_many_arguments)]
pub fn fishing_world_system(
    mut commands: Commands,
    time: Res<Time>,
    controls: Res<FishingControls>,
    mut session: ResMut<FishingSession>,
    cam_q: Query<&Transform, With<MainCamera>>,
    player_q: Query<(&Transform, &Player)>,
    hook_q: Query<(Entity, &Transform, &GroundContacts), With<HookBody>>,
    mut notices: EventWriter<FishingNotice>,
) {
    let (player, facing) = player_q
        .get_single()
        .map_or((Vec2::ZERO, Facing::Right), |(tf, p)| (tf.translation.truncate(), p.facing));
    let frame = FrameInput {
        delta: time.delta(),
        player,
        facing,
        cast: controls.cast,
        reel: controls.reel,
        retract: controls.retract,
        pointer: controls.pointer,
    };
    let mut hook = match hook_q.get_single() {
        Ok((entity, tf, contacts)) => RapierHook::snapshot(entity, tf, contacts),
        Err(_) => RapierHook::missing(),
    };

    let focal = focal_x(&cam_q);
    let report = session.update(
        &frame,
        focal,
        &mut SceneCommands {
            commands: &mut commands,
        },
        &mut hook,
    );
    hook.apply(&mut commands);

    for failure in report.terrain.failures.iter().chain(&report.water.failures) {
        debug!("stream failure this frame: {failure}");
    }
    notices.send_batch(report.events.into_iter().map(FishingNotice));
}

pub fn announce_fishing_system(mut notices: EventReader<FishingNotice>) {
    for FishingNotice(event) in notices.read() {
        match event {
            FishingEvent::HookLanded { zone: Some(kind), .. } => info!("hook in the {kind}"),
            FishingEvent::BiteStarted { .. } => info!("bite! press E"),
            FishingEvent::FishEscaped => info!("it got away"),
            FishingEvent::AutoRetracted => info!("line reeled back in"),
            _ => {}
        }
    }
}

/// Once a fish bites the marker stays up until the rod is back to idle.
pub fn shows_bite_marker(state: FishingState) -> bool {
    matches!(
        state,
        FishingState::Bite | FishingState::Reeling | FishingState::Caught
    )
}

/// Bob the marker above a hooked fish.
pub fn bite_indicator_system(
    time: Res<Time>,
    session: Res<FishingSession>,
    mut q: Query<(&mut Transform, &mut Visibility, &mut BiteIndicator)>,
) {
    let Ok((mut tf, mut vis, mut mark)) = q.get_single_mut() else { return };
    let state = session.fishing.state();
    match session.fishing.hook_position() {
        Some(pos) if shows_bite_marker(state) => {
            mark.phase += time.delta_secs() * BITE_BOB_SPEED;
            let lift = BITE_MARK_LIFT + mark.phase.sin() * BITE_BOB_AMPLITUDE;
            tf.translation = (pos + Vec2::Y * lift).extend(HOOK_Z + 1.0);
            *vis = Visibility::Inherited;
        }
        _ => {
            mark.phase = 0.0;
            *vis = Visibility::Hidden;
        }
    }
}

/* ===========================================================
   startup
   =========================================================== */
pub fn setup_scene(mut commands: Commands) {
    commands.spawn((Camera2d, MainCamera));

    commands.spawn((
        Sprite::from_color(HOOK_COLOR, Vec2::splat(HOOK_RADIUS * 2.0)),
        Transform::from_xyz(0.0, 0.0, HOOK_Z),
        Visibility::Hidden,
        HookBody,
        GroundContacts::default(),
        RigidBody::Dynamic,
        Collider::ball(HOOK_RADIUS),
        CollisionGroups::new(HOOK_GROUP, TERRAIN_GROUP),
        Ccd::enabled(),
        Restitution::coefficient(0.1),
        Friction::coefficient(0.9),
        Velocity::zero(),
        GravityScale(0.0),
        ActiveEvents::COLLISION_EVENTS,
        (RigidBodyDisabled, ColliderDisabled),
    ));

    commands.spawn((
        Sprite::from_color(BITE_MARK_COLOR, Vec2::splat(BITE_MARK_SIZE)),
        Transform::default(),
        Visibility::Hidden,
        BiteIndicator::default(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catch::{CaughtItem, ItemCategory, Rarity};

    #[test]
    fn missing_hook_reports_errors() {
        let mut hook = RapierHook::missing();
        assert_eq!(hook.position(), Err(HookError::Missing));
        assert_eq!(hook.launch(Vec2::ZERO, Vec2::X), Err(HookError::Missing));
        assert!(hook.queued.is_empty());
    }

    #[test]
    fn launch_updates_snapshot_and_queues() {
        let entity = Entity::from_raw(7);
        let mut hook = RapierHook::snapshot(entity, &Transform::default(), &GroundContacts(2));
        assert_eq!(hook.is_touching_ground(), Ok(true));

        hook.launch(Vec2::new(5.0, 6.0), Vec2::new(100.0, 50.0)).unwrap();
        hook.hold().unwrap();
        hook.deactivate().unwrap();
        assert_eq!(hook.position(), Ok(Vec2::new(5.0, 6.0)));
        assert_eq!(hook.is_touching_ground(), Ok(false));
        assert_eq!(hook.queued.len(), 3);
        assert_eq!(hook.queued[2], HookCommand::Deactivate);
    }

    #[test]
    fn recorder_feeds_the_shared_log() {
        let shared = SharedCatchLog::default();
        let mut record = shared.recorder();
        let pike = CaughtItem {
            item_type: "pike".into(),
            category: ItemCategory::Fish(Rarity::Rare),
        };
        record(&pike);
        record(&pike);
        let log = shared.0.lock();
        assert_eq!(log.total(), 2);
        assert_eq!(log.count_of("pike"), 2);
    }

    #[test]
    fn bite_marker_lasts_until_reset() {
        assert!(!shows_bite_marker(FishingState::Idle));
        assert!(!shows_bite_marker(FishingState::Casting));
        assert!(!shows_bite_marker(FishingState::WaitingForBite));
        assert!(shows_bite_marker(FishingState::Bite));
        assert!(shows_bite_marker(FishingState::Reeling));
        assert!(shows_bite_marker(FishingState::Caught));
    }

    #[test]
    fn block_handles_round_trip_entities() {
        let e = Entity::from_raw(42);
        assert_eq!(entity_of(e.to_bits()), Some(e));
    }
}
