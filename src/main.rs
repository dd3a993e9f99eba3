//! bootstrap for the fishing demo
//!
//! Works with **Bevy 0.15** + bevy_rapier2d 0.29. Set `FISHING_SEED` to pick
//! a world.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin,
    LogDiagnosticsPlugin,
};
use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::window::{MonitorSelection, PrimaryWindow, WindowMode};
use bevy_rapier2d::prelude::*;

use fishing_adventure::camera::camera_follow_system;
use fishing_adventure::config::{FishingConfig, WorldConfig};
use fishing_adventure::constants::*;
use fishing_adventure::player::{
    ground_contact_system, player_grounded_system, player_input_system, player_swim_system,
    spawn_player,
};
use fishing_adventure::scene::{
    announce_fishing_system, bite_indicator_system, fishing_input_system,
    fishing_world_system, setup_scene, FishingControls, FishingNotice, SharedCatchLog,
};
use fishing_adventure::session::FishingSession;

/* ------------------------------------------------------------------------ */
/* F11 borderless‑fullscreen toggle                                         */
/* ------------------------------------------------------------------------ */
fn toggle_fullscreen(
    keys: Res<ButtonInput<KeyCode>>,
    mut window_q: Query<&mut Window, With<PrimaryWindow>>,
) {
    if keys.just_pressed(KeyCode::F11) {
        let Ok(mut window) = window_q.get_single_mut() else { return };
        window.mode = match window.mode {
            WindowMode::Windowed => {
                WindowMode::BorderlessFullscreen(MonitorSelection::Primary)
            }
            _ => WindowMode::Windowed,
        };
    }
}

/* ------------------------------------------------------------------------ */
/* config                                                                   */
/* ------------------------------------------------------------------------ */
fn world_config() -> WorldConfig {
    match std::env::var("FISHING_SEED") {
        Ok(raw) => match raw.trim().parse() {
            Ok(seed) => WorldConfig::with_seed(seed),
            Err(_) => {
                warn!("FISHING_SEED={raw:?} is not a u32, using {DEFAULT_SEED}");
                WorldConfig::default()
            }
        },
        Err(_) => WorldConfig::default(),
    }
}

/* ------------------------------------------------------------------------ */
/* main                                                                     */
/* ------------------------------------------------------------------------ */
fn main() -> AppExit {
    let mut app = App::new();
    app
        /* diagnostics ----------------------------------------------------- */
        .add_plugins((
            LogDiagnosticsPlugin::default(),
            FrameTimeDiagnosticsPlugin::default(),
            EntityCountDiagnosticsPlugin::default(),
        ))

        /* bevy core ------------------------------------------------------- */
        .insert_resource(ClearColor(SKY_COLOR))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "fishing adventure".into(),
                resolution: (1280., 720.).into(),
                mode: WindowMode::Windowed,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(PIXELS_PER_METER));

    // LogPlugin is built by now, config problems go through the logger
    let world = world_config();
    let mut session = match FishingSession::new(&world, FishingConfig::default()) {
        Ok(session) => session,
        Err(err) => {
            error!("fishing_adventure: {err}");
            return AppExit::error();
        }
    };
    let catch_log = SharedCatchLog::default();
    session.fishing.on_catch(catch_log.recorder());

    app
        /* game state ------------------------------------------------------ */
        .insert_resource(world)
        .insert_resource(session)
        .insert_resource(catch_log)
        .init_resource::<FishingControls>()
        .add_event::<FishingNotice>()

        /* startup systems ------------------------------------------------- */
        .add_systems(Startup, (setup_scene, spawn_player))

        /* frame‑update systems ------------------------------------------- */
        .add_systems(
            Update,
            (
                ground_contact_system,    // collision events → contact counts
                player_grounded_system,
                player_swim_system,
                player_input_system,      // A/D + jump / swim
                fishing_input_system,     // LMB / E / Q / T
                fishing_world_system,     // terrain → water → fishing
                bite_indicator_system,
                announce_fishing_system,
                toggle_fullscreen,
            )
                .chain(),
        )

        /* post‑update (camera) -------------------------------------------- */
        .add_systems(
            PostUpdate,
            camera_follow_system.after(PhysicsSet::Writeback),
        )
        .run()
}
