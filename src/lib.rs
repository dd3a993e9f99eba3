//! Side-scrolling fishing game: streamed procedural terrain and water zones
//! with a frame-driven cast / bite / reel loop on top.

pub mod basin;
pub mod camera;
pub mod catch;
pub mod chunk_stream;
pub mod components;
pub mod config;
pub mod constants;
pub mod error;
pub mod fishing;
pub mod hook;
pub mod noise_field;
pub mod player;
pub mod population;
pub mod scene;
pub mod session;
pub mod terrain;
pub mod timers;
pub mod water;
