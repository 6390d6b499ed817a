mod animation;
mod assets;
mod audio;
mod camera;
mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod physics;
mod rendering;
mod scene;
mod sprite;
mod texture;
mod tilemap;
mod timer;
mod ui;

pub use animation::{AnimationDef, AnimationLibrary, AnimationPlayer, Repeat};
pub use assets::{
    load_assets, parse_manifest, AssetEntry, AssetLoadSummary, AssetManifestError,
    MANIFEST_FILE_NAME,
};
pub use audio::{AudioSink, SilentSink, SoundConfig, SoundId, SoundManager};
pub use camera::{Camera2D, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN};
pub use geometry::{Rect, Vec2};
pub use input::{InputAction, InputSnapshot, PressedEdges};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopStats;
pub use physics::{Body, BodyDesc, ColliderTarget, PhysicsWorld};
pub use rendering::{
    compose_frame, present_scale, text_size, window_to_logical, RenderError, Renderer, Viewport,
};
pub use scene::{AnimationEvent, Scene, SceneCommand, SceneWorld, Stage};
pub use sprite::{BobTween, Sprite, SpriteId, PLACEHOLDER_COLOR, PLACEHOLDER_SIZE_PX};
pub use texture::{blend_over, rgb_hex, with_alpha, Canvas, Rgba, Texture, TextureStore};
pub use tilemap::{LayerId, TileLayer, Tilemap, TilemapError};
pub use timer::{DelayedCalls, TimerId};
pub use ui::{Space, UiElement, UiId, UiKind};
