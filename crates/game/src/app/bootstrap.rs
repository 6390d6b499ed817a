use engine::{
    load_assets, resolve_app_paths, AssetManifestError, LoopConfig, Scene, SceneWorld,
    StartupError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay;
use super::preferences::PreferenceStore;

const SEED_ENV_VAR: &str = "PIXEL_VILLAGE_SEED";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Assets(#[from] AssetManifestError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) world: SceneWorld,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Pixel Village Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        assets = %paths.assets_dir.display(),
        "app_paths_resolved"
    );

    let mut world = SceneWorld::default();
    {
        let (textures, sounds) = world.asset_stores_mut();
        load_assets(&paths.assets_dir, textures, sounds)?;
    }

    let preferences = PreferenceStore::in_cache_dir(&paths.cache_dir);
    let music_enabled = preferences.music_enabled_or_default();
    let music_setter = Box::new(move |enabled: bool| {
        if let Err(error) = preferences.write_music_enabled(enabled) {
            warn!(error = %error, "preferences_write_failed");
        }
    });

    let scene = gameplay::build_scene(world_rng(), music_enabled, music_setter);
    Ok(AppWiring {
        config: LoopConfig::default(),
        scene,
        world,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_seed(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// Seeded from `PIXEL_VILLAGE_SEED` when it holds a u64, otherwise from
/// entropy.
fn world_rng() -> StdRng {
    match std::env::var(SEED_ENV_VAR) {
        Ok(raw) => match parse_seed(&raw) {
            Some(seed) => {
                info!(seed, "world_seed_fixed");
                StdRng::seed_from_u64(seed)
            }
            None => {
                warn!(value = %raw, env_var = SEED_ENV_VAR, "world_seed_invalid");
                StdRng::from_entropy()
            }
        },
        Err(_) => StdRng::from_entropy(),
    }
}
