// Application state for HTTP handlers
use crate::application::asset_cache_router::AssetCacheRouter;
use crate::application::icon_service::IconService;
use crate::infrastructure::config::CacheSettings;

#[derive(Clone)]
pub struct AppState {
    pub router: AssetCacheRouter,
    pub icon_service: IconService,
    pub cache_settings: CacheSettings,
}
