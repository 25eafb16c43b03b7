// Application layer - Use cases and the traits infrastructure implements
pub mod asset_cache_router;
pub mod cache_storage;
pub mod drawing_surface;
pub mod icon_renderer;
pub mod icon_service;
pub mod network;
