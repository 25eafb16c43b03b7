// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_network;
pub mod http_response;
pub mod memory_cache;
pub mod sun_table_loader;
pub mod svg_surface;
