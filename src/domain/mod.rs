// Domain layer - Pure models and decision logic
pub mod cache;
pub mod icon;
pub mod sun_times;
