pub mod blit;
pub mod blur;
pub mod composite;
pub mod filter;
pub mod hue;
pub(crate) mod pixel_cache;
pub mod radial_blur;
pub mod region;
pub mod surface;
pub mod texture_pool;
