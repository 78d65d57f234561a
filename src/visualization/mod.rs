pub mod output;
pub mod heatmap;
pub mod animation;
#[cfg(feature = "viewer")]
pub mod viewer2d;
