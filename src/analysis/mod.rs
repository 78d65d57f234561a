pub mod range;
pub mod sampler;
pub mod divergence;
pub mod sweep;
