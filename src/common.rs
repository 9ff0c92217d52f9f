pub mod error;
pub mod normalize;
