// Path planning: minimum-jerk synthesis and output path resampling

pub mod cubic_spline;
pub mod quintic_polynomials;
pub mod path_resampler;

pub use cubic_spline::*;
pub use quintic_polynomials::*;
pub use path_resampler::*;
