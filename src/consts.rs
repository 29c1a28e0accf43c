// Floating point comparisons
pub const ALIGN_EPSILON: f64 = 1e-10;
pub const FEQ_EPSILON: f64 = 0.0001;

// Offset applied along the surface normal to secondary ray heads
pub const RAY_DELTA: f64 = 0.1;

// Recursion limits for global effects
pub const MAX_CALC_COLOR_LEVEL: usize = 10;
pub const MIN_CALC_COLOR_K: f64 = 0.001;

// Render loop parameters
pub const MAX_THREADS: usize = 4;
pub const PROGRESS_INTERVAL_PERCENT: usize = 10;

// Runtime defaults for the command line renderer
pub const DEFAULT_OUT_FILE: &str = "./out.ppm";
pub const DEFAULT_WIDTH: usize = 500;
pub const DEFAULT_HEIGHT: usize = 500;
