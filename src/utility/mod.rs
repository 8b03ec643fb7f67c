pub mod timing;

pub use timing::{timed, Timer};
