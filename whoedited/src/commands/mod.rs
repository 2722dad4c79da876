mod completions;
pub use completions::*;

mod trace;
pub use trace::*;
