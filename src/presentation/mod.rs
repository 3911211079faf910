pub mod display;

pub use display::{format_result, print_results, render_result};
