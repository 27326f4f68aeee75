// Path Planning algorithms module

pub mod figure_eight;

pub use figure_eight::*;
