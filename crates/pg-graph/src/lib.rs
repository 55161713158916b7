#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod random;
mod raw;
mod static_graph;

pub use random::*;
pub use raw::*;
pub use static_graph::*;
