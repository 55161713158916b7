#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod bitstream;
mod header;

pub use bitstream::*;
pub use header::*;
