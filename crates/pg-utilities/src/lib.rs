#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod abort;
mod error;
mod tagged_index;

pub use abort::*;
pub use error::*;
pub use tagged_index::*;
