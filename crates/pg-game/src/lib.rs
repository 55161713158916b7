#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod parity_game;
mod player;
mod raw;

pub use parity_game::*;
pub use player::*;
pub use raw::*;
