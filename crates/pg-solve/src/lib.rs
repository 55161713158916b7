#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod attractor;
mod factory;
mod lifting;
mod scc;
mod spm;
mod statistics;
mod verify;
mod wrappers;
mod zielonka;

pub use attractor::*;
pub use factory::*;
pub use lifting::*;
pub use scc::*;
pub use spm::*;
pub use statistics::*;
pub use verify::*;
pub use wrappers::*;
pub use zielonka::*;
