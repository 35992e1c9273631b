#![doc = include_str!("../README.md")]

mod barrier;
mod channel;
mod demux;

pub use crate::barrier::*;
pub use crate::channel::*;
pub use crate::demux::*;
