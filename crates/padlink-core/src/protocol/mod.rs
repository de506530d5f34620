//! Wire protocol: typed input commands and the JSON codec that produces them.

pub mod codec;
pub mod command;

pub use codec::{decode, encode, DecodeError};
pub use command::{Command, ControlKind};
