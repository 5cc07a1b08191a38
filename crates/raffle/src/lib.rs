#![doc = include_str!("../README.md")]

mod base32;
mod catalog;
mod draw;
mod error;
mod id;
mod rand;
mod shuffle;
mod store;

pub use crate::catalog::*;
pub use crate::draw::*;
pub use crate::error::*;
pub use crate::id::*;
pub use crate::rand::*;
pub use crate::shuffle::*;
pub use crate::store::*;
