//! Access-gated entity mirrors and the command pipeline.
//!
//! This crate is the protocol endpoint a player's code talks to. A
//! [`Session`](session::Session) mirrors every simulation slot into a
//! client-side [`UnitMirror`](mirror::UnitMirror), refreshed once per tick
//! from a [`RawStateSource`](stratlink_core::source::RawStateSource).
//! Queries go through the three-tier access gate and answer with sentinels
//! when denied; commands run the validate, dispatch, compensate pipeline
//! and land in the ordered [`CommandLog`](log::CommandLog).

#![deny(unsafe_code)]

pub(crate) mod access;
mod command;
pub mod log;
pub mod mirror;
pub mod session;
pub mod unit;

pub mod prelude {
    pub use crate::log::{CommandLog, IssuedCommand};
    pub use crate::mirror::{InitialSnapshot, MirrorPool, SavedUnit, UnitLink, UnitMirror};
    pub use crate::session::Session;
    pub use crate::unit::UnitView;
    pub use stratlink_core::prelude::*;
}
