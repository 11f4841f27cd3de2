//! O2Launch bootstrapper
//!
//! Glue between the core crate and the person starting the game: finds or
//! builds the song list, reports problems through native dialogs and hands
//! the process over to the game module.

pub mod bootstrap;
pub mod dialogs;
pub mod logging;
