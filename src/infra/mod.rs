//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem, build state and compiler
//! processes. This module is the only place where side effects occur.

pub mod compiler;
pub mod dirs;
pub mod filesystem;
pub mod process;
pub mod provisioner;
pub mod sdk;
pub mod state;
pub mod toolchain;
