//! Core build logic module
//!
//! Process spawning and file writing belong in [`crate::infra`]; the
//! collaborators the orchestrator needs are traits in [`context`].
//!
//! # Submodules
//!
//! - [`manifest`] - Manifest (flexbuild.toml) parsing
//! - [`unit`] - Modules, compile units and build targets
//! - [`options`] - Free-form compiler option handling
//! - [`plan`] - Build plan expansion
//! - [`dirty`] - Up-to-date check
//! - [`command`] - Compiler command line assembly
//! - [`classify`] - Compiler output classification
//! - [`diagnostics`] - Diagnostics and sinks
//! - [`context`] - Collaborator traits
//! - [`builder`] - Build orchestration logic

pub mod builder;
pub mod classify;
pub mod command;
pub mod context;
pub mod diagnostics;
pub mod dirty;
pub mod manifest;
pub mod options;
pub mod plan;
pub mod unit;
