//! Flexbuild - build orchestrator for Flex SDK projects
//!
//! This library turns a build configuration into an ordered plan of
//! compile units (the main artifact, its runtime-loaded modules and its
//! runtime stylesheets), runs the SDK compiler for each unit and folds the
//! individual outcomes into one build result.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Build logic: data model, planning, classification, orchestration
//! - [`infra`] - Infrastructure layer (filesystem, processes, SDKs, state)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
