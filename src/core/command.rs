//! Compiler command line assembly
//!
//! The command line is the JVM invocation of an SDK entry point, then one
//! `-load-config` per config file, then the free-form options of the
//! project, the module and the unit, in that order.

use semver::Version;
use std::path::{Path, PathBuf};

use crate::config::defaults::{
    COMPC_ENTRY, LEGACY_MXMLC_ENTRY, MODERN_COMPILER_MAJOR_VERSION, MXMLC_ENTRY,
};
use crate::core::context::{SdkDescriptor, SdkKind};
use crate::core::options::{expand_options, MacroContext};
use crate::core::unit::OutputKind;

/// Free-form option strings, lowest precedence first
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionSources<'a> {
    /// Project-level options
    pub project: &'a str,
    /// Module-level options
    pub module: &'a str,
    /// Unit-level options
    pub unit: &'a str,
}

/// Parse an SDK version string such as `4.6.0.23201` or `3.5`
///
/// Only the first three numeric components are kept; missing ones are zero.
pub fn parse_sdk_version(version: &str) -> Option<Version> {
    let mut parts = version.trim().split(['.', '-', '_', ' ']).map(|part| {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        digits.parse::<u64>().ok()
    });

    let major = parts.next().flatten()?;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);
    Some(Version::new(major, minor, patch))
}

/// Compiler entry point class for a unit kind and SDK version
pub fn entry_point(kind: OutputKind, sdk_version: &str) -> &'static str {
    if kind.is_library() {
        return COMPC_ENTRY;
    }

    let threshold = Version::new(MODERN_COMPILER_MAJOR_VERSION, 0, 0);
    match parse_sdk_version(sdk_version) {
        Some(version) if version >= threshold => MXMLC_ENTRY,
        _ => LEGACY_MXMLC_ENTRY,
    }
}

/// Classpath for the SDK compiler
pub fn compiler_classpath(sdk: &SdkDescriptor) -> Vec<PathBuf> {
    let mut classpath = Vec::new();
    if sdk.kind == SdkKind::Flex {
        let lib = sdk.home.join("lib");
        classpath.push(lib.join("mxmlc.jar"));
        classpath.push(lib.join("compc.jar"));
    }
    classpath.extend(sdk.classpath.iter().cloned());
    classpath
}

/// JVM invocation of an SDK tool entry point
pub fn toolchain_command(java: &Path, heap: &str, sdk: &SdkDescriptor, entry: &str) -> Vec<String> {
    let home = sdk.home.display();
    let separator = if cfg!(windows) { ";" } else { ":" };
    let classpath = compiler_classpath(sdk)
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(separator);

    vec![
        java.display().to_string(),
        format!("-Xmx{heap}"),
        "-Dsun.io.useCanonCaches=false".to_string(),
        "-Duser.language=en".to_string(),
        "-Duser.region=en".to_string(),
        format!("-Dapplication.home={home}"),
        format!("-Dflexlib={home}/frameworks"),
        "-classpath".to_string(),
        classpath,
        entry.to_string(),
    ]
}

/// Full compiler command line
pub fn build_command(
    toolchain: Vec<String>,
    config_files: &[PathBuf],
    options: &OptionSources<'_>,
    ctx: &MacroContext,
) -> Vec<String> {
    let mut command = toolchain;
    command.extend(
        config_files
            .iter()
            .map(|f| format!("-load-config={}", f.display())),
    );
    for source in [options.project, options.module, options.unit] {
        command.extend(expand_options(source, ctx));
    }
    command
}
