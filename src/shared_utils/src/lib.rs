//! Small helpers shared by the workspace binaries: environment access and
//! TOML file loading.

pub mod config;
pub mod env;
