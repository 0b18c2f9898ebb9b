//! Command-line interface

pub mod commands;

pub use commands::{
    cmd_checksum, cmd_derive, cmd_endpoint, cmd_generate, compute_checksum, derive_public_key,
    CliResult,
};
