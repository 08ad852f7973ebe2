//! CLI subcommands.
pub mod generate;
