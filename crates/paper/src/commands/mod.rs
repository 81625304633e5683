//! CLI command implementations.

pub(crate) mod rebuild;

pub(crate) use rebuild::RebuildArgs;
