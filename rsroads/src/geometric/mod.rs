pub mod chain_builder;
pub mod elevation;
pub mod road;
