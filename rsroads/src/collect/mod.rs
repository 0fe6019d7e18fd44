pub mod global_variables;
#[cfg(feature = "http")]
pub mod open_elevation;
