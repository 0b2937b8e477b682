pub mod analyze;
pub mod config;
pub mod prd;
pub mod status;
