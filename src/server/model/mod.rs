pub(crate) mod config;
pub(crate) mod meal;
pub(crate) mod receipt;
