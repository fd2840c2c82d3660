pub mod factory;
pub mod install;
pub mod runner;
