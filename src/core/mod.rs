pub mod config;
pub mod form;
pub mod script;
pub mod state;
