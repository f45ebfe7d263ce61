pub mod api;
pub mod config;
pub mod forms;
pub mod http;
pub mod model;
pub mod session;
pub mod state;
pub mod worker;
