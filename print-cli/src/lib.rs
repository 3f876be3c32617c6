pub mod app;
pub mod config;
pub mod csv_loader;
pub mod forms;
pub mod logging;
pub mod quote_request;
pub mod storage;
