pub mod config;
pub mod logging;

pub mod batch;
pub mod dispatch;
pub mod outcome;
pub mod probe;
pub mod resolver;
pub mod retry;
