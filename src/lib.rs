pub mod app;
pub mod classify;
pub mod copier;
pub mod git;
pub mod logging;
pub mod paths;
pub mod plan;
pub mod report;
pub mod types;
pub mod update;
