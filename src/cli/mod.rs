pub mod calc;
pub mod fetch;
pub mod interactive;
pub mod report;
pub mod setup;
pub mod ui;
