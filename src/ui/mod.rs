pub mod activity;
pub mod panels;
pub mod plot;
pub mod snapshot;
pub mod tables;
pub mod tasks;
