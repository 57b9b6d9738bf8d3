pub mod common;
pub mod config;
pub mod counts;
pub mod ignore;
pub mod list;
pub mod purge;
pub mod resolve;
pub mod show;
