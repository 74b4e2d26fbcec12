/*-------------------------------------------------------------------------------------------------
  Core Modules
-------------------------------------------------------------------------------------------------*/

pub mod cache;
pub mod client;
pub mod config;
pub mod dataset;
pub mod datetime;
pub mod errors;
pub mod fetcher;
pub mod filter;
pub mod json;
