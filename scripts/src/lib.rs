//! Scripts for deploying and wiring up the TownStory game contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod deployments;
pub mod errors;
pub mod pipeline;
pub mod report;
mod solidity;
pub mod types;
