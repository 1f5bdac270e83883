//! The line-oriented console report of a deployment run

use std::io::Write;

use alloy_primitives::{utils::format_ether, Address, U256};

use crate::{constants::ADD_GAME_OWNER_BATCH_METHOD, errors::ScriptError, types::GameContract};

/// Writes the progress of a run to a console-like sink
pub struct Report<W: Write> {
    /// The sink, usually stdout
    out: W,
}

impl<W: Write> Report<W> {
    /// Create a report writing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Report the deployer and its balance before the run
    pub fn deployer(&mut self, deployer: Address, balance: U256) -> Result<(), ScriptError> {
        self.line(format_args!("Deployer: {deployer}"))?;
        self.line(format_args!("Balance: {}", format_ether(balance)))
    }

    /// Report a deployed contract
    pub fn contract(
        &mut self,
        contract: GameContract,
        address: Address,
    ) -> Result<(), ScriptError> {
        self.line(format_args!("{contract} contract: {address}"))
    }

    /// Open the authorization section
    pub fn setting(&mut self) -> Result<(), ScriptError> {
        self.line(format_args!("\nSetting:"))
    }

    /// Report a confirmed authorization grant
    pub fn granted(&mut self, target: GameContract) -> Result<(), ScriptError> {
        self.line(format_args!(
            "{target} {ADD_GAME_OWNER_BATCH_METHOD} successfully"
        ))
    }

    /// Report the balance after the run and the fees spent
    pub fn cost(&mut self, end_balance: U256, fee_spent: U256) -> Result<(), ScriptError> {
        self.line(format_args!(
            "\nLatest balance: {}",
            format_ether(end_balance)
        ))?;
        self.line(format_args!("Gas: {}", format_ether(fee_spent)))
    }

    /// Write a single line and flush it
    fn line(&mut self, args: std::fmt::Arguments<'_>) -> Result<(), ScriptError> {
        writeln!(self.out, "{args}")
            .and_then(|_| self.out.flush())
            .map_err(|e| ScriptError::Report(e.to_string()))
    }
}
