//! CoefficientProvider (C3, spec §4.3) - immutable game -> coefficient
//! mapping loaded once from configuration. No hidden globals (spec §9
//! design notes): callers construct one and pass it explicitly.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::errors::EngineError;

/// Immutable coefficient table. A reload requires constructing a new
/// instance - there is no interior mutability here by design.
#[derive(Debug, Clone)]
pub struct CoefficientProvider {
    coefficients: HashMap<String, Decimal>,
}

impl CoefficientProvider {
    pub fn new(coefficients: HashMap<String, Decimal>) -> Self {
        Self { coefficients }
    }

    /// Look up the coefficient for `game`, failing with a dedicated error
    /// if the game isn't configured.
    pub fn get(&self, game: &str) -> Result<Decimal, EngineError> {
        self.coefficients
            .get(game)
            .copied()
            .ok_or_else(|| EngineError::UnknownGame(game.to_string()))
    }

    /// Validate that every game in `required` has a configured coefficient.
    /// Called once at startup (spec §4.3: missing keys are a startup error).
    pub fn ensure_configured(&self, required: &[&str]) -> Result<(), EngineError> {
        for game in required {
            if !self.coefficients.contains_key(*game) {
                return Err(EngineError::Config(format!(
                    "missing coefficient for required game {:?}",
                    game
                )));
            }
        }
        Ok(())
    }
}
