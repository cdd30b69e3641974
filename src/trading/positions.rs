//! Position lifecycle management: reversal exits and trailing stops.
//!
//! Every open position is re-evaluated each cycle against a fresh signal.
//! A close decision is issued exactly once per open position; the pending
//! mark is cleared when the position disappears from the broker's list, or
//! explicitly when a close request fails so the next tick re-attempts it.

use std::collections::HashSet;

use crate::models::{Position, Side};

use super::strategy::TradeSignal;

/// Multiple of ATR used for the trailing-stop distance.
const TRAIL_ATR_MULTIPLE: f64 = 2.0;

/// What to do with an open position this cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionAction {
    /// Reversal exit: the fresh signal opposes the held direction.
    Close { reason: String },
    /// Advisory trailing-stop level for the gateway to apply. The core
    /// never assumes the amendment took effect.
    AmendStop { level: f64 },
    Hold,
}

/// Re-evaluates open positions each cycle.
#[derive(Debug, Default)]
pub struct PositionManager {
    pending_close: HashSet<String>,
}

impl PositionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile with the broker's open-position list at the top of a
    /// cycle: a position that is gone no longer has a pending close.
    pub fn sync(&mut self, open_positions: &[Position]) {
        self.pending_close
            .retain(|instrument| open_positions.iter().any(|p| &p.instrument == instrument));
    }

    /// Decide the action for one open position given its fresh signal.
    pub fn review(
        &mut self,
        position: &Position,
        signal: &TradeSignal,
        atr: f64,
        current_price: f64,
        min_confidence: f64,
    ) -> PositionAction {
        if self.pending_close.contains(&position.instrument) {
            return PositionAction::Hold;
        }

        let reversed = match position.side {
            Side::Long => signal.direction.is_sell(),
            Side::Short => signal.direction.is_buy(),
        };

        if reversed && signal.confidence >= min_confidence {
            self.pending_close.insert(position.instrument.clone());
            return PositionAction::Close {
                reason: format!(
                    "signal reversed against {} position: {}",
                    position.side, signal.rationale
                ),
            };
        }

        if position.is_profitable() && atr > 0.0 {
            let level = match position.side {
                Side::Long => current_price - TRAIL_ATR_MULTIPLE * atr,
                Side::Short => current_price + TRAIL_ATR_MULTIPLE * atr,
            };
            return PositionAction::AmendStop { level };
        }

        PositionAction::Hold
    }

    /// A close request failed; allow the next cycle to issue it again.
    pub fn close_failed(&mut self, instrument: &str) {
        self.pending_close.remove(instrument);
    }
}
