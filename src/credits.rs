use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditLogEntry {
    pub id: String,
    pub description: String,
    pub hours: f64,
    pub created_at: DateTime<Utc>,
}

/// key: dev-credits -> used/total hours reported by billing
///
/// Values are trusted as reported; `used_hours` may exceed `total_hours` and
/// is clamped only when deriving the balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevCreditLedger {
    pub used_hours: f64,
    pub total_hours: f64,
    #[serde(default)]
    pub logs: Vec<CreditLogEntry>,
}

impl DevCreditLedger {
    pub fn new(used_hours: f64, total_hours: f64) -> Self {
        Self {
            used_hours,
            total_hours,
            logs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalance {
    pub remaining_hours: f64,
    pub percent: f64,
}

/// Remaining hours and percentage for display. Without a ledger the tier
/// allowance is shown as fully available.
pub fn remaining(ledger: Option<&DevCreditLedger>, fallback_total: f64) -> CreditBalance {
    let Some(ledger) = ledger else {
        return CreditBalance {
            remaining_hours: fallback_total,
            percent: 100.0,
        };
    };

    let remaining_hours = (ledger.total_hours - ledger.used_hours).max(0.0);
    let percent = if ledger.total_hours > 0.0 {
        remaining_hours / ledger.total_hours * 100.0
    } else {
        0.0
    };

    CreditBalance {
        remaining_hours,
        percent,
    }
}

/// Session-side view of the credit ledger. Holds the last good fetch and
/// the tier allowance used while nothing has been fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditLedgerView {
    ledger: Option<DevCreditLedger>,
    fallback_total: f64,
}

impl CreditLedgerView {
    pub fn new(fallback_total: f64) -> Self {
        Self {
            ledger: None,
            fallback_total,
        }
    }

    pub fn ledger(&self) -> Option<&DevCreditLedger> {
        self.ledger.as_ref()
    }

    pub fn balance(&self) -> CreditBalance {
        remaining(self.ledger.as_ref(), self.fallback_total)
    }

    /// Plan changes swap the allowance and drop the ledger fetched under the
    /// previous plan.
    pub fn reset(&mut self, fallback_total: f64) {
        self.ledger = None;
        self.fallback_total = fallback_total;
    }

    /// Applies a completed fetch. Failures revert to the fallback and are
    /// only logged.
    pub fn apply_refresh(&mut self, outcome: anyhow::Result<DevCreditLedger>) {
        match outcome {
            Ok(ledger) => {
                debug!(
                    used_hours = ledger.used_hours,
                    total_hours = ledger.total_hours,
                    "dev credit ledger refreshed"
                );
                self.ledger = Some(ledger);
            }
            Err(err) => {
                warn!(
                    ?err,
                    fallback_total = self.fallback_total,
                    "dev credit fetch failed; showing plan allowance"
                );
                self.ledger = None;
            }
        }
    }
}
