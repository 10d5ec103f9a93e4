use serde::{Deserialize, Serialize};

use hamlet_types::{common::ResourceGroup, errors::GameError};

/// Resources every new village starts with.
pub const STARTING_RESOURCES: ResourceGroup = ResourceGroup::new(1000, 1000, 1000, 1000);

/// Current resource balance of a player. Every quantity change goes through
/// `debit` or `credit`, a debit either applies entirely or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLedger {
    balance: ResourceGroup,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new(STARTING_RESOURCES)
    }
}

impl ResourceLedger {
    pub fn new(balance: ResourceGroup) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> ResourceGroup {
        self.balance
    }

    /// True iff every resource in the balance covers the matching cost.
    pub fn affordable(&self, cost: &ResourceGroup) -> bool {
        self.balance.covers(cost)
    }

    /// Subtracts `cost` from the balance, failing with the missing amounts otherwise.
    pub fn debit(&mut self, cost: &ResourceGroup) -> Result<(), GameError> {
        match self.balance.checked_sub(cost) {
            Some(balance) => {
                self.balance = balance;
                Ok(())
            }
            None => Err(GameError::InsufficientResources {
                missing: self.balance.shortfall(cost),
            }),
        }
    }

    pub fn credit(&mut self, delta: &ResourceGroup) {
        self.balance = self.balance.saturating_add(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_subtracts_componentwise() {
        let mut ledger = ResourceLedger::new(ResourceGroup::new(500, 400, 300, 200));
        ledger.debit(&ResourceGroup::new(100, 100, 100, 100)).unwrap();
        assert_eq!(ledger.balance(), ResourceGroup::new(400, 300, 200, 100));
    }

    #[test]
    fn test_debit_is_atomic_on_failure() {
        let mut ledger = ResourceLedger::new(ResourceGroup::new(500, 400, 300, 200));
        let result = ledger.debit(&ResourceGroup::new(100, 100, 100, 250));

        assert_eq!(
            result,
            Err(GameError::InsufficientResources {
                missing: ResourceGroup::new(0, 0, 0, 50)
            })
        );
        assert_eq!(
            ledger.balance(),
            ResourceGroup::new(500, 400, 300, 200),
            "balance must be untouched after a failed debit"
        );
    }

    #[test]
    fn test_error_message_names_short_resources() {
        let mut ledger = ResourceLedger::new(ResourceGroup::new(10, 400, 0, 200));
        let err = ledger
            .debit(&ResourceGroup::new(30, 100, 5, 100))
            .unwrap_err();
        assert_eq!(err.to_string(), "Not enough resources: missing 20 wood, 5 iron");
    }

    #[test]
    fn test_affordable_and_credit() {
        let mut ledger = ResourceLedger::new(ResourceGroup::zero());
        let cost = ResourceGroup::new(10, 10, 10, 10);
        assert!(!ledger.affordable(&cost));

        ledger.credit(&ResourceGroup::new(10, 20, 30, 40));
        assert!(ledger.affordable(&cost));
        assert_eq!(ledger.balance(), ResourceGroup::new(10, 20, 30, 40));
    }
}
