use serde::{Deserialize, Serialize};

use crate::blockchain::BLOCK_REWARD_SENDER;

/// A token transfer. Reward transactions use the reserved
/// `BLOCK_REWARD_SENDER` instead of a real node address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Newly issued tokens paid to a round winner.
    pub fn reward(recipient: impl Into<String>, amount: f64) -> Self {
        Self::new(BLOCK_REWARD_SENDER, recipient, amount)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == BLOCK_REWARD_SENDER
    }

    /// Signed effect of this transaction on `address`'s balance.
    pub fn delta_for(&self, address: &str) -> f64 {
        let mut delta = 0.0;
        if self.recipient == address {
            delta += self.amount;
        }
        if self.sender == address {
            delta -= self.amount;
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::Transaction;

    #[test]
    fn reward_uses_reserved_sender() {
        let tx = Transaction::reward("node-a", 1000.0);
        assert!(tx.is_reward());
        assert_eq!(tx.recipient, "node-a");
    }

    #[test]
    fn self_transfer_nets_to_zero() {
        let tx = Transaction::new("a", "a", 5.0);
        assert_eq!(tx.delta_for("a"), 0.0);
        assert_eq!(tx.delta_for("b"), 0.0);
    }
}
