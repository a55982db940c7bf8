// 3.0 config.rs: explicit account context passed into every core call.
// no implicit environment capture: whoever holds a Snapshot decides which
// account and which protocol scripts it is about.

use crate::cell::Script;
use serde::{Deserialize, Serialize};

// 3.1: the protocol scripts cells are classified against.
//   token - kind script of pegged-token cells
//   logic - deposit lock and receipt kind
//   stake - staking reserve kind on deposit and withdrawal cells
//   order - limit order lock
//   owner - owned-withdrawal-request lock, paired with an owner cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemScripts {
    pub token: Script,
    pub logic: Script,
    pub stake: Script,
    pub order: Script,
    pub owner: Script,
}

impl SystemScripts {
    fn all(&self) -> [&Script; 5] {
        [&self.token, &self.logic, &self.stake, &self.order, &self.owner]
    }
}

// 3.2: one account's view of the chain. size_overhead is the witness
// placeholder cost of the account's signing scheme, probed by the signer
// once per snapshot and reused for every fee computation within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub account_lock: Script,
    pub scripts: SystemScripts,
    pub size_overhead: usize,
}

impl AccountConfig {
    // a self-consistent testnet preset with distinct placeholder scripts.
    // fixtures and the simulator use this; production callers bring real
    // script hashes.
    pub fn testnet(account_lock: Script) -> Self {
        Self {
            account_lock,
            scripts: SystemScripts {
                token: Script::tagged(0xa1),
                logic: Script::tagged(0xa2),
                stake: Script::tagged(0xa3),
                order: Script::tagged(0xa4),
                owner: Script::tagged(0xa5),
            },
            // one secp256k1 witness
            size_overhead: 85,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scripts = self.scripts.all();
        for (i, a) in scripts.iter().enumerate() {
            if **a == self.account_lock {
                return Err(ConfigError::AccountLockCollision {
                    reason: "account lock matches a protocol script".to_string(),
                });
            }
            for b in scripts.iter().skip(i + 1) {
                if a == b {
                    return Err(ConfigError::DuplicateScript {
                        reason: "two protocol scripts share an identity".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    AccountLockCollision { reason: String },
    DuplicateScript { reason: String },
}
