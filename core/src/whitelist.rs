//! Manager-controlled address whitelist

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::address::Address;
use crate::error::{LedgerError, Result};
use crate::events::Event;

/// Set of whitelisted addresses, edited by a single manager.
///
/// Edits return the events they produce instead of logging them, so the
/// owning ledger decides where the notifications go. An edit that does not
/// change membership produces no event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Whitelist {
    manager: Address,
    members: HashMap<Address, bool>,
}

impl Whitelist {
    pub fn new(manager: Address) -> Self {
        Self {
            manager,
            members: HashMap::new(),
        }
    }

    pub fn manager(&self) -> Address {
        self.manager
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.members.get(account).copied().unwrap_or(false)
    }

    pub fn add(&mut self, caller: &Address, account: Address) -> Result<Option<Event>> {
        self.ensure_manager(caller)?;
        Ok(self.set_status(account, true))
    }

    pub fn remove(&mut self, caller: &Address, account: Address) -> Result<Option<Event>> {
        self.ensure_manager(caller)?;
        Ok(self.set_status(account, false))
    }

    /// Apply `status` to every account. Authorization is checked once, before
    /// anything is written.
    pub fn modify_multiple(
        &mut self,
        caller: &Address,
        accounts: &[Address],
        status: bool,
    ) -> Result<Vec<Event>> {
        self.ensure_manager(caller)?;
        Ok(accounts
            .iter()
            .filter_map(|account| self.set_status(*account, status))
            .collect())
    }

    /// Reassign the manager role. Only `owner` may do this; the current
    /// manager cannot hand the role on by itself.
    pub fn change_manager(
        &mut self,
        caller: &Address,
        owner: &Address,
        new_manager: Address,
    ) -> Result<Event> {
        if caller != owner {
            warn!("Rejected whitelist manager change from {}", caller);
            return Err(LedgerError::Unauthorized { caller: *caller });
        }

        self.manager = new_manager;
        info!("Whitelist manager changed to {}", new_manager);
        Ok(Event::WhitelistManagerChange {
            manager: new_manager,
        })
    }

    fn ensure_manager(&self, caller: &Address) -> Result<()> {
        if *caller != self.manager {
            warn!("Rejected whitelist edit from non-manager {}", caller);
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    fn set_status(&mut self, account: Address, status: bool) -> Option<Event> {
        if self.is_whitelisted(&account) == status {
            return None;
        }

        if status {
            self.members.insert(account, true);
        } else {
            self.members.remove(&account);
        }
        debug!("Whitelist status of {} set to {}", account, status);
        Some(Event::WhitelistEdit {
            subject: account,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Address = Address::from_low_u8(0xaa);
    const ALICE: Address = Address::from_low_u8(1);
    const BOB: Address = Address::from_low_u8(2);

    #[test]
    fn test_add_emits_only_on_change() {
        let mut list = Whitelist::new(OWNER);

        let first = list.add(&OWNER, ALICE).unwrap();
        assert_eq!(
            first,
            Some(Event::WhitelistEdit {
                subject: ALICE,
                status: true
            })
        );
        assert!(list.is_whitelisted(&ALICE));

        assert_eq!(list.add(&OWNER, ALICE).unwrap(), None);
        assert!(list.is_whitelisted(&ALICE));
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let mut list = Whitelist::new(OWNER);
        assert_eq!(list.remove(&OWNER, BOB).unwrap(), None);
        assert!(!list.is_whitelisted(&BOB));
    }

    #[test]
    fn test_non_manager_cannot_edit() {
        let mut list = Whitelist::new(OWNER);

        assert_eq!(
            list.add(&ALICE, ALICE),
            Err(LedgerError::Unauthorized { caller: ALICE })
        );
        assert!(list
            .modify_multiple(&ALICE, &[ALICE, BOB], true)
            .is_err());
        assert!(!list.is_whitelisted(&ALICE));
        assert!(!list.is_whitelisted(&BOB));
    }

    #[test]
    fn test_batch_skips_unchanged_entries() {
        let mut list = Whitelist::new(OWNER);
        list.add(&OWNER, ALICE).unwrap();

        let events = list.modify_multiple(&OWNER, &[ALICE, BOB], true).unwrap();
        assert_eq!(
            events,
            vec![Event::WhitelistEdit {
                subject: BOB,
                status: true
            }]
        );
    }

    #[test]
    fn test_manager_cannot_reassign_itself() {
        let mut list = Whitelist::new(ALICE);

        assert!(list.change_manager(&ALICE, &OWNER, BOB).is_err());
        assert_eq!(list.manager(), ALICE);

        list.change_manager(&OWNER, &OWNER, BOB).unwrap();
        assert_eq!(list.manager(), BOB);
    }
}
