//! Token ledger state machine
//!
//! A ledger starts in the minting phase, where the owner may create supply
//! and transfers are refused. Finishing minting moves it permanently to the
//! transferable phase, where supply is fixed and holders may move tokens.
//! Every balance change is written through to the checkpoint store at the
//! sequence number supplied by the caller.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::address::Address;
use crate::checkpoint::{CheckpointStore, History};
use crate::config::TokenConfig;
use crate::error::{LedgerError, Result};
use crate::events::{Event, EventLog};
use crate::whitelist::Whitelist;
use crate::{Balance, LedgerId, Sequence};

/// Lifecycle phase of a ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerPhase {
    /// Supply may grow, transfers are refused
    Minting,
    /// Supply is fixed, transfers are allowed
    Transferable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    id: LedgerId,
    owner: Address,
    config: TokenConfig,
    phase: LedgerPhase,
    balances: HashMap<Address, Balance>,
    checkpoints: CheckpointStore,
    total_supply: Balance,
    supply_history: History,
    allowances: HashMap<Address, HashMap<Address, Balance>>,
    whitelist: Whitelist,
    last_sequence: Sequence,
    events: EventLog,
}

impl Ledger {
    /// Create a ledger owned by `owner`, who also starts out as whitelist
    /// manager.
    pub fn new(owner: Address, config: TokenConfig) -> Self {
        let id = uuid::Uuid::new_v4();
        info!("Created ledger {} ({}) owned by {}", id, config.symbol, owner);

        Self {
            id,
            owner,
            config,
            phase: LedgerPhase::Minting,
            balances: HashMap::new(),
            checkpoints: CheckpointStore::new(),
            total_supply: 0,
            supply_history: History::new(),
            allowances: HashMap::new(),
            whitelist: Whitelist::new(owner),
            last_sequence: 0,
            events: EventLog::new(),
        }
    }

    pub fn id(&self) -> LedgerId {
        self.id
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.config.decimals
    }

    pub fn phase(&self) -> LedgerPhase {
        self.phase
    }

    pub fn transfers_enabled(&self) -> bool {
        self.phase == LedgerPhase::Transferable
    }

    /// Highest sequence number any mutation has been applied at
    pub fn last_sequence(&self) -> Sequence {
        self.last_sequence
    }

    pub fn total_supply(&self) -> Balance {
        self.total_supply
    }

    pub fn total_supply_at(&self, sequence: Sequence) -> Balance {
        self.supply_history.value_at(sequence)
    }

    pub fn balance_of(&self, account: &Address) -> Balance {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn balance_of_at(&self, account: &Address, sequence: Sequence) -> Balance {
        self.checkpoints.balance_at(account, sequence)
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    /// Every account the ledger has a balance entry for, including ones
    /// that have since dropped to zero
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Balance)> {
        self.balances.iter()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Balance {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Create `amounts[i]` new tokens for `accounts[i]`.
    ///
    /// Owner only, minting phase only. The batch is validated as a whole
    /// before any balance changes.
    pub fn mint(
        &mut self,
        caller: &Address,
        accounts: &[Address],
        amounts: &[Balance],
        sequence: Sequence,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        if self.phase != LedgerPhase::Minting {
            return Err(LedgerError::MintingClosed);
        }
        if accounts.len() != amounts.len() {
            return Err(LedgerError::InvalidArgument(format!(
                "{} accounts but {} amounts",
                accounts.len(),
                amounts.len()
            )));
        }
        if accounts.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "mint batch must name at least one account".to_string(),
            ));
        }
        self.ensure_sequence(sequence, accounts)?;

        let minted = amounts
            .iter()
            .try_fold(0 as Balance, |acc, amount| acc.checked_add(*amount))
            .ok_or_else(|| LedgerError::InvalidArgument("mint amount overflow".to_string()))?;
        let new_supply = self
            .total_supply
            .checked_add(minted)
            .ok_or_else(|| LedgerError::InvalidArgument("total supply overflow".to_string()))?;

        // Nothing below can fail: every balance is bounded by the new supply
        // and every sequence has been checked.
        for (account, amount) in accounts.iter().zip(amounts) {
            let balance = self.balance_of(account) + amount;
            self.set_balance(*account, balance, sequence)?;
            debug!("Minted {} to {} at sequence {}", amount, account, sequence);
            self.events.push(Event::Mint {
                to: *account,
                amount: *amount,
                sequence,
            });
        }
        self.total_supply = new_supply;
        self.supply_history.record(sequence, new_supply)?;
        self.last_sequence = sequence;

        Ok(())
    }

    /// Close minting for good and enable transfers
    pub fn finish_minting(&mut self, caller: &Address, sequence: Sequence) -> Result<()> {
        self.ensure_owner(caller)?;
        if self.phase == LedgerPhase::Transferable {
            return Err(LedgerError::AlreadyFinished);
        }
        self.ensure_sequence(sequence, &[])?;

        self.phase = LedgerPhase::Transferable;
        self.last_sequence = sequence;
        info!(
            "Minting finished at sequence {} with total supply {}",
            sequence, self.total_supply
        );
        self.events.push(Event::MintingFinished { sequence });

        Ok(())
    }

    /// Move `amount` from `caller` to `to`.
    ///
    /// A transfer to oneself succeeds without changing the balance but still
    /// records a checkpoint at `sequence`.
    pub fn transfer(
        &mut self,
        caller: &Address,
        to: Address,
        amount: Balance,
        sequence: Sequence,
    ) -> Result<()> {
        self.ensure_transferable()?;
        self.ensure_sequence(sequence, &[*caller, to])?;
        self.ensure_balance(caller, amount)?;

        self.move_balance(*caller, to, amount, sequence)
    }

    /// Move `amount` from `from` to `to` using an allowance granted to
    /// `caller`
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: Address,
        to: Address,
        amount: Balance,
        sequence: Sequence,
    ) -> Result<()> {
        self.ensure_transferable()?;
        self.ensure_sequence(sequence, &[from, to])?;

        let allowed = self.allowance(&from, caller);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                required: amount,
                available: allowed,
            });
        }
        self.ensure_balance(&from, amount)?;

        self.move_balance(from, to, amount, sequence)?;
        self.allowances
            .entry(from)
            .or_default()
            .insert(*caller, allowed - amount);

        Ok(())
    }

    /// Let `spender` move up to `amount` of the caller's tokens. Replaces any
    /// previous allowance.
    pub fn approve(&mut self, caller: &Address, spender: Address, amount: Balance) -> Result<()> {
        self.allowances
            .entry(*caller)
            .or_default()
            .insert(spender, amount);
        debug!("{} approved {} to spend {}", caller, spender, amount);
        self.events.push(Event::Approval {
            owner: *caller,
            spender,
            amount,
        });

        Ok(())
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.whitelist.is_whitelisted(account)
    }

    pub fn whitelist_manager(&self) -> Address {
        self.whitelist.manager()
    }

    pub fn add_whitelist(&mut self, caller: &Address, account: Address) -> Result<()> {
        let event = self.whitelist.add(caller, account)?;
        self.events.extend(event);
        Ok(())
    }

    pub fn remove_whitelist(&mut self, caller: &Address, account: Address) -> Result<()> {
        let event = self.whitelist.remove(caller, account)?;
        self.events.extend(event);
        Ok(())
    }

    pub fn modify_whitelist_multiple(
        &mut self,
        caller: &Address,
        accounts: &[Address],
        status: bool,
    ) -> Result<()> {
        let events = self.whitelist.modify_multiple(caller, accounts, status)?;
        self.events.extend(events);
        Ok(())
    }

    pub fn change_whitelist_manager(&mut self, caller: &Address, new_manager: Address) -> Result<()> {
        let event = self.whitelist.change_manager(caller, &self.owner, new_manager)?;
        self.events.push(event);
        Ok(())
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    fn ensure_owner(&self, caller: &Address) -> Result<()> {
        if *caller != self.owner {
            warn!("Rejected owner-only call from {}", caller);
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    fn ensure_transferable(&self) -> Result<()> {
        if self.phase != LedgerPhase::Transferable {
            return Err(LedgerError::TransfersDisabled);
        }
        Ok(())
    }

    fn ensure_balance(&self, account: &Address, amount: Balance) -> Result<()> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        Ok(())
    }

    fn ensure_sequence(&self, sequence: Sequence, accounts: &[Address]) -> Result<()> {
        if sequence < self.last_sequence {
            return Err(LedgerError::SequenceOrderViolation {
                last: self.last_sequence,
                attempted: sequence,
            });
        }
        accounts
            .iter()
            .try_for_each(|account| self.checkpoints.check_sequence(account, sequence))
    }

    fn move_balance(
        &mut self,
        from: Address,
        to: Address,
        amount: Balance,
        sequence: Sequence,
    ) -> Result<()> {
        if from == to {
            let balance = self.balance_of(&from);
            self.set_balance(from, balance, sequence)?;
        } else {
            let from_balance = self.balance_of(&from) - amount;
            let to_balance = self.balance_of(&to) + amount;
            self.set_balance(from, from_balance, sequence)?;
            self.set_balance(to, to_balance, sequence)?;
        }
        self.last_sequence = sequence;

        debug!(
            "Transferred {} from {} to {} at sequence {}",
            amount, from, to, sequence
        );
        self.events.push(Event::Transfer {
            from,
            to,
            amount,
            sequence,
        });
        Ok(())
    }

    fn set_balance(&mut self, account: Address, balance: Balance, sequence: Sequence) -> Result<()> {
        self.checkpoints.record(account, sequence, balance)?;
        self.balances.insert(account, balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Address = Address::from_low_u8(0xaa);
    const ALICE: Address = Address::from_low_u8(1);
    const BOB: Address = Address::from_low_u8(2);

    fn minted_ledger() -> Ledger {
        let mut ledger = Ledger::new(OWNER, TokenConfig::default());
        ledger.mint(&OWNER, &[OWNER], &[100], 1).unwrap();
        ledger
    }

    fn supply_matches(ledger: &Ledger) -> bool {
        ledger.holders().map(|(_, b)| *b).sum::<Balance>() == ledger.total_supply()
    }

    #[test]
    fn test_mint_updates_balance_and_supply() {
        let mut ledger = Ledger::new(OWNER, TokenConfig::default());
        ledger.mint(&OWNER, &[ALICE, BOB], &[30, 70], 1).unwrap();

        assert_eq!(ledger.balance_of(&ALICE), 30);
        assert_eq!(ledger.balance_of(&BOB), 70);
        assert_eq!(ledger.total_supply(), 100);
        assert_eq!(ledger.balance_of_at(&ALICE, 1), 30);
        assert!(supply_matches(&ledger));
        assert_eq!(ledger.events().len(), 2);
    }

    #[test]
    fn test_mint_same_account_twice_in_batch() {
        let mut ledger = Ledger::new(OWNER, TokenConfig::default());
        ledger.mint(&OWNER, &[ALICE, ALICE], &[5, 6], 3).unwrap();

        assert_eq!(ledger.balance_of(&ALICE), 11);
        assert_eq!(ledger.checkpoints().checkpoints(&ALICE).len(), 1);
        assert_eq!(ledger.balance_of_at(&ALICE, 3), 11);
    }

    #[test]
    fn test_mint_length_mismatch() {
        let mut ledger = Ledger::new(OWNER, TokenConfig::default());
        let err = ledger.mint(&OWNER, &[ALICE, BOB], &[1], 1).unwrap_err();

        assert!(matches!(err, LedgerError::InvalidArgument(_)));
        assert_eq!(ledger.total_supply(), 0);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_empty_mint_batch_rejected() {
        let mut ledger = Ledger::new(OWNER, TokenConfig::default());
        let err = ledger.mint(&OWNER, &[], &[], 1).unwrap_err();

        assert_eq!(
            err,
            LedgerError::InvalidArgument("mint batch must name at least one account".to_string())
        );
        assert!(ledger.events().is_empty());
        assert_eq!(ledger.last_sequence(), 0);
    }

    #[test]
    fn test_mint_overflow_is_atomic() {
        let mut ledger = minted_ledger();
        let err = ledger
            .mint(&OWNER, &[ALICE, BOB], &[1, Balance::MAX], 2)
            .unwrap_err();

        assert!(matches!(err, LedgerError::InvalidArgument(_)));
        assert_eq!(ledger.balance_of(&ALICE), 0);
        assert_eq!(ledger.total_supply(), 100);
    }

    #[test]
    fn test_only_owner_mints() {
        let mut ledger = Ledger::new(OWNER, TokenConfig::default());
        assert_eq!(
            ledger.mint(&ALICE, &[ALICE], &[1], 1),
            Err(LedgerError::Unauthorized { caller: ALICE })
        );
    }

    #[test]
    fn test_finish_minting_twice() {
        let mut ledger = minted_ledger();
        ledger.finish_minting(&OWNER, 2).unwrap();
        assert_eq!(
            ledger.finish_minting(&OWNER, 3),
            Err(LedgerError::AlreadyFinished)
        );
    }

    #[test]
    fn test_self_transfer_records_checkpoint() {
        let mut ledger = minted_ledger();
        ledger.finish_minting(&OWNER, 1).unwrap();
        ledger.transfer(&OWNER, OWNER, 40, 5).unwrap();

        assert_eq!(ledger.balance_of(&OWNER), 100);
        let history = ledger.checkpoints().checkpoints(&OWNER);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].sequence, 5);
        assert!(supply_matches(&ledger));
    }

    #[test]
    fn test_transfer_into_past_rejected() {
        let mut ledger = minted_ledger();
        ledger.finish_minting(&OWNER, 4).unwrap();

        let err = ledger.transfer(&OWNER, ALICE, 1, 3).unwrap_err();
        assert_eq!(
            err,
            LedgerError::SequenceOrderViolation { last: 4, attempted: 3 }
        );
        assert_eq!(ledger.balance_of(&ALICE), 0);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut ledger = minted_ledger();
        ledger.finish_minting(&OWNER, 1).unwrap();
        ledger.approve(&OWNER, ALICE, 50).unwrap();

        ledger.transfer_from(&ALICE, OWNER, BOB, 20, 2).unwrap();
        assert_eq!(ledger.allowance(&OWNER, &ALICE), 30);
        assert_eq!(ledger.balance_of(&BOB), 20);

        let err = ledger.transfer_from(&ALICE, OWNER, BOB, 31, 3).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientAllowance {
                required: 31,
                available: 30
            }
        );
    }

    #[test]
    fn test_total_supply_history() {
        let mut ledger = minted_ledger();
        ledger.mint(&OWNER, &[ALICE], &[50], 4).unwrap();

        assert_eq!(ledger.total_supply_at(0), 0);
        assert_eq!(ledger.total_supply_at(1), 100);
        assert_eq!(ledger.total_supply_at(3), 100);
        assert_eq!(ledger.total_supply_at(4), 150);
    }
}
