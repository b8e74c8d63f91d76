pub mod account;
pub mod account_state;
pub mod apply;

pub use account::{Account, AccountType, HistoryRecord, RecordKind};
pub use account_state::{AccountState, Toggle};

use serde::Serialize;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::money::{FeeRate, Money};

/// Snapshot of one account for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub name: String,
    pub account_type: AccountType,
    pub balance: Money,
    pub state: AccountState,
    pub history: Vec<HistoryRecord>,
}

impl core::fmt::Display for AccountView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}'s Account: Type: {}, Balance: {}, State: {}, Transactions: [",
            self.name, self.account_type, self.balance, self.state
        )?;
        for (i, record) in self.history.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", record)?;
        }
        f.write_str("].")
    }
}

/// Account registry keyed by name.
///
/// Entries are only ever added. Every operation here trusts its caller:
/// existence, activity and funds are checked by the facade before any
/// mutation, so the ledger will happily overdraw an account if asked to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    accounts: HashMap<String, Account>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Ledger {
            accounts: HashMap::new(),
        }
    }

    /// Insert a new account; an existing entry under the same name is replaced.
    pub fn create_account(&mut self, account_type: AccountType, name: &str, initial_balance: Money) {
        let account = Account::new(name.to_string(), account_type, initial_balance);
        self.accounts.insert(name.to_string(), account);
    }

    /// Get account by name
    pub fn get_account(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }

    pub(crate) fn account(&self, name: &str) -> Result<&Account> {
        self.accounts
            .get(name)
            .ok_or_else(|| Error::AccountNotFound(name.to_string()))
    }

    pub(crate) fn account_mut(&mut self, name: &str) -> Result<&mut Account> {
        self.accounts
            .get_mut(name)
            .ok_or_else(|| Error::AccountNotFound(name.to_string()))
    }

    /// Check if an account exists
    pub fn account_exists(&self, name: &str) -> bool {
        self.accounts.contains_key(name)
    }

    /// Check if account is active
    pub fn is_active(&self, name: &str) -> Result<bool> {
        Ok(self.account(name)?.is_active())
    }

    /// True iff `balance - amount >= 0`
    pub fn has_sufficient_funds(&self, name: &str, amount: Money) -> Result<bool> {
        let balance = self.account(name)?.balance();
        Ok(balance
            .checked_sub(amount)
            .map(|rest| !rest.is_negative())
            .unwrap_or(amount.is_negative()))
    }

    /// Get fee rate of account
    pub fn fee_of(&self, name: &str) -> Result<FeeRate> {
        Ok(self.account(name)?.fee_rate())
    }

    /// Get balance of account
    pub fn balance_of(&self, name: &str) -> Result<Money> {
        Ok(self.account(name)?.balance())
    }

    /// Get display snapshot of account
    pub fn view(&self, name: &str) -> Result<AccountView> {
        let account = self.account(name)?;
        Ok(AccountView {
            name: account.name().to_string(),
            account_type: account.account_type(),
            balance: account.balance(),
            state: account.state(),
            history: account.history().to_vec(),
        })
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Check if ledger has no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterate over all accounts, in no particular order
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Account names in lexical order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.accounts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
