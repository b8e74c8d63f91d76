use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::money::{FeeRate, Money};
use crate::state::account_state::{AccountState, Toggle};

/// Kind of account; fixes the fee rate for the lifetime of the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Savings,
    Checking,
    Business,
}

impl AccountType {
    /// Get fee rate for this account type
    pub fn fee_rate(&self) -> FeeRate {
        match self {
            AccountType::Savings => FeeRate::from_tenths(15),
            AccountType::Checking => FeeRate::from_tenths(20),
            AccountType::Business => FeeRate::from_tenths(25),
        }
    }

    /// Get type name as written in commands
    pub fn name(&self) -> &'static str {
        match self {
            AccountType::Savings => "Savings",
            AccountType::Checking => "Checking",
            AccountType::Business => "Business",
        }
    }
}

impl core::fmt::Display for AccountType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Savings" => Ok(AccountType::Savings),
            "Checking" => Ok(AccountType::Checking),
            "Business" => Ok(AccountType::Business),
            other => Err(Error::InvalidCommand(format!(
                "Unknown account type {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    InitialDeposit,
    Deposit,
    Withdrawal,
    Transfer,
}

impl RecordKind {
    /// Get label used in history listings
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::InitialDeposit => "Initial Deposit",
            RecordKind::Deposit => "Deposit",
            RecordKind::Withdrawal => "Withdrawal",
            RecordKind::Transfer => "Transfer",
        }
    }
}

/// One entry of an account's transaction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub kind: RecordKind,
    pub amount: Money,
}

impl core::fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.kind.label(), self.amount)
    }
}

/// Account aggregate: a named balance with its history and activation state.
///
/// Invariants:
/// - History is never empty; the first record is the initial deposit
/// - History is append-only
///
/// Balance is not bounds checked here. Funds and activity checks belong to
/// the facade, before the ledger mutates anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    name: String,
    balance: Money,
    account_type: AccountType,
    state: AccountState,
    history: Vec<HistoryRecord>,
}

impl Account {
    /// Create an active account whose history starts with the initial deposit
    pub fn new(name: String, account_type: AccountType, initial_balance: Money) -> Self {
        Account {
            name,
            balance: initial_balance,
            account_type,
            state: AccountState::Active,
            history: vec![HistoryRecord {
                kind: RecordKind::InitialDeposit,
                amount: initial_balance,
            }],
        }
    }

    /// Append a deposit record
    pub fn record_deposit(&mut self, amount: Money) {
        self.push_record(RecordKind::Deposit, amount);
    }

    /// Append a withdrawal record
    pub fn record_withdrawal(&mut self, amount: Money) {
        self.push_record(RecordKind::Withdrawal, amount);
    }

    /// Records the nominal, pre-fee amount.
    pub fn record_transfer(&mut self, amount: Money) {
        self.push_record(RecordKind::Transfer, amount);
    }

    fn push_record(&mut self, kind: RecordKind, amount: Money) {
        self.history.push(HistoryRecord { kind, amount });
    }

    /// Set balance
    pub fn set_balance(&mut self, value: Money) {
        self.balance = value;
    }

    /// Get current balance
    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Get fee rate
    pub fn fee_rate(&self) -> FeeRate {
        self.account_type.fee_rate()
    }

    /// Get account name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get account type
    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    /// Get activation state
    pub fn state(&self) -> AccountState {
        self.state
    }

    /// Check if account is active
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Get transaction history, oldest first
    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    /// Activate; fails if already active
    pub fn activate(&mut self) -> Result<()> {
        match self.state.activate() {
            Toggle::Changed => Ok(()),
            Toggle::Unchanged => Err(Error::AccountAlreadyActive(self.name.clone())),
        }
    }

    /// Deactivate; fails if already inactive
    pub fn deactivate(&mut self) -> Result<()> {
        match self.state.deactivate() {
            Toggle::Changed => Ok(()),
            Toggle::Unchanged => Err(Error::AccountAlreadyInactive(self.name.clone())),
        }
    }
}
