//! Command facade: checks preconditions, then delegates to the ledger.
//!
//! Checks run top to bottom and the first failure is returned before the
//! ledger is touched, so a rejected command never changes state.

use serde::Serialize;
use tracing::{debug, info};

use crate::command::Command;
use crate::error::{Error, Result};
use crate::money::{FeeRate, Money};
use crate::state::{AccountType, AccountView, Ledger};

/// Fee figures shown to the user for withdrawals and transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    pub fee: Money,
    pub rate: FeeRate,
    /// Requested amount minus the fee
    pub net: Money,
}

impl FeeBreakdown {
    /// Fee and net amount for `amount` at `rate`
    pub fn compute(amount: Money, rate: FeeRate, account: &str) -> Result<Self> {
        let overflow = || Error::AmountOverflow(account.to_string());
        let fee = amount.fee_at(rate).ok_or_else(overflow)?;
        let net = amount.checked_sub(fee).ok_or_else(overflow)?;
        Ok(FeeBreakdown { fee, rate, net })
    }
}

/// What a successful command did, with the values needed to report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Created {
        account_type: AccountType,
        name: String,
        initial_balance: Money,
    },
    Deposited {
        name: String,
        amount: Money,
        balance: Money,
    },
    Withdrew {
        name: String,
        balance: Money,
        #[serde(flatten)]
        fee: FeeBreakdown,
    },
    Transferred {
        from: String,
        to: String,
        balance: Money,
        #[serde(flatten)]
        fee: FeeBreakdown,
    },
    Viewed(AccountView),
    Activated {
        name: String,
    },
    Deactivated {
        name: String,
    },
}

impl core::fmt::Display for Outcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Outcome::Created {
                account_type,
                name,
                initial_balance,
            } => write!(
                f,
                "A new {} account created for {} with an initial balance of {}.",
                account_type, name, initial_balance
            ),
            Outcome::Deposited {
                name,
                amount,
                balance,
            } => write!(
                f,
                "{} successfully deposited {}. New Balance: {}.",
                name, amount, balance
            ),
            Outcome::Withdrew { name, balance, fee } => write!(
                f,
                "{} successfully withdrew {}. New Balance: {}. Transaction Fee: {} ({}%) in the system.",
                name, fee.net, balance, fee.fee, fee.rate
            ),
            Outcome::Transferred {
                from,
                to,
                balance,
                fee,
            } => write!(
                f,
                "{} successfully transferred {} to {}. New Balance: {}. Transaction Fee: {} ({}%) in the system.",
                from, fee.net, to, balance, fee.fee, fee.rate
            ),
            Outcome::Viewed(view) => write!(f, "{}", view),
            Outcome::Activated { name } => write!(f, "{}'s account is now activated.", name),
            Outcome::Deactivated { name } => write!(f, "{}'s account is now deactivated.", name),
        }
    }
}

pub fn ensure_exists(ledger: &Ledger, name: &str) -> Result<()> {
    if !ledger.account_exists(name) {
        return Err(Error::AccountNotFound(name.to_string()));
    }
    Ok(())
}

pub fn validate_create(ledger: &Ledger, name: &str) -> Result<()> {
    if ledger.account_exists(name) {
        return Err(Error::AccountAlreadyExists(name.to_string()));
    }
    Ok(())
}

/// Withdraw: exists -> active -> sufficient funds
pub fn validate_withdraw(ledger: &Ledger, name: &str, amount: Money) -> Result<()> {
    ensure_exists(ledger, name)?;

    if !ledger.is_active(name)? {
        return Err(Error::AccountInactive(name.to_string()));
    }

    if !ledger.has_sufficient_funds(name, amount)? {
        return Err(Error::InsufficientFunds(name.to_string()));
    }

    Ok(())
}

/// Transfer: source exists -> destination exists -> source active -> source funds.
///
/// The destination may be inactive; inactive accounts still receive funds.
pub fn validate_transfer(ledger: &Ledger, from: &str, to: &str, amount: Money) -> Result<()> {
    ensure_exists(ledger, from)?;
    ensure_exists(ledger, to)?;

    if !ledger.is_active(from)? {
        return Err(Error::AccountInactive(from.to_string()));
    }

    if !ledger.has_sufficient_funds(from, amount)? {
        return Err(Error::InsufficientFunds(from.to_string()));
    }

    Ok(())
}

/// Boundary the command loop talks to. Owns the ledger for the whole run.
#[derive(Debug, Default)]
pub struct CommandFacade {
    ledger: Ledger,
}

impl CommandFacade {
    /// Create a facade over an empty ledger
    pub fn new() -> Self {
        CommandFacade {
            ledger: Ledger::new(),
        }
    }

    /// Create a facade over an existing ledger
    pub fn with_ledger(ledger: Ledger) -> Self {
        CommandFacade { ledger }
    }

    /// Get the ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Consume the facade, returning the ledger
    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Run one parsed command
    pub fn execute(&mut self, command: &Command) -> Result<Outcome> {
        debug!(?command, "executing command");
        match command {
            Command::Create {
                account_type,
                name,
                initial_balance,
            } => self.create_account(*account_type, name, *initial_balance),
            Command::Deposit { name, amount } => self.deposit(name, *amount),
            Command::Withdraw { name, amount } => self.withdraw(name, *amount),
            Command::Transfer { from, to, amount } => self.transfer(from, to, *amount),
            Command::View { name } => self.view(name),
            Command::Activate { name } => self.activate(name),
            Command::Deactivate { name } => self.deactivate(name),
        }
    }

    /// Create account; name must be unused
    pub fn create_account(
        &mut self,
        account_type: AccountType,
        name: &str,
        initial_balance: Money,
    ) -> Result<Outcome> {
        validate_create(&self.ledger, name)?;

        self.ledger.create_account(account_type, name, initial_balance);
        info!(account = name, %account_type, balance = %initial_balance, "account created");

        Ok(Outcome::Created {
            account_type,
            name: name.to_string(),
            initial_balance,
        })
    }

    /// Deposit into an existing account, active or not
    pub fn deposit(&mut self, name: &str, amount: Money) -> Result<Outcome> {
        ensure_exists(&self.ledger, name)?;

        let balance = self.ledger.deposit(name, amount)?;
        Ok(Outcome::Deposited {
            name: name.to_string(),
            amount,
            balance,
        })
    }

    /// Withdraw from an active account with enough funds
    pub fn withdraw(&mut self, name: &str, amount: Money) -> Result<Outcome> {
        validate_withdraw(&self.ledger, name, amount)?;
        let fee = FeeBreakdown::compute(amount, self.ledger.fee_of(name)?, name)?;

        let balance = self.ledger.withdraw(name, amount)?;
        Ok(Outcome::Withdrew {
            name: name.to_string(),
            balance,
            fee,
        })
    }

    /// Transfer between existing accounts; sender must be active and funded
    pub fn transfer(&mut self, from: &str, to: &str, amount: Money) -> Result<Outcome> {
        validate_transfer(&self.ledger, from, to, amount)?;
        let fee = FeeBreakdown::compute(amount, self.ledger.fee_of(from)?, from)?;

        let balance = self.ledger.transfer(from, to, amount)?;
        Ok(Outcome::Transferred {
            from: from.to_string(),
            to: to.to_string(),
            balance,
            fee,
        })
    }

    /// View account details
    pub fn view(&self, name: &str) -> Result<Outcome> {
        ensure_exists(&self.ledger, name)?;
        Ok(Outcome::Viewed(self.ledger.view(name)?))
    }

    /// Activate an inactive account
    pub fn activate(&mut self, name: &str) -> Result<Outcome> {
        ensure_exists(&self.ledger, name)?;
        self.ledger.activate(name)?;
        Ok(Outcome::Activated {
            name: name.to_string(),
        })
    }

    /// Deactivate an active account
    pub fn deactivate(&mut self, name: &str) -> Result<Outcome> {
        ensure_exists(&self.ledger, name)?;
        self.ledger.deactivate(name)?;
        Ok(Outcome::Deactivated {
            name: name.to_string(),
        })
    }
}
