//! Balance-mutating ledger operations.
//!
//! None of these check activity or funds. Each computes the new balances
//! first and only then touches history and balances, so an arithmetic
//! overflow leaves the ledger unchanged.

use tracing::debug;

use crate::error::{Error, Result};
use crate::money::Money;
use crate::state::Ledger;

impl Ledger {
    /// Record a deposit and credit the account. Returns the new balance.
    pub fn deposit(&mut self, name: &str, amount: Money) -> Result<Money> {
        let account = self.account_mut(name)?;
        let new_balance = account
            .balance()
            .checked_add(amount)
            .ok_or_else(|| Error::AmountOverflow(name.to_string()))?;

        account.record_deposit(amount);
        account.set_balance(new_balance);
        debug!(account = name, amount = %amount, balance = %new_balance, "deposit applied");
        Ok(new_balance)
    }

    /// Record a withdrawal and debit the full amount. Returns the new balance.
    pub fn withdraw(&mut self, name: &str, amount: Money) -> Result<Money> {
        let account = self.account_mut(name)?;
        let new_balance = account
            .balance()
            .checked_sub(amount)
            .ok_or_else(|| Error::AmountOverflow(name.to_string()))?;

        account.record_withdrawal(amount);
        account.set_balance(new_balance);
        debug!(account = name, amount = %amount, balance = %new_balance, "withdrawal applied");
        Ok(new_balance)
    }

    /// Move `amount` from `from` to `to`, charging the sender's fee.
    ///
    /// Between distinct accounts the sender loses `amount` and the receiver
    /// gains `amount - fee`; the fee goes to neither. A self-transfer only
    /// costs the fee. Only the sender's history gets a record, holding the
    /// pre-fee amount. Returns the sender's new balance.
    pub fn transfer(&mut self, from: &str, to: &str, amount: Money) -> Result<Money> {
        let sender = self.account(from)?;
        let fee = amount
            .fee_at(sender.fee_rate())
            .ok_or_else(|| Error::AmountOverflow(from.to_string()))?;

        if from == to {
            let new_balance = sender
                .balance()
                .checked_sub(fee)
                .ok_or_else(|| Error::AmountOverflow(from.to_string()))?;

            let account = self.account_mut(from)?;
            account.record_transfer(amount);
            account.set_balance(new_balance);
            debug!(account = from, amount = %amount, fee = %fee, balance = %new_balance, "self-transfer applied");
            return Ok(new_balance);
        }

        let overflow = || Error::AmountOverflow(from.to_string());
        let sender_balance = sender.balance().checked_sub(amount).ok_or_else(overflow)?;
        let credited = amount.checked_sub(fee).ok_or_else(overflow)?;
        let receiver_balance = self
            .account(to)?
            .balance()
            .checked_add(credited)
            .ok_or_else(|| Error::AmountOverflow(to.to_string()))?;

        let sender = self.account_mut(from)?;
        sender.record_transfer(amount);
        sender.set_balance(sender_balance);
        self.account_mut(to)?.set_balance(receiver_balance);

        debug!(
            from,
            to,
            amount = %amount,
            fee = %fee,
            balance = %sender_balance,
            "transfer applied"
        );
        Ok(sender_balance)
    }

    pub fn activate(&mut self, name: &str) -> Result<()> {
        self.account_mut(name)?.activate()?;
        debug!(account = name, "account activated");
        Ok(())
    }

    pub fn deactivate(&mut self, name: &str) -> Result<()> {
        self.account_mut(name)?.deactivate()?;
        debug!(account = name, "account deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AccountState, AccountType};

    fn create_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.create_account(AccountType::Savings, "Alice", Money::from_units(100));
        ledger.create_account(AccountType::Checking, "Bob", Money::from_units(100));
        ledger
    }

    fn history_of(ledger: &Ledger, name: &str) -> Vec<String> {
        ledger
            .view(name)
            .unwrap()
            .history
            .iter()
            .map(|r| r.to_string())
            .collect()
    }

    #[test]
    fn test_apply_deposit() {
        let mut ledger = create_ledger();
        let balance = ledger.deposit("Alice", Money::from_units(50)).unwrap();

        assert_eq!(balance, Money::from_units(150));
        assert_eq!(ledger.balance_of("Alice").unwrap(), Money::from_units(150));
        assert_eq!(
            history_of(&ledger, "Alice"),
            vec!["Initial Deposit $100.000", "Deposit $50.000"]
        );
    }

    #[test]
    fn test_negative_deposit_is_accepted() {
        let mut ledger = create_ledger();
        let balance = ledger.deposit("Alice", Money::from_units(-30)).unwrap();
        assert_eq!(balance, Money::from_units(70));
    }

    #[test]
    fn test_apply_withdraw_does_not_check_funds() {
        let mut ledger = create_ledger();
        let balance = ledger.withdraw("Bob", Money::from_units(140)).unwrap();

        assert_eq!(balance, Money::from_units(-40));
        assert_eq!(history_of(&ledger, "Bob")[1], "Withdrawal $140.000");
    }

    #[test]
    fn test_apply_transfer_between_accounts() {
        let mut ledger = create_ledger();
        let balance = ledger.transfer("Alice", "Bob", Money::from_units(50)).unwrap();

        assert_eq!(balance, Money::from_units(50));
        assert_eq!(ledger.balance_of("Alice").unwrap(), Money::from_units(50));
        assert_eq!(
            ledger.balance_of("Bob").unwrap(),
            Money::from_decimal_str("149.25").unwrap()
        );

        // Sender logs the nominal amount, receiver logs nothing
        assert_eq!(history_of(&ledger, "Alice")[1], "Transfer $50.000");
        assert_eq!(history_of(&ledger, "Bob").len(), 1);
    }

    #[test]
    fn test_apply_self_transfer_costs_only_fee() {
        let mut ledger = create_ledger();
        let balance = ledger.transfer("Bob", "Bob", Money::from_units(50)).unwrap();

        assert_eq!(balance, Money::from_units(99));
        assert_eq!(history_of(&ledger, "Bob"), vec!["Initial Deposit $100.000", "Transfer $50.000"]);
    }

    #[test]
    fn test_transfer_to_missing_account_changes_nothing() {
        let mut ledger = create_ledger();
        let result = ledger.transfer("Alice", "Zed", Money::from_units(10));

        assert!(matches!(result, Err(Error::AccountNotFound(name)) if name == "Zed"));
        assert_eq!(ledger.balance_of("Alice").unwrap(), Money::from_units(100));
        assert_eq!(history_of(&ledger, "Alice").len(), 1);
    }

    #[test]
    fn test_overflow_leaves_account_untouched() {
        let mut ledger = Ledger::new();
        ledger.create_account(AccountType::Business, "Max", Money::from_minor(i64::MAX - 1));

        let result = ledger.deposit("Max", Money::from_minor(10));
        assert!(matches!(result, Err(Error::AmountOverflow(_))));
        assert_eq!(ledger.balance_of("Max").unwrap(), Money::from_minor(i64::MAX - 1));
        assert_eq!(history_of(&ledger, "Max").len(), 1);
    }

    #[test]
    fn test_transfer_into_inactive_account() {
        let mut ledger = create_ledger();
        ledger.deactivate("Bob").unwrap();
        ledger.transfer("Alice", "Bob", Money::from_units(10)).unwrap();

        let bob = ledger.get_account("Bob").unwrap();
        assert_eq!(bob.state(), AccountState::Inactive);
        assert_eq!(bob.balance(), Money::from_decimal_str("109.85").unwrap());
    }

    #[test]
    fn test_activate_deactivate() {
        let mut ledger = create_ledger();
        assert!(matches!(ledger.activate("Alice"), Err(Error::AccountAlreadyActive(_))));
        ledger.deactivate("Alice").unwrap();
        assert!(!ledger.is_active("Alice").unwrap());
        assert!(matches!(ledger.deactivate("Alice"), Err(Error::AccountAlreadyInactive(_))));
        ledger.activate("Alice").unwrap();
        assert!(ledger.is_active("Alice").unwrap());
    }
}
