//! Line-oriented command grammar.
//!
//! ```text
//! Create Account <Savings|Checking|Business> <name> <amount>
//! Deposit <name> <amount>
//! Withdraw <name> <amount>
//! Transfer <from> <to> <amount>
//! View <name>
//! Activate <name>
//! Deactivate <name>
//! ```

use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::money::{AmountError, Money};
use crate::state::AccountType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Create {
        account_type: AccountType,
        name: String,
        initial_balance: Money,
    },
    Deposit {
        name: String,
        amount: Money,
    },
    Withdraw {
        name: String,
        amount: Money,
    },
    Transfer {
        from: String,
        to: String,
        amount: Money,
    },
    View {
        name: String,
    },
    Activate {
        name: String,
    },
    Deactivate {
        name: String,
    },
}

fn parse_amount(token: &str) -> Result<Money> {
    Money::parse_decimal(token).map_err(|e| match e {
        AmountError::Malformed(_) => Error::InvalidCommand(format!("Invalid amount {}", token)),
        AmountError::OutOfRange(_) => Error::AmountOutOfRange(token.to_string()),
    })
}

fn expect_args(verb: &str, args: &[&str], usage: &str) -> Result<()> {
    let expected = usage.split_whitespace().count();
    if args.len() != expected {
        return Err(Error::InvalidCommand(format!(
            "{} expects {} {}",
            verb,
            if expected == 1 { "argument" } else { "arguments" },
            usage
        )));
    }
    Ok(())
}

impl Command {
    /// Parse one line. Tokens are separated by runs of whitespace.
    pub fn parse(line: &str) -> Result<Command> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((verb, args)) = tokens.split_first() else {
            return Err(Error::InvalidCommand("Empty command".to_string()));
        };

        match *verb {
            "Create" => {
                expect_args(verb, args, "Account <type> <name> <amount>")?;
                if args[0] != "Account" {
                    return Err(Error::InvalidCommand(format!(
                        "Create expects Account, got {}",
                        args[0]
                    )));
                }
                Ok(Command::Create {
                    account_type: args[1].parse()?,
                    name: args[2].to_string(),
                    initial_balance: parse_amount(args[3])?,
                })
            }
            "Deposit" => {
                expect_args(verb, args, "<name> <amount>")?;
                Ok(Command::Deposit {
                    name: args[0].to_string(),
                    amount: parse_amount(args[1])?,
                })
            }
            "Withdraw" => {
                expect_args(verb, args, "<name> <amount>")?;
                Ok(Command::Withdraw {
                    name: args[0].to_string(),
                    amount: parse_amount(args[1])?,
                })
            }
            "Transfer" => {
                expect_args(verb, args, "<from> <to> <amount>")?;
                Ok(Command::Transfer {
                    from: args[0].to_string(),
                    to: args[1].to_string(),
                    amount: parse_amount(args[2])?,
                })
            }
            "View" => {
                expect_args(verb, args, "<name>")?;
                Ok(Command::View {
                    name: args[0].to_string(),
                })
            }
            "Activate" => {
                expect_args(verb, args, "<name>")?;
                Ok(Command::Activate {
                    name: args[0].to_string(),
                })
            }
            "Deactivate" => {
                expect_args(verb, args, "<name>")?;
                Ok(Command::Deactivate {
                    name: args[0].to_string(),
                })
            }
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Command::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let command = Command::parse("Create Account Savings Alice 100.5").unwrap();
        assert_eq!(
            command,
            Command::Create {
                account_type: AccountType::Savings,
                name: "Alice".to_string(),
                initial_balance: Money::from_decimal_str("100.5").unwrap(),
            }
        );
    }

    #[test]
    fn test_parse_transfer() {
        let command: Command = "Transfer Alice Bob 50".parse().unwrap();
        assert_eq!(
            command,
            Command::Transfer {
                from: "Alice".to_string(),
                to: "Bob".to_string(),
                amount: Money::from_units(50),
            }
        );
    }

    #[test]
    fn test_parse_single_name_commands() {
        assert_eq!(
            Command::parse("View Bob").unwrap(),
            Command::View { name: "Bob".to_string() }
        );
        assert_eq!(
            Command::parse("  Deactivate   Bob ").unwrap(),
            Command::Deactivate { name: "Bob".to_string() }
        );
        assert_eq!(
            Command::parse("Activate Bob").unwrap(),
            Command::Activate { name: "Bob".to_string() }
        );
    }

    #[test]
    fn test_negative_amount_is_parsed() {
        let command = Command::parse("Deposit Alice -20").unwrap();
        assert_eq!(
            command,
            Command::Deposit {
                name: "Alice".to_string(),
                amount: Money::from_units(-20),
            }
        );
    }

    #[test]
    fn test_unknown_verb() {
        let err = Command::parse("Steal Alice 100").unwrap_err();
        assert!(matches!(err, Error::UnknownCommand(verb) if verb == "Steal"));
    }

    #[test]
    fn test_invalid_commands() {
        for line in [
            "",
            "Deposit Alice",
            "Withdraw Alice ten",
            "Transfer Alice Bob",
            "Create Account Gold Alice 10",
            "Create Bank Savings Alice 10",
            "View",
            "View Alice Bob",
        ] {
            let err = Command::parse(line).unwrap_err();
            assert!(matches!(err, Error::InvalidCommand(_)), "{line}: {err}");
        }
    }

    #[test]
    fn test_out_of_range_amount() {
        let err = Command::parse("Withdraw A 99999999999999999").unwrap_err();
        assert!(matches!(&err, Error::AmountOutOfRange(token) if token == "99999999999999999"));
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Amount 99999999999999999 is out of range");

        let err = Command::parse("Transfer A B -1e400").unwrap_err();
        assert!(matches!(err, Error::InvalidCommand(_)));
    }

    #[test]
    fn test_excess_fraction_digits_round() {
        let line = format!("Deposit A 0.{}1", "0".repeat(39));
        assert_eq!(
            Command::parse(&line).unwrap(),
            Command::Deposit {
                name: "A".to_string(),
                amount: Money::ZERO,
            }
        );
        assert_eq!(
            Command::parse("Deposit A 1.0000004999999999999999999999999999999999999").unwrap(),
            Command::Deposit {
                name: "A".to_string(),
                amount: Money::from_units(1),
            }
        );
    }

    #[test]
    fn test_arity_message() {
        let err = Command::parse("Withdraw Alice").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid command: Withdraw expects 2 arguments <name> <amount>"
        );
    }
}
