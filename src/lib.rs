pub mod command;
pub mod config;
pub mod error;
pub mod facade;
pub mod logger;
pub mod money;
pub mod session;
pub mod state;

pub use command::Command;
pub use error::{Error, Result};
pub use facade::{CommandFacade, FeeBreakdown, Outcome};
pub use money::{AmountError, FeeRate, Money};
pub use session::{RunSummary, Session};
pub use state::{Account, AccountState, AccountType, AccountView, Ledger};
