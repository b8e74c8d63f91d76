use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Account {0} does not exist")]
    AccountNotFound(String),

    #[error("Account {0} already exists")]
    AccountAlreadyExists(String),

    #[error("Account {0} is already activated")]
    AccountAlreadyActive(String),

    #[error("Account {0} is already deactivated")]
    AccountAlreadyInactive(String),

    #[error("Account {0} is inactive")]
    AccountInactive(String),

    #[error("Insufficient funds for {0}")]
    InsufficientFunds(String),

    #[error("Amount overflow on account {0}")]
    AmountOverflow(String),

    #[error("Amount {0} is out of range")]
    AmountOutOfRange(String),

    #[error("No such command {0}")]
    UnknownCommand(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Output error: {0}")]
    Output(String),
}

impl Error {
    /// Domain errors are reported and the stream continues; the rest abort a run.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Io(_) | Error::Output(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
