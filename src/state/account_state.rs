use serde::{Deserialize, Serialize};

/// Activation state of an account.
///
/// Lifecycle: Active <-> Inactive, toggled only by explicit requests.
/// There is no terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountState {
    #[default]
    Active,
    Inactive,
}

/// Result of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Changed,
    /// The account was already in the requested state.
    Unchanged,
}

impl AccountState {
    /// Move to Active
    pub fn activate(&mut self) -> Toggle {
        match self {
            AccountState::Active => Toggle::Unchanged,
            AccountState::Inactive => {
                *self = AccountState::Active;
                Toggle::Changed
            }
        }
    }

    /// Move to Inactive
    pub fn deactivate(&mut self) -> Toggle {
        match self {
            AccountState::Inactive => Toggle::Unchanged,
            AccountState::Active => {
                *self = AccountState::Inactive;
                Toggle::Changed
            }
        }
    }

    /// Check if active
    pub fn is_active(&self) -> bool {
        matches!(self, AccountState::Active)
    }

    /// Get label, "Active" or "Inactive"
    pub fn label(&self) -> &'static str {
        match self {
            AccountState::Active => "Active",
            AccountState::Inactive => "Inactive",
        }
    }
}

impl core::fmt::Display for AccountState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}
