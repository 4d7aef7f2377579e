use std::fmt::Display;

/// Exit status the burner reserves for "selection exceeds media capacity".
pub const CAPACITY_EXCEEDED_CODE: i32 = 649;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurnStatus {
    Pending,
    CapacityExceeded,
    Fatal(i32),
    Success,
}

impl BurnStatus {
    /// Maps a burner exit code. `None` means the process was killed.
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => BurnStatus::Success,
            Some(CAPACITY_EXCEEDED_CODE) => BurnStatus::CapacityExceeded,
            Some(code) => BurnStatus::Fatal(code),
            None => BurnStatus::Fatal(-1),
        }
    }

    /// Code the process exits with once burning is over.
    ///
    /// Unix keeps only the low byte of an exit status, so a parent sees
    /// [`CAPACITY_EXCEEDED_CODE`] as `649 & 0xff` (137). The full code is
    /// logged before exiting.
    pub fn exit_code(&self) -> i32 {
        match self {
            BurnStatus::Success => 0,
            BurnStatus::CapacityExceeded => CAPACITY_EXCEEDED_CODE,
            BurnStatus::Fatal(code) => *code,
            BurnStatus::Pending => 1,
        }
    }
}

impl Display for BurnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BurnStatus::Pending => write!(f, "pending"),
            BurnStatus::CapacityExceeded => write!(f, "selection exceeds media capacity"),
            BurnStatus::Fatal(code) => write!(f, "burner failed with status {code}"),
            BurnStatus::Success => write!(f, "success"),
        }
    }
}
