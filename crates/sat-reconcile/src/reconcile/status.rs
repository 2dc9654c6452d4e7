use std::fmt;

/// Status value both exports use for a cancelled invoice.
pub const CANCELLED: &str = "cancelado";

/// Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComparisonStatus {
    /// Listed by the accounting export but not by the authority.
    MissingInAuthority,
    /// Listed only by the authority.
    OnlyInAuthority,
    /// Listed by both exports.
    Match,
}

impl ComparisonStatus {
    pub const ALL: [ComparisonStatus; 3] = [
        ComparisonStatus::MissingInAuthority,
        ComparisonStatus::OnlyInAuthority,
        ComparisonStatus::Match,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ComparisonStatus::MissingInAuthority => "NO ENCONTRADO EN SAT",
            ComparisonStatus::OnlyInAuthority => "SOLO EN SAT",
            ComparisonStatus::Match => "COINCIDEN",
        }
    }

    /// Sort position: discrepancies first, matches last.
    pub fn rank(self) -> u8 {
        match self {
            ComparisonStatus::MissingInAuthority => 0,
            ComparisonStatus::OnlyInAuthority => 1,
            ComparisonStatus::Match => 2,
        }
    }
}

impl fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether both exports agree on an invoice being cancelled.
/// Declaration order is report order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CancellationStatus {
    /// Only one side reports the invoice as cancelled (`FALSE`).
    Mismatch,
    /// Both sides report it as cancelled (`TRUE`).
    Agreed,
    /// Nobody reports it as cancelled (empty cell).
    #[default]
    NotCancelled,
}

impl CancellationStatus {
    pub const ALL: [CancellationStatus; 3] = [
        CancellationStatus::Mismatch,
        CancellationStatus::Agreed,
        CancellationStatus::NotCancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CancellationStatus::Mismatch => "FALSE",
            CancellationStatus::Agreed => "TRUE",
            CancellationStatus::NotCancelled => "",
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            CancellationStatus::Mismatch => 0,
            CancellationStatus::Agreed => 1,
            CancellationStatus::NotCancelled => 2,
        }
    }
}

impl fmt::Display for CancellationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn is_cancelled(status: Option<&str>) -> bool {
    status == Some(CANCELLED)
}

/// Compare the cancellation state reported by both exports.
///
/// A missing status (no column, or the invoice is not listed) counts as not
/// cancelled.
pub fn derive_cancellation(payment: Option<&str>, sat: Option<&str>) -> CancellationStatus {
    match (is_cancelled(payment), is_cancelled(sat)) {
        (true, true) => CancellationStatus::Agreed,
        (true, false) | (false, true) => CancellationStatus::Mismatch,
        (false, false) => CancellationStatus::NotCancelled,
    }
}
