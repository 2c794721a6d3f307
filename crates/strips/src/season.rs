use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};

use common::ContractMonth;

/// Gas-year season. Winter runs November through March, summer April
/// through October.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Winter,
    Summer,
}

impl Season {
    pub fn of_month(month: u32) -> Season {
        if (4..=10).contains(&month) {
            Season::Summer
        } else {
            Season::Winter
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Season::Winter => write!(f, "Winter"),
            Season::Summer => write!(f, "Summer"),
        }
    }
}

/// A seasonal bucket of monthly contracts.
///
/// `year` is the calendar year the strip starts in: `Winter 2025` covers
/// Nov 2025 - Mar 2026, `Summer 2026` covers Apr - Oct 2026.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strip {
    pub season: Season,
    pub year: i32,
}

impl Strip {
    pub fn winter(year: i32) -> Self {
        Self { season: Season::Winter, year }
    }

    pub fn summer(year: i32) -> Self {
        Self { season: Season::Summer, year }
    }

    /// The strip in progress on `date` (the balance-of strip). It may be
    /// partly or wholly elapsed.
    pub fn current(date: NaiveDate) -> Self {
        Strip::of_contract(ContractMonth {
            year: date.year(),
            month: date.month(),
        })
    }

    /// The strip that starts when this one ends.
    pub fn following(&self) -> Self {
        match self.season {
            Season::Winter => Strip::summer(self.year + 1),
            Season::Summer => Strip::winter(self.year),
        }
    }

    /// Display name, e.g. `Winter 2025/2026` or `Summer 2026`.
    pub fn name(&self) -> String {
        match self.season {
            Season::Winter => format!("Winter {}/{}", self.year, self.year + 1),
            Season::Summer => format!("Summer {}", self.year),
        }
    }

    /// The strip a contract month belongs to. Jan-Mar deliveries belong to
    /// the winter that started the previous November.
    pub fn of_contract(contract: ContractMonth) -> Self {
        match Season::of_month(contract.month) {
            Season::Summer => Strip::summer(contract.year),
            Season::Winter if contract.month <= 3 => Strip::winter(contract.year - 1),
            Season::Winter => Strip::winter(contract.year),
        }
    }

    pub fn contains(&self, contract: ContractMonth) -> bool {
        (self.first_month()..=self.last_month()).contains(&contract)
    }

    pub fn first_month(&self) -> ContractMonth {
        match self.season {
            Season::Winter => ContractMonth { year: self.year, month: 11 },
            Season::Summer => ContractMonth { year: self.year, month: 4 },
        }
    }

    pub fn last_month(&self) -> ContractMonth {
        match self.season {
            Season::Winter => ContractMonth { year: self.year + 1, month: 3 },
            Season::Summer => ContractMonth { year: self.year, month: 10 },
        }
    }
}

impl std::fmt::Display for Strip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

impl Ord for Strip {
    fn cmp(&self, other: &Self) -> Ordering {
        self.first_month().cmp(&other.first_month())
    }
}

impl PartialOrd for Strip {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The balance-of strip for `as_of` followed by the next `count - 1`
/// strips, alternating seasons.
pub fn active_strips(as_of: NaiveDate, count: usize) -> Vec<Strip> {
    std::iter::successors(Some(Strip::current(as_of)), |s| Some(s.following()))
        .take(count)
        .collect()
}
