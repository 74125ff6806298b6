use std::fmt;

/// Quarter in ascending academic-calendar order, so the derived `Ord`
/// makes Fall the latest offering within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Quarter {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Quarter {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "winter" => Some(Self::Winter),
            "spring" => Some(Self::Spring),
            "summer" => Some(Self::Summer),
            "fall" | "autumn" => Some(Self::Fall),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        }
    }
}

/// An academic offering period such as "Fall 2025". Ordering is year
/// first, then quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Term {
    pub(crate) year: i32,
    pub(crate) quarter: Quarter,
}

impl Term {
    /// Accepts the label form ("Fall 2025") and the key form
    /// ("2025-Fall"), in either word order.
    pub(crate) fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(|c| c == ' ' || c == '-').filter(|part| !part.is_empty());
        let first = parts.next()?;
        let second = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        if let Ok(year) = first.parse::<i32>() {
            return Some(Self { year, quarter: Quarter::parse(second)? });
        }

        let year = second.parse::<i32>().ok()?;
        Some(Self { year, quarter: Quarter::parse(first)? })
    }

    /// Unique map key, e.g. `2025-Fall`. Distinct terms never collide.
    pub(crate) fn key(self) -> String {
        format!("{}-{}", self.year, self.quarter.as_str())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quarter.as_str(), self.year)
    }
}
