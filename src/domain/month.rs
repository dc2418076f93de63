//! Calendar month arithmetic shared by salaries, recurrence and aggregation.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A calendar month, serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthParseError(String);

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid month `{}` (expected YYYY-MM)", self.0)
    }
}

impl std::error::Error for MonthParseError {}

impl YearMonth {
    /// Builds a month, returning `None` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && NaiveDate::from_ymd_opt(year, month, 1).is_some() {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Constructors only admit months chrono can represent.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day() + Duration::days(i64::from(self.days_in_month()) - 1)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Zero-based month counter, handy for month distances.
    pub fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    /// Number of months from `self` to `other` (negative when `other` is earlier).
    pub fn months_until(&self, other: YearMonth) -> i64 {
        other.ordinal() - self.ordinal()
    }

    /// Shifts the month by `months`, crossing year boundaries as needed.
    pub fn offset(&self, months: i64) -> Self {
        let ordinal = self.ordinal().saturating_add(months);
        let year = i32::try_from(ordinal.div_euclid(12)).unwrap_or(if ordinal < 0 {
            i32::MIN
        } else {
            i32::MAX
        });
        let month = ordinal.rem_euclid(12) as u32 + 1;
        Self { year, month }
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    pub fn previous(&self) -> Self {
        self.offset(-1)
    }

    /// Date in this month with `day` capped to the month's last valid day.
    pub fn clamped_day(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or_else(|| self.first_day())
    }

    /// Long label such as `February 2024`.
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    match (
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
        NaiveDate::from_ymd_opt(year, month, 1),
    ) {
        (Some(first_next), Some(first)) => (first_next - first).num_days() as u32,
        _ => 31,
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| MonthParseError(trimmed.to_string()))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(MonthParseError(trimmed.to_string()));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| MonthParseError(trimmed.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthParseError(trimmed.to_string()))?;
        YearMonth::new(year, month).ok_or_else(|| MonthParseError(trimmed.to_string()))
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        YearMonth::of(date)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn month_lengths_cover_all_variants() {
        assert_eq!(ym(2024, 2).days_in_month(), 29);
        assert_eq!(ym(2023, 2).days_in_month(), 28);
        assert_eq!(ym(2024, 4).days_in_month(), 30);
        assert_eq!(ym(2024, 12).days_in_month(), 31);
        assert_eq!(ym(1900, 2).days_in_month(), 28);
        assert_eq!(ym(2000, 2).days_in_month(), 29);
    }

    #[test]
    fn offset_crosses_year_boundaries() {
        assert_eq!(ym(2024, 11).offset(3), ym(2025, 2));
        assert_eq!(ym(2024, 1).offset(-1), ym(2023, 12));
        assert_eq!(ym(2024, 1).offset(-25), ym(2021, 12));
        assert_eq!(ym(2023, 12).months_until(ym(2025, 1)), 13);
    }

    #[test]
    fn clamped_day_caps_to_month_length() {
        let jan = ym(2024, 1);
        assert_eq!(
            jan.offset(1).clamped_day(31),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            jan.offset(3).clamped_day(31),
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()
        );
    }

    #[test]
    fn offset_accepts_month_counts_beyond_i32() {
        let start = ym(2024, 1);
        let far = start.offset(i64::from(u32::MAX));
        assert_eq!(start.months_until(far), i64::from(u32::MAX));
    }

    #[test]
    fn parses_and_formats_keys() {
        let month: YearMonth = "2025-05".parse().unwrap();
        assert_eq!(month, ym(2025, 5));
        assert_eq!(month.to_string(), "2025-05");
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("2025-5".parse::<YearMonth>().is_err());
        assert!("May 2025".parse::<YearMonth>().is_err());
    }

    #[test]
    fn serializes_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(ym(2024, 3), 1200.0);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2024-03":1200.0}"#);
        let back: std::collections::BTreeMap<YearMonth, f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn contains_checks_year_and_month() {
        let feb = ym(2024, 2);
        assert!(feb.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!feb.contains(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()));
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
