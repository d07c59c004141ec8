use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

use super::kind::FileKind;

/// Kind filter: a single [`FileKind`] or the `all` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Only(FileKind),
}

impl KindFilter {
    pub fn matches(&self, kind: FileKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Only(expected) => *expected == kind,
        }
    }
}

impl FromStr for KindFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(KindFilter::All);
        }
        s.parse::<FileKind>().map(KindFilter::Only)
    }
}

impl Display for KindFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            KindFilter::All => f.write_str("all"),
            KindFilter::Only(kind) => write!(f, "{}", kind),
        }
    }
}

impl Serialize for KindFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for KindFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Upload-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    #[default]
    All,
    Today,
    Week,
    Month,
    Year,
}

impl DateFilter {
    /// Earliest `uploaded_at` that passes the filter, or `None` for `all`.
    ///
    /// Months and years are calendar-relative (`now` minus one month keeps the day of
    /// month, clamped to the shorter month).
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateFilter::All => None,
            DateFilter::Today => Some(now - Duration::days(1)),
            DateFilter::Week => Some(now - Duration::days(7)),
            DateFilter::Month => Some(
                now.checked_sub_months(Months::new(1))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
            ),
            DateFilter::Year => Some(
                now.checked_sub_months(Months::new(12))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
            ),
        }
    }

    pub fn matches(&self, uploaded_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.cutoff(now) {
            Some(cutoff) => uploaded_at >= cutoff,
            None => true,
        }
    }
}

impl FromStr for DateFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(DateFilter::All),
            "today" => Ok(DateFilter::Today),
            "week" => Ok(DateFilter::Week),
            "month" => Ok(DateFilter::Month),
            "year" => Ok(DateFilter::Year),
            _ => Err(anyhow::anyhow!("Invalid date filter: {}", s)),
        }
    }
}

/// Ordering of the derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
    SizeAsc,
    SizeDesc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
            SortKey::SizeAsc => "size-asc",
            SortKey::SizeDesc => "size-desc",
        }
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "name-asc" => Ok(SortKey::NameAsc),
            "name-desc" => Ok(SortKey::NameDesc),
            "size-asc" => Ok(SortKey::SizeAsc),
            "size-desc" => Ok(SortKey::SizeDesc),
            _ => Err(anyhow::anyhow!("Invalid sort key: {}", s)),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Search text, filters and sort key driving the derived catalog view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryState {
    pub search_text: String,
    pub kind_filter: KindFilter,
    pub date_filter: DateFilter,
    pub sort_key: SortKey,
}

impl QueryState {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn kind(mut self, filter: KindFilter) -> Self {
        self.kind_filter = filter;
        self
    }

    pub fn date(mut self, filter: DateFilter) -> Self {
        self.date_filter = filter;
        self
    }

    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort_key = key;
        self
    }
}
