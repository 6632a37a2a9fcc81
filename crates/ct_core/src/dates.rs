use chrono::NaiveDate;

/// Candidate formats for human-entered article dates, tried in order.
const DATE_FORMATS: [&str; 5] = [
    "%d %B %Y",  // 20 March 2025
    "%B %d, %Y", // March 20, 2025
    "%Y-%m-%d",  // 2025-03-20
    "%d/%m/%Y",  // 20/03/2025
    "%m/%d/%Y",  // 03/20/2025
];

/// A date-keyed partition assignment. `fell_back` is set when the raw date
/// string did not parse under any candidate format and the generation date
/// was used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBucket {
    pub date: NaiveDate,
    pub fell_back: bool,
}

impl DateBucket {
    /// Assign a bucket from a free-form date string. Never fails: when no
    /// candidate format matches, the provided generation date wins.
    pub fn assign(raw: &str, generation_date: NaiveDate) -> Self {
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), format) {
                return Self {
                    date,
                    fell_back: false,
                };
            }
        }
        Self {
            date: generation_date,
            fell_back: true,
        }
    }

    /// Canonical `YYYY-MM-DD` partition key.
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Collection-name suffix form, e.g. `tips_2025_03_20`.
    pub fn collection_name(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.date.format("%Y_%m_%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_long_form_date() {
        let bucket = DateBucket::assign("20 March 2025", fallback());
        assert_eq!(bucket.key(), "2025-03-20");
        assert!(!bucket.fell_back);
    }

    #[test]
    fn test_american_form_date() {
        let bucket = DateBucket::assign("March 20, 2025", fallback());
        assert_eq!(bucket.key(), "2025-03-20");
    }

    #[test]
    fn test_iso_date() {
        let bucket = DateBucket::assign("2025-03-20", fallback());
        assert_eq!(bucket.key(), "2025-03-20");
    }

    #[test]
    fn test_unparseable_date_falls_back() {
        let bucket = DateBucket::assign("not a date", fallback());
        assert_eq!(bucket.key(), "2025-01-01");
        assert!(bucket.fell_back);
    }

    #[test]
    fn test_collection_name() {
        let bucket = DateBucket::assign("2025-03-20", fallback());
        assert_eq!(bucket.collection_name("tips"), "tips_2025_03_20");
    }
}
