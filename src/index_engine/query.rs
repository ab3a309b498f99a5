use crate::index_engine::record_fields::CheckoutDate;

/// A point lookup: all records for `id`, optionally narrowed by year/month.
///
/// `0` in `year` or `month` is a wildcard, not a literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub id: String,
    pub year: u32,
    pub month: u32,
}

impl Query {
    pub fn new(id: impl Into<String>, year: u32, month: u32) -> Self {
        Self {
            id: id.into(),
            year,
            month,
        }
    }

    /// A query with no date filter.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new(id, 0, 0)
    }

    #[inline]
    pub fn has_date_filter(&self) -> bool {
        self.year != 0 || self.month != 0
    }

    /// Whether a record dated `date` passes both filters.
    #[inline]
    pub fn matches_date(&self, date: &CheckoutDate) -> bool {
        let year_matches = self.year == 0 || date.year == i64::from(self.year);
        let month_matches = self.month == 0 || date.month == i64::from(self.month);
        year_matches && month_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: i64, year: i64) -> CheckoutDate {
        CheckoutDate {
            month,
            day: 1,
            year,
        }
    }

    #[test]
    fn zero_is_a_wildcard() {
        let query = Query::by_id("1");
        assert!(!query.has_date_filter());
        assert!(query.matches_date(&date(1, 1999)));
    }

    #[test]
    fn both_filters_must_pass() {
        let query = Query::new("1", 2012, 7);
        assert!(query.has_date_filter());
        assert!(query.matches_date(&date(7, 2012)));
        assert!(!query.matches_date(&date(8, 2012)));
        assert!(!query.matches_date(&date(7, 2013)));
    }
}
