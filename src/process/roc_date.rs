// src/process/roc_date.rs
use crate::error::LvrError;
use chrono::NaiveDate;

/// Adding this to `yyyMMdd` shifts the ROC year onto the Gregorian one and
/// leaves month and day alone.
const ROC_OFFSET: u32 = 1911_0000;

/// Parse an ROC numeric date such as `"1080101"` (year 108, Jan 1st) into a
/// Gregorian date. The year may have one to three digits.
pub fn parse_roc_date(raw: &str) -> Result<NaiveDate, LvrError> {
    let s = raw.trim();
    if !(5..=7).contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LvrError::parse(raw, "ROC date yyyMMdd"));
    }
    let value: u32 = s
        .parse()
        .map_err(|_| LvrError::parse(raw, "ROC date yyyMMdd"))?;

    let gregorian = value + ROC_OFFSET;
    let (year, month, day) = (gregorian / 10_000, gregorian / 100 % 100, gregorian % 100);

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| LvrError::parse(raw, "valid calendar date"))
}

/// `"1080101"` → `"2019-01-01"`.
pub fn roc_to_iso(raw: &str) -> Result<String, LvrError> {
    parse_roc_date(raw).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_iso() {
        assert_eq!(roc_to_iso("1080101").unwrap(), "2019-01-01");
        assert_eq!(roc_to_iso("1000315").unwrap(), "2011-03-15");
        assert_eq!(roc_to_iso(" 1081231 ").unwrap(), "2019-12-31");
    }

    #[test]
    fn short_roc_years() {
        // ROC 99 is 2010, ROC 1 is 1912.
        assert_eq!(roc_to_iso("991001").unwrap(), "2010-10-01");
        assert_eq!(roc_to_iso("10101").unwrap(), "1912-01-01");
    }

    #[test]
    fn leap_day() {
        assert_eq!(roc_to_iso("1090229").unwrap(), "2020-02-29");
        assert!(roc_to_iso("1080229").is_err());
    }

    #[test]
    fn rejects_bad_width() {
        for bad in ["", "101", "0101", "10801011", "108010a", "108-01-01"] {
            let err = roc_to_iso(bad).unwrap_err();
            assert!(matches!(err, LvrError::Parse { .. }), "{bad:?}");
        }
    }

    #[test]
    fn rejects_out_of_range_month_and_day() {
        assert!(matches!(roc_to_iso("1081301"), Err(LvrError::Parse { .. })));
        assert!(matches!(roc_to_iso("1080132"), Err(LvrError::Parse { .. })));
        assert!(matches!(roc_to_iso("1080000"), Err(LvrError::Parse { .. })));
    }
}
