// src/process/numeral.rs
use tracing::trace;

const FLOOR_SUFFIX: char = '層';
const HUNDRED: char = '百';
const TEN: char = '十';

fn digit_value(c: char) -> Option<u32> {
    match c {
        '一' => Some(1),
        '二' => Some(2),
        '三' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '七' => Some(7),
        '八' => Some(8),
        '九' => Some(9),
        _ => None,
    }
}

/// Value contributed by a positional marker at `idx`: the digit right before it,
/// or 1 when the marker opens the string or follows a non-digit ("十三" is 13).
fn tier(chars: &[char], idx: usize, place: u32) -> u32 {
    let multiplier = idx
        .checked_sub(1)
        .and_then(|prev| digit_value(chars[prev]))
        .unwrap_or(1);
    multiplier * place
}

/// Parse a Chinese-numeral floor count such as `"十三層"` into 13.
///
/// Supports counts below 1000 (hundreds, tens and units). Absent or empty
/// input is `None`. A non-empty string that contains no known digit and no
/// marker parses to `Some(0)`; that value never satisfies any floor threshold.
pub fn parse_floor_count(raw: Option<&str>) -> Option<u32> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }

    let body = raw.strip_suffix(FLOOR_SUFFIX).unwrap_or(raw);
    let chars: Vec<char> = body.chars().collect();

    let mut total = 0;
    let mut recognized = false;

    if let Some(idx) = chars.iter().position(|&c| c == HUNDRED) {
        total += tier(&chars, idx, 100);
        recognized = true;
    }
    if let Some(idx) = chars.iter().position(|&c| c == TEN) {
        total += tier(&chars, idx, 10);
        recognized = true;
    }
    if let Some(units) = chars.last().copied().and_then(digit_value) {
        total += units;
        recognized = true;
    }

    if !recognized {
        trace!(raw, "no numeral recognised, floor count falls back to 0");
        return Some(0);
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_examples() {
        assert_eq!(parse_floor_count(Some("十三層")), Some(13));
        assert_eq!(parse_floor_count(Some("十層")), Some(10));
        assert_eq!(parse_floor_count(Some("三層")), Some(3));
        assert_eq!(parse_floor_count(Some("百一十二層")), Some(112));
    }

    #[test]
    fn absent_or_empty_is_none() {
        assert_eq!(parse_floor_count(None), None);
        assert_eq!(parse_floor_count(Some("")), None);
    }

    #[test]
    fn explicit_multipliers() {
        assert_eq!(parse_floor_count(Some("二十八層")), Some(28));
        assert_eq!(parse_floor_count(Some("三十層")), Some(30));
        assert_eq!(parse_floor_count(Some("一百層")), Some(100));
        assert_eq!(parse_floor_count(Some("二百零五層")), Some(205));
        assert_eq!(parse_floor_count(Some("一百十層")), Some(110));
    }

    #[test]
    fn suffix_is_optional() {
        assert_eq!(parse_floor_count(Some("十三")), Some(13));
        assert_eq!(parse_floor_count(Some("九")), Some(9));
    }

    // Legacy behaviour: unrecognised input is 0 rather than None.
    #[test]
    fn unrecognized_input_falls_back_to_zero() {
        assert_eq!(parse_floor_count(Some("層")), Some(0));
        assert_eq!(parse_floor_count(Some("見其他登記事項")), Some(0));
        assert_eq!(parse_floor_count(Some("13")), Some(0));
    }
}
