//! Mapping between RRULE values and the handheld's repeat codes.

use std::collections::HashMap;

use crate::date::parse_weekday_code;
use crate::event::{MonthlyRule, Repeat};

/// Decode an RRULE value (without the `RRULE:` prefix).
///
/// Returns `None` for rules outside the supported subset; callers treat
/// that as `Repeat::No`.
pub fn decode_rrule(value: &str) -> Option<Repeat> {
    let upper = value.trim().to_uppercase();
    let parts: HashMap<&str, &str> = upper
        .split(';')
        .filter_map(|part| part.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect();

    match *parts.get("FREQ")? {
        "DAILY" => Some(Repeat::Daily),
        "WEEKLY" => {
            let days = parts
                .get("BYDAY")
                .map(|list| list.split(',').filter_map(parse_weekday_code).collect())
                .unwrap_or_default();
            Some(Repeat::Weekly(days))
        }
        "MONTHLY" => {
            if let Some(day) = parts.get("BYMONTHDAY") {
                return MonthlyRule::parse(day).map(Repeat::Monthly);
            }
            let code = parts.get("BYDAY")?.split(',').next()?;
            MonthlyRule::parse(code).map(Repeat::Monthly)
        }
        "YEARLY" => {
            let month: u32 = parts.get("BYMONTH")?.parse().ok()?;
            let day: u32 = parts.get("BYMONTHDAY")?.parse().ok()?;
            ((1..=12).contains(&month) && (1..=31).contains(&day))
                .then_some(Repeat::Yearly { month, day })
        }
        _ => None,
    }
}

/// Encode a repeat code as an RRULE value. `Repeat::No` has none.
pub fn encode_rrule(repeat: &Repeat) -> Option<String> {
    match repeat {
        Repeat::No => None,
        Repeat::Daily => Some("FREQ=DAILY".to_string()),
        Repeat::Weekly(days) if days.is_empty() => Some("FREQ=WEEKLY".to_string()),
        Repeat::Weekly(_) => {
            // "WEEKLY MO,WE" -> "MO,WE"
            let text = repeat.to_string();
            let days = text.trim_start_matches("WEEKLY ");
            Some(format!("FREQ=WEEKLY;BYDAY={days}"))
        }
        Repeat::Monthly(rule @ MonthlyRule::Day(_)) => {
            Some(format!("FREQ=MONTHLY;BYMONTHDAY={rule}"))
        }
        Repeat::Monthly(rule @ MonthlyRule::Weekday { .. }) => {
            Some(format!("FREQ=MONTHLY;BYDAY={rule}"))
        }
        Repeat::Yearly { month, day } => {
            Some(format!("FREQ=YEARLY;BYMONTH={month};BYMONTHDAY={day}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_decode_supported_rules() {
        assert_eq!(decode_rrule("FREQ=DAILY"), Some(Repeat::Daily));
        assert_eq!(
            decode_rrule("FREQ=WEEKLY;BYDAY=MO,WE"),
            Some(Repeat::Weekly(vec![Weekday::Mon, Weekday::Wed]))
        );
        assert_eq!(decode_rrule("FREQ=WEEKLY"), Some(Repeat::Weekly(vec![])));
        assert_eq!(
            decode_rrule("FREQ=MONTHLY;BYMONTHDAY=15"),
            Some(Repeat::Monthly(MonthlyRule::Day(15)))
        );
        assert_eq!(
            decode_rrule("FREQ=MONTHLY;BYDAY=2TU"),
            Some(Repeat::Monthly(MonthlyRule::Weekday { ordinal: 2, day: Weekday::Tue }))
        );
        assert_eq!(
            decode_rrule("FREQ=YEARLY;BYMONTH=1;BYMONTHDAY=5"),
            Some(Repeat::Yearly { month: 1, day: 5 })
        );
        assert_eq!(
            Repeat::Yearly { month: 1, day: 5 }.to_string(),
            "YEARLY JAN05"
        );
    }

    #[test]
    fn test_decode_ignores_order_and_extra_parts() {
        assert_eq!(
            decode_rrule("INTERVAL=1;BYDAY=FR;FREQ=WEEKLY;WKST=SU"),
            Some(Repeat::Weekly(vec![Weekday::Fri]))
        );
        assert_eq!(decode_rrule("freq=daily;count=3"), Some(Repeat::Daily));
    }

    #[test]
    fn test_decode_unsupported_rules() {
        assert_eq!(decode_rrule("FREQ=HOURLY"), None);
        assert_eq!(decode_rrule("FREQ=MONTHLY"), None);
        assert_eq!(decode_rrule("FREQ=YEARLY"), None);
        assert_eq!(decode_rrule("BYDAY=MO"), None);
        assert_eq!(decode_rrule(""), None);
    }

    #[test]
    fn test_encode_is_inverse_of_decode() {
        for repeat in [
            Repeat::Daily,
            Repeat::Weekly(vec![Weekday::Mon, Weekday::Wed]),
            Repeat::Weekly(vec![]),
            Repeat::Monthly(MonthlyRule::Day(10)),
            Repeat::Monthly(MonthlyRule::Weekday { ordinal: -1, day: Weekday::Fri }),
            Repeat::Yearly { month: 12, day: 25 },
        ] {
            let rrule = encode_rrule(&repeat).unwrap();
            assert_eq!(decode_rrule(&rrule), Some(repeat), "{rrule}");
        }
        assert_eq!(encode_rrule(&Repeat::No), None);
    }
}
