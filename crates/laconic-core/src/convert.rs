//! Typed accessors
//!
//! Every accessor takes a default that is returned unchanged when the value is
//! absent or empty. Views created with [`NodeRef::verbatim`] read the raw value
//! instead of the expanded one.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};

use crate::atom::Atom;
use crate::entity_id::EntityId;
use crate::error::{Error, Result};
use crate::node::NodeRef;

const TRUE_VALUES: [&str; 6] = ["true", "t", "yes", "y", "1", "on"];
const FALSE_VALUES: [&str; 6] = ["false", "f", "no", "n", "0", "off"];

impl<'a> NodeRef<'a> {
    fn raw_or_expanded(&self) -> Result<Option<String>> {
        if self.is_verbatim() {
            Ok(self.verbatim_value().map(str::to_string))
        } else {
            self.value()
        }
    }

    /// Non-empty text to convert, or `None` to use the default
    fn text(&self) -> Result<Option<String>> {
        Ok(self.raw_or_expanded()?.filter(|v| !v.is_empty()))
    }

    fn coerce<T>(
        &self,
        default: T,
        target: &'static str,
        convert: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T> {
        match self.text()? {
            None => Ok(default),
            Some(text) => {
                convert(text.as_str()).ok_or_else(|| Error::coercion(self.path(), target, text.as_str()))
            }
        }
    }

    pub fn as_str(&self, default: &str) -> Result<String> {
        Ok(self.text()?.unwrap_or_else(|| default.to_string()))
    }

    /// Integer with `0x` / `0o` / `0b` base prefixes
    pub fn as_int(&self, default: i64) -> Result<i64> {
        self.coerce(default, "int", parse_int)
    }

    pub fn as_float(&self, default: f64) -> Result<f64> {
        self.coerce(default, "float", parse_float)
    }

    /// `true/t/yes/y/1/on` or `false/f/no/n/0/off`, case-insensitive
    pub fn as_bool(&self, default: bool) -> Result<bool> {
        self.coerce(default, "bool", parse_bool)
    }

    /// ISO-8601 date-time; a trailing `Z` means UTC and naive values are UTC
    pub fn as_datetime(&self, default: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>> {
        self.coerce(default, "datetime", parse_datetime)
    }

    pub fn as_atom(&self, default: Atom) -> Result<Atom> {
        match self.text()? {
            None => Ok(default),
            Some(text) => text.trim().parse::<Atom>().map_err(|e| {
                Error::coercion(self.path(), "atom", text.as_str()).with_help(e.to_string())
            }),
        }
    }

    pub fn as_entity_id(&self, default: EntityId) -> Result<EntityId> {
        match self.text()? {
            None => Ok(default),
            Some(text) => text.trim().parse::<EntityId>().map_err(|e| {
                Error::coercion(self.path(), "entityid", text.as_str()).with_help(e.to_string())
            }),
        }
    }
}

/// Parse an integer, detecting the base from its prefix
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let lower = unsigned.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits) = match lower.as_deref() {
        Some("0x") => (16, &unsigned[2..]),
        Some("0o") => (8, &unsigned[2..]),
        Some("0b") => (2, &unsigned[2..]),
        _ => (10, unsigned),
    };
    let digits = if radix != 10 {
        digits.strip_prefix('_').unwrap_or(digits)
    } else {
        digits
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
        || digits.starts_with(['+', '-'])
    {
        return None;
    }
    // decimal literals do not take leading zeros
    if radix == 10 && digits.starts_with('0') && digits.chars().any(|c| c != '0' && c != '_') {
        return None;
    }

    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    let magnitude = u64::from_str_radix(&digits, radix).ok()?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}

pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.contains("__") || text.starts_with('_') || text.ends_with('_') {
        return None;
    }
    text.replace('_', "").parse().ok()
}

pub fn parse_bool(text: &str) -> Option<bool> {
    let lower = text.trim().to_lowercase();
    if TRUE_VALUES.contains(&lower.as_str()) {
        Some(true)
    } else if FALSE_VALUES.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

pub fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    let normalized = match text.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{}+00:00", rest),
        None => text.to_string(),
    };

    const ZONED: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%d %H:%M%:z",
    ];
    for format in ZONED {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt);
        }
    }

    let utc = FixedOffset::east_opt(0)?;
    const NAIVE: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(utc.from_utc_datetime(&naive));
        }
    }

    let date = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()?;
    Some(utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parse;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_int_bases() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("  -7 "), Some(-7));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0X1f"), Some(31));
        assert_eq!(parse_int("0o17"), Some(15));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("-0x10"), Some(-16));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("000"), Some(0));
    }

    #[test]
    fn test_parse_int_rejects() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("1.5"), None);
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("012"), None);
        assert_eq!(parse_int("1__0"), None);
        assert_eq!(parse_int("--1"), None);
        assert_eq!(parse_int("99999999999999999999"), None);
    }

    #[test]
    fn test_parse_int_limits() {
        assert_eq!(parse_int("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_int("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_int("9223372036854775808"), None);
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("1.5"), Some(1.5));
        assert_eq!(parse_float(" -2e3 "), Some(-2000.0));
        assert_eq!(parse_float("10"), Some(10.0));
        assert!(parse_float("inf").is_some_and(f64::is_infinite));
        assert_eq!(parse_float("x1"), None);
    }

    #[test]
    fn test_parse_bool() {
        for text in ["true", "T", "Yes", "y", "1", "ON"] {
            assert_eq!(parse_bool(text), Some(true), "{}", text);
        }
        for text in ["false", "F", "no", "N", "0", "Off"] {
            assert_eq!(parse_bool(text), Some(false), "{}", text);
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_datetime() {
        let dt = parse_datetime("2024-03-05T10:20:30Z").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 5));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 20, 30));

        let dt = parse_datetime("2024-03-05T10:20:30.250+02:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7200);
        assert_eq!(dt.nanosecond(), 250_000_000);

        let dt = parse_datetime("2024-03-05 10:20").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt.minute(), 20);

        let dt = parse_datetime("2024-03-05").unwrap();
        assert_eq!((dt.hour(), dt.day()), (0, 5));

        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("2024-13-01").is_none());
    }

    #[test]
    fn test_accessors_on_nodes() {
        let conf = parse(
            r#"root
            {
              port=" 8080 "
              mask=0xff
              ratio=0.75
              enabled=yes
              started=2024-01-02T03:04:05Z
              name=svc
              ref=$($port)
            }"#,
        )
        .unwrap();
        let root = conf.root();

        assert_eq!(root.attr_by_name("port").as_int(0).unwrap(), 8080);
        assert_eq!(root.attr_by_name("mask").as_int(0).unwrap(), 255);
        assert_eq!(root.attr_by_name("ratio").as_float(0.0).unwrap(), 0.75);
        assert!(root.attr_by_name("enabled").as_bool(false).unwrap());
        assert_eq!(
            root.attr_by_name("started").as_datetime(DateTime::default()).unwrap().year(),
            2024
        );
        assert_eq!(root.attr_by_name("name").as_str("x").unwrap(), "svc");
        assert_eq!(root.attr_by_name("ref").as_int(0).unwrap(), 8080);
    }

    #[test]
    fn test_defaults_for_missing_and_empty() {
        let conf = parse("root{ empty=\"\" }").unwrap();
        let root = conf.root();

        assert_eq!(root.attr_by_name("missing").as_int(7).unwrap(), 7);
        assert_eq!(root.attr_by_name("empty").as_int(7).unwrap(), 7);
        assert_eq!(root.attr_by_name("empty").as_str("dflt").unwrap(), "dflt");
        assert!(root.attr_by_name("missing").as_bool(true).unwrap());
        assert_eq!(root.attr_by_name("missing").as_float(1.5).unwrap(), 1.5);
        assert_eq!(root.attr_by_name("missing").as_atom(Atom::ZERO).unwrap(), Atom::ZERO);
    }

    #[test]
    fn test_verbatim_accessors() {
        let conf = parse("root{ a=5 b=$($a) }").unwrap();
        let b = conf.get("$b").unwrap();

        assert_eq!(b.as_int(0).unwrap(), 5);
        assert!(!b.is_verbatim() && b.verbatim().is_verbatim());
        assert_eq!(b.verbatim().as_str("").unwrap(), "$($a)");
        assert!(b.verbatim().as_int(0).is_err());
    }

    #[test]
    fn test_coercion_errors() {
        let conf = parse("root{ a=abc }").unwrap();
        let a = conf.get("$a").unwrap();

        let err = a.as_int(0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Coercion { target: "int" });
        assert_eq!(err.path.as_deref(), Some("/$a"));
        assert_eq!(a.as_float(0.0).unwrap_err().kind, ErrorKind::Coercion { target: "float" });
        assert_eq!(a.as_bool(false).unwrap_err().kind, ErrorKind::Coercion { target: "bool" });
        assert_eq!(
            a.as_datetime(DateTime::default()).unwrap_err().kind,
            ErrorKind::Coercion { target: "datetime" }
        );
        assert_eq!(
            a.as_entity_id(EntityId::default()).unwrap_err().kind,
            ErrorKind::Coercion { target: "entityid" }
        );
    }

    #[test]
    fn test_atom_and_entity_id() {
        let conf = parse("root{ kind=car id=\"car.vin@dealer::A-123\" bad=\"toolongatom\" }").unwrap();
        let root = conf.root();

        let atom = root.attr_by_name("kind").as_atom(Atom::ZERO).unwrap();
        assert_eq!(atom.to_string(), "car");

        let id = root.attr_by_name("id").as_entity_id(EntityId::default()).unwrap();
        assert_eq!(id.system().to_string(), "dealer");
        assert_eq!(id.entity_type().to_string(), "car");
        assert_eq!(id.schema().to_string(), "vin");
        assert_eq!(id.address(), "A-123");

        let err = root.attr_by_name("bad").as_atom(Atom::ZERO).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Coercion { target: "atom" });
        assert!(err.help.is_some());
    }
}
