//! Built-in pattern sources
//!
//! Every built-in is anchored. Patterns that conversion code extracts values
//! from (`amount`, `amount_data`, `duration`) are written once with named
//! capture groups; the registry receives a non-capturing copy and the
//! conversion module compiles the capturing original.

use once_cell::sync::Lazy;
use regex::Regex;

/// Names whose capture layout the conversion module depends on
pub const PROTECTED_PATTERNS: [&str; 3] = ["amount", "amount_data", "duration"];

/// Decimal mantissa with an optional decimal multiplier, e.g. `10.09K`
pub(crate) const AMOUNT_SOURCE: &str =
    r"^(?P<mantissa>[0-9]+(?:\.[0-9]+)?)(?P<multiplier>[KMGT])?$";

/// Integer with optional decimal or binary multiplier and a byte/bit unit, e.g. `100Kib`
pub(crate) const AMOUNT_DATA_SOURCE: &str =
    r"^(?P<mantissa>[0-9]+)(?:(?P<multiplier>[KMGT])(?P<binary>i)?)?(?P<unit>[Bb])$";

/// Integer with a time unit, e.g. `55ms`
pub(crate) const DURATION_SOURCE: &str = r"^(?P<value>[0-9]+)(?P<unit>ms|s|m|h|d|w)$";

const H16: &str = "[0-9A-Fa-f]{1,4}";

const IPV4_OCTET: &str = "(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])";

const HOST_LABEL: &str = "[A-Za-z0-9](?:[-A-Za-z0-9]{0,61}[A-Za-z0-9])?";

static CAPTURE_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\?P<[A-Za-z_][A-Za-z0-9_]*>").expect("capture group matcher is valid")
});

/// Rewrites every named capture group into a non-capturing group
pub(crate) fn non_capturing(source: &str) -> String {
    CAPTURE_GROUP.replace_all(source, "(?:").into_owned()
}

fn anchored(core: &str) -> String {
    format!("^(?:{})$", core)
}

fn ipv4_core() -> String {
    format!(r"(?:{o}\.){{3}}{o}", o = IPV4_OCTET)
}

/// Unanchored IPv6 address grammar.
///
/// The uncompressed eight-group form plus one shape per position of the
/// `::` run: 0 to 7 explicit groups before it and up to `7 - left` after.
pub(crate) fn ipv6_core() -> String {
    let mut shapes = vec![format!("(?:{h}:){{7}}{h}", h = H16)];
    for left in 0..=7usize {
        let right = 7 - left;
        let head = if left == 0 {
            ":".to_string()
        } else {
            format!("(?:{}:){{{}}}", H16, left)
        };
        let tail = if right == 0 {
            ":".to_string()
        } else {
            format!(":(?:{h}(?::{h}){{0,{n}}})?", h = H16, n = right - 1)
        };
        shapes.push(format!("{}{}", head, tail));
    }
    format!("(?:{})", shapes.join("|"))
}

fn hostname_core() -> String {
    format!(r"{l}(?:\.{l})*\.?", l = HOST_LABEL)
}

/// All built-in patterns as (name, anchored source)
pub(crate) fn sources() -> Vec<(&'static str, String)> {
    let ipv4 = ipv4_core();
    let ipv6 = ipv6_core();
    let hostname = hostname_core();

    vec![
        // literal classes
        ("boolean", anchored("(?i:true|false|yes|no|y|n|on|off|1|0)")),
        ("name", anchored("[-_.A-Za-z0-9]+")),
        (
            "plugin",
            anchored("[A-Za-z_][A-Za-z0-9_]*(?:\\.[A-Za-z_][A-Za-z0-9_]*)*"),
        ),
        ("printable", anchored(r"[^\p{Cc}]+")),
        ("string", anchored("(?s:.*)")),
        (
            "unix_path",
            anchored(r"/|/?[^/\x00]+(?:/[^/\x00]+)*/?"),
        ),
        (
            "windows_path",
            anchored(
                r#"(?:[A-Za-z]:)?(?:[\\/]|[\\/]?[^\\/:*?"<>|\x00-\x1f]+(?:[\\/][^\\/:*?"<>|\x00-\x1f]+)*[\\/]?)"#,
            ),
        ),
        ("user_name", anchored(r"[a-z_][a-z0-9_-]{0,31}\$?")),
        ("variable", anchored("[A-Za-z_][A-Za-z0-9_]*")),
        // network and hosts
        ("hostname", anchored(&hostname)),
        ("ipv4_addr", anchored(&ipv4)),
        (
            "ipv4_cidr",
            anchored(&format!("{}/(?:3[0-2]|[12]?[0-9])", ipv4)),
        ),
        ("ipv6_addr", anchored(&ipv6)),
        (
            "ipv6_cidr",
            anchored(&format!("{}/(?:12[0-8]|1[01][0-9]|[1-9]?[0-9])", ipv6)),
        ),
        (
            "machine",
            anchored(&format!("{}|{}|{}", hostname, ipv4, ipv6)),
        ),
        // value forms shared with conversions
        ("amount", non_capturing(AMOUNT_SOURCE)),
        ("amount_data", non_capturing(AMOUNT_DATA_SOURCE)),
        ("duration", non_capturing(DURATION_SOURCE)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(name: &str) -> Regex {
        let (_, source) = sources()
            .into_iter()
            .find(|(n, _)| *n == name)
            .unwrap();
        Regex::new(&source).unwrap()
    }

    #[test]
    fn test_non_capturing_strips_groups() {
        let plain = non_capturing(AMOUNT_DATA_SOURCE);
        assert!(!plain.contains("?P<"));
        let re = Regex::new(&plain).unwrap();
        assert_eq!(re.captures_len(), 1);
        assert!(re.is_match("100Kib"));
    }

    #[test]
    fn test_all_sources_anchored_and_compile() {
        for (name, source) in sources() {
            assert!(source.starts_with('^') && source.ends_with('$'), "{}", name);
            assert!(Regex::new(&source).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_ipv6_shapes() {
        let re = compiled("ipv6_addr");
        for good in [
            "::",
            "::1",
            "fe80::1",
            "2001:db8::8a2e:370:7334",
            "2001:0db8:85a3:0000:0000:8a2e:0370:7334",
            "1:2:3:4:5:6:7::",
            "1::8",
        ] {
            assert!(re.is_match(good), "{}", good);
        }
        for bad in [
            "",
            ":",
            "1:2:3:4:5:6:7:8:9",
            "1::2::3",
            "12345::",
            "g::1",
            "1:2:3:4:5:6:7",
        ] {
            assert!(!re.is_match(bad), "{}", bad);
        }
    }

    #[test]
    fn test_ipv4_and_cidr() {
        let addr = compiled("ipv4_addr");
        assert!(addr.is_match("192.168.0.1"));
        assert!(addr.is_match("0.0.0.0"));
        assert!(!addr.is_match("256.1.1.1"));
        assert!(!addr.is_match("01.1.1.1"));

        let cidr = compiled("ipv4_cidr");
        assert!(cidr.is_match("10.0.0.0/8"));
        assert!(!cidr.is_match("10.0.0.0/33"));

        let cidr6 = compiled("ipv6_cidr");
        assert!(cidr6.is_match("fd00::/64"));
        assert!(!cidr6.is_match("fd00::/129"));
    }

    #[test]
    fn test_machine_is_union() {
        let re = compiled("machine");
        assert!(re.is_match("server.example.com"));
        assert!(re.is_match("10.1.2.3"));
        assert!(re.is_match("::1"));
        assert!(!re.is_match("bad host"));
    }

    #[test]
    fn test_literal_classes() {
        assert!(compiled("boolean").is_match("Yes"));
        assert!(!compiled("boolean").is_match("maybe"));
        assert!(compiled("user_name").is_match("alice"));
        assert!(!compiled("user_name").is_match("Alice"));
        assert!(compiled("unix_path").is_match("/usr/local/bin"));
        assert!(compiled("windows_path").is_match(r"C:\Program Files\app"));
        assert!(compiled("printable").is_match("hello world"));
        assert!(!compiled("printable").is_match("bell\u{7}"));
        assert!(compiled("string").is_match(""));
        assert!(compiled("variable").is_match("_HOME1"));
        assert!(compiled("plugin").is_match("plugins.audio"));
    }
}
