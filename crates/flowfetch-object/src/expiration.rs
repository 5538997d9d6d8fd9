//! Parsing of the `x-amz-expiration` response header.

use std::sync::LazyLock;

use jiff::Timestamp;
use regex::Regex;

static PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<name>[A-Za-z-]+)="(?P<value>[^"]*)""#)
        .expect("expiration pair pattern is valid")
});

/// Lifecycle expiration of an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expiration {
    /// When the object expires.
    pub time: Option<Timestamp>,
    /// Lifecycle rule that set the expiration.
    pub rule_id: Option<String>,
}

/// Parse `expiry-date="<RFC 1123 date>", rule-id="<id>"`.
///
/// Unknown pairs are ignored, and an unparseable date leaves `time` unset.
pub fn parse_expiration(header: &str) -> Expiration {
    let mut expiration = Expiration::default();
    for caps in PAIR.captures_iter(header) {
        let value = &caps["value"];
        match &caps["name"] {
            "expiry-date" => {
                expiration.time = jiff::fmt::rfc2822::parse(value)
                    .ok()
                    .map(|zoned| zoned.timestamp());
            }
            "rule-id" => expiration.rule_id = Some(value.to_owned()),
            _ => {}
        }
    }
    expiration
}
