//! Wildcard substitution for string arguments.
//!
//! Recognized tokens:
//!
//! - `%DateTime%` - local time as `HHmmss-ddMMyyyy`
//! - `%DateTimeISO8601%` - local time as `yyyy-MM-ddTHH:mm:ss`
//! - `%ServerName%` - host name
//! - `%Guid%` - a fresh UUID for every occurrence
//! - `%Test_Start_DateTime%` - run start time as `yyyy-MM-dd HH:mm:ss.fff`
//!
//! Anything else, including unknown `%...%` pairs, is copied through.

use chrono::{DateTime, Local};
use uuid::Uuid;

/// A recognized wildcard token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcard {
    DateTime,
    DateTimeIso8601,
    ServerName,
    Guid,
    TestStartDateTime,
}

impl Wildcard {
    /// Look up a token by the name between the `%` signs.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DateTime" => Some(Wildcard::DateTime),
            "DateTimeISO8601" => Some(Wildcard::DateTimeIso8601),
            "ServerName" => Some(Wildcard::ServerName),
            "Guid" => Some(Wildcard::Guid),
            "Test_Start_DateTime" => Some(Wildcard::TestStartDateTime),
            _ => None,
        }
    }

    /// Produce the replacement text.
    pub fn expand(self, test_start: &DateTime<Local>) -> String {
        match self {
            Wildcard::DateTime => Local::now().format("%H%M%S-%d%m%Y").to_string(),
            Wildcard::DateTimeIso8601 => Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            Wildcard::ServerName => host_name(),
            Wildcard::Guid => Uuid::new_v4().to_string(),
            Wildcard::TestStartDateTime => test_start.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        }
    }
}

/// Replace every recognized token in `input` in a single left-to-right pass.
pub fn substitute(input: &str, test_start: &DateTime<Local>) -> String {
    if !input.contains('%') {
        return input.to_string();
    }

    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('%') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let token = after
            .find('%')
            .and_then(|close| Wildcard::from_name(&after[..close]).map(|w| (w, close)));

        match token {
            Some((wildcard, close)) => {
                output.push_str(&wildcard.expand(test_start));
                rest = &after[close + 1..];
            }
            None => {
                output.push('%');
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Name of the machine running the test.
pub fn host_name() -> String {
    #[cfg(unix)]
    {
        let mut buf = [0u8; 256];
        // SAFETY: buf is valid for buf.len() bytes; gethostname NUL-terminates on success.
        let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
        if rc == 0 {
            let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            if end > 0 {
                return String::from_utf8_lossy(&buf[..end]).into_owned();
            }
        }
    }

    std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn text_without_tokens_is_unchanged() {
        assert_eq!(substitute("no-token", &start()), "no-token");
        assert_eq!(substitute("", &start()), "");
    }

    #[test]
    fn unknown_tokens_are_kept() {
        assert_eq!(substitute("%Unknown% 50%", &start()), "%Unknown% 50%");
    }

    #[test]
    fn test_start_uses_millisecond_format() {
        assert_eq!(
            substitute("at %Test_Start_DateTime%", &start()),
            "at 2024-03-09 14:05:07.000"
        );
    }

    #[test]
    fn guid_is_fresh_per_occurrence() {
        let out = substitute("%Guid%|%Guid%", &start());
        let (a, b) = out.split_once('|').unwrap();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a).is_ok());
    }

    #[test]
    fn date_time_has_expected_shape() {
        let out = substitute("%DateTime%", &start());
        assert_eq!(out.len(), "HHmmss-ddMMyyyy".len());
        assert_eq!(out.as_bytes()[6], b'-');
    }

    #[test]
    fn iso8601_has_expected_shape() {
        let out = substitute("%DateTimeISO8601%", &start());
        assert_eq!(out.len(), "yyyy-MM-ddTHH:mm:ss".len());
        assert_eq!(out.as_bytes()[10], b'T');
    }

    #[test]
    fn multiple_tokens_in_one_pass() {
        let out = substitute("%ServerName%/%Test_Start_DateTime%/%Guid%", &start());
        assert!(out.starts_with(&host_name()));
        assert!(out.contains("2024-03-09 14:05:07.000"));
        assert!(!out.contains('%'));
    }

    #[test]
    fn stray_percent_before_token() {
        assert_eq!(
            substitute("100%%Test_Start_DateTime%", &start()),
            "100%2024-03-09 14:05:07.000"
        );
    }

    #[test]
    fn host_name_is_not_empty() {
        assert!(!host_name().is_empty());
    }
}
