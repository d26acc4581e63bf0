//! Automatic locale detection.

use super::Locale;
use std::env;

/// Variable consulted before the POSIX locale variables.
pub const VELLUM_LOCALE: &str = "VELLUM_LOCALE";

const ENV_PRIORITY: [&str; 4] = [VELLUM_LOCALE, "LC_ALL", "LC_MESSAGES", "LANG"];

/// Detect the process locale.
///
/// Priority: `VELLUM_LOCALE` > `LC_ALL` > `LC_MESSAGES` > `LANG` > `en`.
pub fn detect_locale() -> Locale {
    ENV_PRIORITY
        .iter()
        .find_map(|var| env::var(var).ok().as_deref().and_then(parse_env_locale))
        .unwrap_or_default()
}

/// Parse a POSIX locale value such as `en_GB.UTF-8@euro`.
///
/// `C` and `POSIX` carry no language and yield `None`.
pub fn parse_env_locale(value: &str) -> Option<Locale> {
    let value = value.split(['.', '@']).next().unwrap_or_default().trim();
    if value.is_empty() || value == "C" || value == "POSIX" {
        return None;
    }
    Locale::parse(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("en_GB.UTF-8", Some("en_GB") ; "codeset stripped")]
    #[test_case("de_DE@euro", Some("de_DE") ; "modifier stripped")]
    #[test_case("fr_FR.ISO-8859-1@euro", Some("fr_FR") ; "both stripped")]
    #[test_case("ja", Some("ja") ; "language only")]
    #[test_case("C", None ; "c locale")]
    #[test_case("POSIX", None ; "posix locale")]
    #[test_case("C.UTF-8", None ; "c utf8 locale")]
    #[test_case("", None ; "empty")]
    #[test_case("english", None ; "garbage")]
    fn test_parse_env_locale(value: &str, expected: Option<&str>) {
        let parsed = parse_env_locale(value).map(|l| l.to_string());
        assert_eq!(parsed.as_deref(), expected);
    }
}
