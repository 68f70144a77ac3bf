//! Sink URL parsing
//!
//! Outputs are configured with strings of the form
//! `scheme://path?key=value;key=value` (the `//` is optional). A string
//! whose prefix before the first `:` is not a valid scheme name is a bare
//! path with an empty scheme.
//!
//! Option values are Python-style literals: `True`/`False`, integers
//! (decimal, `0x`/`0o`/`0b`, `_` separators), floats or quoted strings.

use crate::ConfigError;
use indexmap::IndexMap;

/// A decoded option value.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl OptionValue {
    /// Decode a literal, or `None` if `raw` is not one.
    pub fn parse_literal(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw {
            "True" => return Some(Self::Bool(true)),
            "False" => return Some(Self::Bool(false)),
            _ => {}
        }

        if let Some(quoted) = unquote(raw) {
            return Some(Self::Str(quoted.to_string()));
        }
        if let Some(int) = parse_int(raw) {
            return Some(Self::Int(int));
        }
        // Keep words like `inf` and `nan` out; those are names, not literals.
        let numeric = raw.chars().any(|c| c.is_ascii_digit())
            && raw.contains(['.', 'e', 'E'])
            && raw
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E' | '_'))
            && separators_ok(raw);
        if numeric {
            if let Ok(float) = raw.replace('_', "").parse::<f64>() {
                return Some(Self::Float(float));
            }
        }
        None
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
        }
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let lower = unsigned.to_ascii_lowercase();
    let (radix, body) = match lower.get(..2) {
        Some("0x") => (16, &lower[2..]),
        Some("0o") => (8, &lower[2..]),
        Some("0b") => (2, &lower[2..]),
        _ => (10, lower.as_str()),
    };
    // `0x_ff` is allowed, `_1`, `1_` and `1__0` are not.
    let body = body.strip_prefix('_').filter(|_| radix != 10).unwrap_or(body);
    if !separators_ok(body) || !body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let digits = body.replace('_', "");
    // Decimal literals other than zero may not have leading zeros.
    if radix == 10 && digits.starts_with('0') && !digits.trim_start_matches('0').is_empty() {
        return None;
    }
    let magnitude = i64::from_str_radix(&digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn separators_ok(raw: &str) -> bool {
    !raw.is_empty() && !raw.starts_with('_') && !raw.ends_with('_') && !raw.contains("__")
}

fn unquote(raw: &str) -> Option<&str> {
    let first = raw.chars().next()?;
    if raw.len() >= 2 && matches!(first, '\'' | '"') && raw.ends_with(first) {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

/// Options decoded from a sink URL's query, in the order they were given.
///
/// Constructors take the options they understand; anything left over is
/// reported by [`SinkOptions::finish`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SinkOptions {
    url: String,
    values: IndexMap<String, OptionValue>,
}

impl SinkOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            values: IndexMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: OptionValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Remove a boolean option, falling back to `default` when absent.
    pub fn take_bool(&mut self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.values.shift_remove(key) {
            None => Ok(default),
            Some(OptionValue::Bool(value)) => Ok(value),
            Some(_) => Err(self.wrong_type(key, "a boolean")),
        }
    }

    /// Remove a non-negative integer option, falling back to `default`.
    pub fn take_unsigned(&mut self, key: &str, default: u64) -> Result<u64, ConfigError> {
        match self.values.shift_remove(key) {
            None => Ok(default),
            Some(OptionValue::Int(value)) => {
                u64::try_from(value).map_err(|_| self.wrong_type(key, "an unsigned integer"))
            }
            Some(_) => Err(self.wrong_type(key, "an unsigned integer")),
        }
    }

    /// Fail on the first option no constructor consumed.
    pub fn finish(self) -> Result<(), ConfigError> {
        match self.values.into_keys().next() {
            None => Ok(()),
            Some(key) => Err(ConfigError::UnknownOption { key, url: self.url }),
        }
    }

    fn wrong_type(&self, key: &str, expected: &'static str) -> ConfigError {
        ConfigError::InvalidOptionType {
            key: key.to_string(),
            expected,
            url: self.url.clone(),
        }
    }
}

/// A sink URL split into its parts.
#[derive(Clone, Debug, PartialEq)]
pub struct SinkUrl {
    pub scheme: String,
    pub path: String,
    pub options: SinkOptions,
}

impl SinkUrl {
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let (scheme, rest) = match url.split_once(':') {
            Some((scheme, rest)) if is_scheme(scheme) => {
                (scheme.to_ascii_lowercase(), rest.strip_prefix("//").unwrap_or(rest))
            }
            _ => (String::new(), url),
        };
        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        Ok(Self {
            scheme,
            path: path.to_string(),
            options: parse_query(url, query)?,
        })
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn parse_query(url: &str, query: &str) -> Result<SinkOptions, ConfigError> {
    let mut raw: IndexMap<String, Vec<String>> = IndexMap::new();
    // Both `;` and `&` separate parameters.
    let query = query.replace(';', "&");
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        raw.entry(key.into_owned()).or_default().push(value.into_owned());
    }

    let mut options = SinkOptions::new(url);
    for (key, values) in raw {
        let value = match values.as_slice() {
            [single] if !single.is_empty() => single,
            [_] | [] => {
                return Err(ConfigError::MissingValue {
                    key,
                    url: url.to_string(),
                })
            }
            _ => {
                return Err(ConfigError::DuplicateValue {
                    key,
                    url: url.to_string(),
                })
            }
        };
        let literal =
            OptionValue::parse_literal(value).ok_or_else(|| ConfigError::InvalidLiteral {
                value: value.clone(),
                url: url.to_string(),
            })?;
        options.values.insert(key, literal);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_scheme_path_and_options() {
        let url = SinkUrl::parse("text://out.txt?desc=False").unwrap();
        assert_eq!(url.scheme, "text");
        assert_eq!(url.path, "out.txt");
        assert_eq!(url.options.get("desc"), Some(&OptionValue::Bool(false)));
        assert_eq!(url.options.len(), 1);
    }

    #[test]
    fn bare_path_has_empty_scheme() {
        let url = SinkUrl::parse("m5out/stats.txt").unwrap();
        assert_eq!(url.scheme, "");
        assert_eq!(url.path, "m5out/stats.txt");
        assert!(url.options.is_empty());

        let quoted = SinkUrl::parse("stats.txt?x='a://b'").unwrap();
        assert_eq!(quoted.scheme, "");
        assert_eq!(quoted.path, "stats.txt");
        assert_eq!(
            quoted.options.get("x"),
            Some(&OptionValue::Str("a://b".to_string()))
        );

        let empty = SinkUrl::parse("").unwrap();
        assert_eq!(empty.scheme, "");
        assert_eq!(empty.path, "");
    }

    #[test]
    fn slashes_after_scheme_are_optional() {
        let url = SinkUrl::parse("TEXT:out.txt?desc=True").unwrap();
        assert_eq!(url.scheme, "text");
        assert_eq!(url.path, "out.txt");
        assert_eq!(url.options.get("desc"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn semicolons_separate_options() {
        let url = SinkUrl::parse("h5://stats.h5?chunking=4;desc=True&formulas=False").unwrap();
        let keys: Vec<&str> = url.options.values.keys().map(String::as_str).collect();
        assert_eq!(keys, ["chunking", "desc", "formulas"]);
        assert_eq!(url.options.get("chunking"), Some(&OptionValue::Int(4)));
    }

    #[test]
    fn literals() {
        assert_eq!(OptionValue::parse_literal("12"), Some(OptionValue::Int(12)));
        assert_eq!(OptionValue::parse_literal("-3"), Some(OptionValue::Int(-3)));
        assert_eq!(OptionValue::parse_literal("0.5"), Some(OptionValue::Float(0.5)));
        assert_eq!(OptionValue::parse_literal("1e3"), Some(OptionValue::Float(1000.0)));
        assert_eq!(
            OptionValue::parse_literal("'abc'"),
            Some(OptionValue::Str("abc".to_string()))
        );
        assert_eq!(OptionValue::parse_literal("0x10"), Some(OptionValue::Int(16)));
        assert_eq!(OptionValue::parse_literal("-0b101"), Some(OptionValue::Int(-5)));
        assert_eq!(OptionValue::parse_literal("1_000"), Some(OptionValue::Int(1000)));
        assert_eq!(OptionValue::parse_literal("0"), Some(OptionValue::Int(0)));
        assert_eq!(OptionValue::parse_literal("1_000.5"), Some(OptionValue::Float(1000.5)));
        assert_eq!(OptionValue::parse_literal("010"), None);
        assert_eq!(OptionValue::parse_literal("1__0"), None);
        assert_eq!(OptionValue::parse_literal("true"), None);
        assert_eq!(OptionValue::parse_literal("False"), Some(OptionValue::Bool(false)));
        assert_eq!(OptionValue::parse_literal("abc"), None);
        assert_eq!(OptionValue::parse_literal("inf"), None);
        assert_eq!(OptionValue::parse_literal("'"), None);
    }

    #[test]
    fn option_errors_name_the_key() {
        let err = SinkUrl::parse("text://a?desc").unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue { ref key, .. } if key == "desc"));
        assert!(err.to_string().starts_with("text://a?desc"));

        let err = SinkUrl::parse("text://a?desc=True;desc=False").unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateValue { ref key, .. } if key == "desc"));

        let err = SinkUrl::parse("text://a?desc=maybe").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLiteral { ref value, .. } if value == "maybe"));
    }

    #[test]
    fn typed_take() {
        let mut options = SinkUrl::parse("x://p?desc=1;chunking=-2").unwrap().options;
        assert!(matches!(
            options.take_bool("desc", true),
            Err(ConfigError::InvalidOptionType { .. })
        ));
        assert!(options.take_unsigned("chunking", 10).is_err());
        assert_eq!(options.take_unsigned("missing", 10).unwrap(), 10);
        options.finish().unwrap();
    }

    #[test]
    fn leftovers_are_unknown() {
        let mut options = SinkUrl::parse("text://a?desc=True;colour=1").unwrap().options;
        assert!(options.take_bool("desc", false).unwrap());
        let err = options.finish().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption { ref key, .. } if key == "colour"));
    }
}
