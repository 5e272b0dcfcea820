//! Parameter validation.
//!
//! Every check runs on every call; failures are collected rather than
//! returned at the first one, so a caller sees all problems at once.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use serde_json::Value;

use crate::config::{
    ATTEMPTS_RANGE, Content, DEFAULT_PATH, DomainName, MAX_NAMESERVERS, MAX_SEARCH, MAX_SORTLIST,
    NDOTS_RANGE, Nameserver, ResolvConf, ResolverConfig, ResolverOptions, SortlistEntry, TIMEOUT_RANGE,
};
use crate::error::{ErrorKind, ValidationError, ValidationErrors};
use crate::params::ResolverParams;

/// Checks `params` and returns the validated desired state.
///
/// When `content` is a string the structured fields are ignored and the
/// result is [`Content::Verbatim`]; only `path` is still checked.
///
/// # Errors
///
/// Returns every failed check. Nothing is rendered or written in that case.
///
/// # Example
///
/// ```
/// use resolvconf_manager::{ErrorKind, ResolverParams, validate};
///
/// let params = ResolverParams::new()
///     .with_domain("example.com")
///     .with_search(["example.com"]);
///
/// let errors = validate(&params).unwrap_err();
/// assert!(errors.has_kind(ErrorKind::MutualExclusion));
/// ```
pub fn validate(params: &ResolverParams) -> Result<ResolvConf, ValidationErrors> {
    let mut v = Validator::default();

    let path = v.path(&params.path);

    let content = match &params.content {
        Value::String(text) => Some(Content::Verbatim(text.clone())),
        Value::Null => None,
        other => {
            v.push("content", other, ErrorKind::Shape, "must be a string");
            None
        }
    };

    let content = match content {
        Some(verbatim) => verbatim,
        None => Content::Structured(v.structured(params)),
    };

    match ValidationErrors::from_vec(v.errors) {
        Some(errors) => {
            tracing::warn!(count = errors.len(), "Rejected resolver parameters");
            Err(errors)
        }
        None => {
            tracing::debug!(
                path = %path.display(),
                verbatim = matches!(content, Content::Verbatim(_)),
                "Validated resolver parameters"
            );
            Ok(ResolvConf { path, content })
        }
    }
}

#[derive(Default)]
struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    fn push(&mut self, field: &'static str, value: &Value, kind: ErrorKind, reason: impl Into<String>) {
        self.errors.push(ValidationError::new(field, value, kind, reason));
    }

    fn structured(&mut self, params: &ResolverParams) -> ResolverConfig {
        let nameservers = self.list("nameserver", &params.nameserver, MAX_NAMESERVERS, |s| {
            s.parse::<Nameserver>()
                .map_err(|_| "is not a valid IP address".to_string())
        });
        let search = self.list("search", &params.search, MAX_SEARCH, |s| {
            s.parse::<DomainName>().map_err(|e| e.to_string())
        });
        let sortlist = self.list("sortlist", &params.sortlist, MAX_SORTLIST, |s| {
            s.parse::<SortlistEntry>().map_err(|e| e.to_string())
        });
        let domain = self.domain(&params.domain);

        if is_present(&params.domain) && is_present(&params.search) {
            self.push(
                "domain",
                &params.domain,
                ErrorKind::MutualExclusion,
                "cannot be combined with search",
            );
        }

        let options = ResolverOptions {
            ndots: self.number("ndots", &params.ndots, NDOTS_RANGE),
            timeout: self.number("timeout", &params.timeout, TIMEOUT_RANGE),
            attempts: self.number("attempts", &params.attempts, ATTEMPTS_RANGE),
            rotate: self.flag("rotate", &params.rotate),
            no_check_names: self.flag("no_check_names", &params.no_check_names),
            inet6: self.flag("inet6", &params.inet6),
            ip6_bytestring: self.flag("ip6_bytestring", &params.ip6_bytestring),
            ip6_dotint: self.flag("ip6_dotint", &params.ip6_dotint),
            edns0: self.flag("edns0", &params.edns0),
        };

        ResolverConfig {
            nameservers,
            domain,
            search,
            sortlist,
            options,
        }
    }

    fn path(&mut self, value: &Value) -> PathBuf {
        match value {
            Value::Null => PathBuf::from(DEFAULT_PATH),
            Value::String(path) => PathBuf::from(path),
            other => {
                self.push("path", other, ErrorKind::Shape, "must be a string");
                PathBuf::from(DEFAULT_PATH)
            }
        }
    }

    fn list<T>(
        &mut self,
        field: &'static str,
        value: &Value,
        max: usize,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Vec<T> {
        let items = match value {
            Value::Null => return Vec::new(),
            Value::Array(items) => items,
            other => {
                self.push(field, other, ErrorKind::Shape, "must be a list");
                return Vec::new();
            }
        };

        if items.len() > max {
            self.push(
                field,
                value,
                ErrorKind::Cardinality,
                format!("exceeds maximum count of {max}"),
            );
        }

        let mut parsed = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(s) => match parse(s) {
                    Ok(t) => parsed.push(t),
                    Err(reason) => self.push(field, item, ErrorKind::Format, reason),
                },
                other => self.push(field, other, ErrorKind::Shape, "must be a string"),
            }
        }
        parsed
    }

    fn domain(&mut self, value: &Value) -> Option<DomainName> {
        match value {
            Value::Null => None,
            Value::String(s) => match DomainName::from_str(s) {
                Ok(name) => Some(name),
                Err(e) => {
                    self.push("domain", value, ErrorKind::Format, e.to_string());
                    None
                }
            },
            other => {
                self.push("domain", other, ErrorKind::Shape, "must be a string");
                None
            }
        }
    }

    fn flag(&mut self, field: &'static str, value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Bool(on) => *on,
            other => {
                self.push(field, other, ErrorKind::Shape, "must be a boolean");
                false
            }
        }
    }

    fn number(&mut self, field: &'static str, value: &Value, range: RangeInclusive<u8>) -> Option<u8> {
        let n = match value {
            Value::Null => return None,
            Value::Number(n) => n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from)),
            Value::String(s) => s.trim().parse::<i128>().ok(),
            _ => None,
        };
        let Some(n) = n else {
            self.push(field, value, ErrorKind::Format, "is not an integer");
            return None;
        };

        match u8::try_from(n) {
            Ok(n) if range.contains(&n) => Some(n),
            _ => {
                self.push(
                    field,
                    value,
                    ErrorKind::Range,
                    format!("is not in range {}-{}", range.start(), range.end()),
                );
                None
            }
        }
    }
}

/// `null` and `[]` both mean "not supplied".
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Flag, NumericOption};
    use serde_json::json;

    fn structured(params: &ResolverParams) -> ResolverConfig {
        match validate(params).unwrap().content {
            Content::Structured(config) => config,
            Content::Verbatim(_) => panic!("expected structured content"),
        }
    }

    fn only_error(params: &ResolverParams) -> ValidationError {
        let errors = validate(params).unwrap_err();
        assert_eq!(errors.len(), 1, "{errors}");
        errors.iter().next().unwrap().clone()
    }

    #[test]
    fn empty_params_are_valid() {
        let conf = validate(&ResolverParams::new()).unwrap();
        assert_eq!(conf.path, PathBuf::from("/etc/resolv.conf"));
        assert_eq!(conf.content, Content::Structured(ResolverConfig::default()));
    }

    #[test]
    fn nameserver_cardinality() {
        let three = ResolverParams::new().with_nameservers(["127.0.0.1", "8.8.8.8", "::1"]);
        assert_eq!(structured(&three).nameservers.len(), 3);

        let four = ResolverParams::new().with_nameservers(["1.1.1.1", "1.0.0.1", "8.8.8.8", "8.8.4.4"]);
        let err = only_error(&four);
        assert_eq!(err.field, "nameserver");
        assert_eq!(err.kind, ErrorKind::Cardinality);
        assert_eq!(err.reason, "exceeds maximum count of 3");
    }

    #[test]
    fn nameserver_format() {
        let params = ResolverParams::new().with_nameservers(["127.0.0.1", "1.2.3", "dns.google"]);
        let errors = validate(&params).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Format));
        assert_eq!(errors.iter().next().unwrap().value, "\"1.2.3\"");
    }

    #[test]
    fn search_cardinality() {
        let domains: Vec<String> = (1..=7).map(|i| format!("d{i}.example")).collect();

        let six = ResolverParams::new().with_search(domains[..6].to_vec());
        assert_eq!(structured(&six).search.len(), 6);

        let seven = ResolverParams::new().with_search(domains);
        assert_eq!(only_error(&seven).kind, ErrorKind::Cardinality);
    }

    #[test]
    fn sortlist_cardinality() {
        let entries: Vec<String> = (1..=11).map(|i| format!("10.0.{i}.0/255.255.255.0")).collect();

        let ten = ResolverParams::new().with_sortlist(entries[..10].to_vec());
        assert_eq!(structured(&ten).sortlist.len(), 10);

        let eleven = ResolverParams::new().with_sortlist(entries);
        assert_eq!(only_error(&eleven).kind, ErrorKind::Cardinality);
    }

    #[test]
    fn sortlist_format() {
        let params = ResolverParams::new().with_sortlist(["1.1.1.1", "bogus/255.0.0.0"]);
        let err = only_error(&params);
        assert_eq!(err.field, "sortlist");
        assert_eq!(err.kind, ErrorKind::Format);
    }

    #[test]
    fn domain_and_search_are_exclusive() {
        let params = ResolverParams::new()
            .with_domain("x.com")
            .with_search(["x.com"]);
        let err = only_error(&params);
        assert_eq!(err.kind, ErrorKind::MutualExclusion);

        // Reported even when the values themselves are invalid.
        let params = ResolverParams::new()
            .with_domain("bad_domain")
            .with_search(["also bad"]);
        let errors = validate(&params).unwrap_err();
        assert!(errors.has_kind(ErrorKind::MutualExclusion));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn empty_search_does_not_conflict_with_domain() {
        let params = ResolverParams::new()
            .with_domain("example.com")
            .with_search(Vec::<String>::new());
        let config = structured(&params);
        assert_eq!(config.domain.unwrap().as_str(), "example.com");
        assert!(config.search.is_empty());
    }

    #[test]
    fn numeric_boundaries() {
        let cases = [
            (NumericOption::Ndots, 1, 15),
            (NumericOption::Timeout, 1, 30),
            (NumericOption::Attempts, 1, 5),
        ];
        for (option, min, max) in cases {
            for ok in [min, max] {
                let params = ResolverParams::new().with_number(option, ok);
                assert!(validate(&params).is_ok(), "{option:?}={ok}");
            }
            for bad in [min - 1, max + 1] {
                let params = ResolverParams::new().with_number(option, bad);
                assert_eq!(only_error(&params).kind, ErrorKind::Range, "{option:?}={bad}");
            }
        }
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let params = ResolverParams::new()
            .with_number(NumericOption::Ndots, "3")
            .with_number(NumericOption::Timeout, " 15 ");
        let options = structured(&params).options;
        assert_eq!(options.ndots, Some(3));
        assert_eq!(options.timeout, Some(15));
    }

    #[test]
    fn non_integers_are_format_errors() {
        for value in [json!("three"), json!(1.5), json!(true), json!([3])] {
            let params = ResolverParams::new().with_number(NumericOption::Attempts, value.clone());
            let err = only_error(&params);
            assert_eq!(err.kind, ErrorKind::Format, "{value}");
            assert_eq!(err.reason, "is not an integer");
        }
    }

    #[test]
    fn huge_and_negative_numbers_are_range_errors() {
        for value in [json!(-1), json!(300), json!(u64::MAX)] {
            let params = ResolverParams::new().with_number(NumericOption::Ndots, value.clone());
            let err = only_error(&params);
            assert_eq!(err.kind, ErrorKind::Range, "{value}");
        }
    }

    #[test]
    fn flags_must_be_booleans() {
        let mut params = ResolverParams::new().with_flag(Flag::Rotate, true);
        params.edns0 = json!("true");
        params.inet6 = json!(["yes"]);

        let errors = validate(&params).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Shape));
        assert!(errors.has_field("edns0"));
        assert!(errors.has_field("inet6"));
    }

    #[test]
    fn scalar_where_list_expected() {
        let mut params = ResolverParams::new();
        params.nameserver = json!("127.0.0.1");
        let err = only_error(&params);
        assert_eq!(err.kind, ErrorKind::Shape);
        assert_eq!(err.reason, "must be a list");
    }

    #[test]
    fn collects_every_error() {
        let mut params = ResolverParams::new()
            .with_nameservers(["nope"])
            .with_number(NumericOption::Timeout, 0)
            .with_number(NumericOption::Ndots, "x");
        params.rotate = json!(1);
        params.path = json!(42);

        let errors = validate(&params).unwrap_err();
        for field in ["nameserver", "timeout", "ndots", "rotate", "path"] {
            assert!(errors.has_field(field), "{field}");
        }
    }

    #[test]
    fn verbatim_skips_structured_checks() {
        let mut params = ResolverParams::new()
            .with_nameservers(["not an address"])
            .with_content("nameserver 9.9.9.9\n")
            .with_path("/tmp/resolv.conf");
        params.rotate = json!("yes");

        let conf = validate(&params).unwrap();
        assert_eq!(conf.path, PathBuf::from("/tmp/resolv.conf"));
        assert_eq!(conf.content, Content::Verbatim("nameserver 9.9.9.9\n".to_string()));
    }

    #[test]
    fn verbatim_still_checks_path() {
        let mut params = ResolverParams::new().with_content("x");
        params.path = json!(["a"]);
        assert_eq!(only_error(&params).field, "path");
    }

    #[test]
    fn content_must_be_a_string() {
        let mut params = ResolverParams::new();
        params.content = json!({"nameserver": "1.1.1.1"});
        let err = only_error(&params);
        assert_eq!(err.field, "content");
        assert_eq!(err.kind, ErrorKind::Shape);
    }
}
