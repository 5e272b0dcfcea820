//! Raw, caller-supplied parameters.
//!
//! Fields are kept as untyped JSON values so that validation can tell a
//! wrong-shaped value (a list where a flag was expected) apart from a
//! malformed one.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// Unvalidated parameter set, as a configuration run supplies it.
///
/// Every field is `null` when absent. Use [`validate`](crate::validate) to
/// turn it into a [`ResolvConf`](crate::ResolvConf).
///
/// # Example
///
/// ```
/// use resolvconf_manager::ResolverParams;
///
/// let params = ResolverParams::from_json(
///     r#"{"nameserver": ["127.0.0.1"], "search": ["example.com"], "ndots": "2"}"#,
/// ).unwrap();
/// assert_eq!(params.ndots, "2");
/// assert!(params.domain.is_null());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverParams {
    pub nameserver: Value,
    pub domain: Value,
    pub search: Value,
    pub sortlist: Value,
    pub ndots: Value,
    pub timeout: Value,
    pub attempts: Value,
    pub rotate: Value,
    pub no_check_names: Value,
    pub inet6: Value,
    pub ip6_bytestring: Value,
    pub ip6_dotint: Value,
    pub edns0: Value,
    pub path: Value,
    pub content: Value,
}

/// Numeric entries of the `options` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOption {
    Ndots,
    Timeout,
    Attempts,
}

/// Boolean entries of the `options` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Rotate,
    NoCheckNames,
    Inet6,
    Ip6Bytestring,
    Ip6Dotint,
    Edns0,
}

impl ResolverParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Params`](crate::ResolverError::Params) if the
    /// input is not a JSON object or names an unknown parameter.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Sets the name server list.
    #[must_use]
    pub fn with_nameservers<S: Into<String>>(mut self, servers: impl IntoIterator<Item = S>) -> Self {
        self.nameserver = string_list(servers);
        self
    }

    /// Sets the local domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Value::String(domain.into());
        self
    }

    /// Sets the search list.
    #[must_use]
    pub fn with_search<S: Into<String>>(mut self, domains: impl IntoIterator<Item = S>) -> Self {
        self.search = string_list(domains);
        self
    }

    /// Sets the sortlist.
    #[must_use]
    pub fn with_sortlist<S: Into<String>>(mut self, entries: impl IntoIterator<Item = S>) -> Self {
        self.sortlist = string_list(entries);
        self
    }

    /// Sets a numeric option.
    #[must_use]
    pub fn with_number(mut self, option: NumericOption, value: impl Into<Value>) -> Self {
        let slot = match option {
            NumericOption::Ndots => &mut self.ndots,
            NumericOption::Timeout => &mut self.timeout,
            NumericOption::Attempts => &mut self.attempts,
        };
        *slot = value.into();
        self
    }

    /// Sets a boolean option.
    #[must_use]
    pub fn with_flag(mut self, flag: Flag, on: bool) -> Self {
        let slot = match flag {
            Flag::Rotate => &mut self.rotate,
            Flag::NoCheckNames => &mut self.no_check_names,
            Flag::Inet6 => &mut self.inet6,
            Flag::Ip6Bytestring => &mut self.ip6_bytestring,
            Flag::Ip6Dotint => &mut self.ip6_dotint,
            Flag::Edns0 => &mut self.edns0,
        };
        *slot = Value::Bool(on);
        self
    }

    /// Overrides the target path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Value::String(path.into());
        self
    }

    /// Supplies the file content verbatim, bypassing everything else.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Value::String(content.into());
        self
    }
}

fn string_list<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Value {
    Value::Array(items.into_iter().map(|s| Value::String(s.into())).collect())
}
