//! Validated resolver configuration.

use std::fmt;
use std::net::{AddrParseError, IpAddr};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default location of the resolver configuration file.
pub const DEFAULT_PATH: &str = "/etc/resolv.conf";

/// The resolver reads at most this many `nameserver` lines.
pub const MAX_NAMESERVERS: usize = 3;

/// Maximum number of domains on the `search` line.
pub const MAX_SEARCH: usize = 6;

/// Maximum number of `sortlist` entries.
pub const MAX_SORTLIST: usize = 10;

/// Accepted values for `options ndots:n`.
pub const NDOTS_RANGE: RangeInclusive<u8> = 1..=15;

/// Accepted values for `options timeout:n`.
pub const TIMEOUT_RANGE: RangeInclusive<u8> = 1..=30;

/// Accepted values for `options attempts:n`.
pub const ATTEMPTS_RANGE: RangeInclusive<u8> = 1..=5;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A syntactically valid DNS domain name.
///
/// Labels are ASCII alphanumerics and hyphens, which also covers
/// internationalized names in their `xn--` form. A single trailing dot is
/// allowed and kept.
///
/// ```
/// use resolvconf_manager::DomainName;
///
/// let name: DomainName = "lan.example.com.".parse().unwrap();
/// assert_eq!(name.as_str(), "lan.example.com.");
/// assert!("-bad.example".parse::<DomainName>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName(String);

impl DomainName {
    /// Returns the name as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reason a string is not a domain name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainNameError {
    /// The name, or one of its labels, is empty.
    EmptyLabel,
    /// The name exceeds 253 characters.
    TooLong,
    /// A label exceeds 63 characters.
    LabelTooLong,
    /// A label contains something other than alphanumerics and hyphens.
    InvalidCharacter,
    /// A label starts or ends with a hyphen.
    HyphenAtEdge,
}

impl fmt::Display for DomainNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EmptyLabel => "contains an empty label",
            Self::TooLong => "is longer than 253 characters",
            Self::LabelTooLong => "has a label longer than 63 characters",
            Self::InvalidCharacter => "has a label with characters other than letters, digits and hyphens",
            Self::HyphenAtEdge => "has a label starting or ending with a hyphen",
        })
    }
}

impl FromStr for DomainName {
    type Err = DomainNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_suffix('.').unwrap_or(s);
        if name.len() > MAX_NAME_LEN {
            return Err(DomainNameError::TooLong);
        }
        for label in name.split('.') {
            if label.is_empty() {
                return Err(DomainNameError::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DomainNameError::LabelTooLong);
            }
            if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
                return Err(DomainNameError::InvalidCharacter);
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(DomainNameError::HyphenAtEdge);
            }
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A name server address, kept in the form the caller wrote it.
///
/// ```
/// use resolvconf_manager::Nameserver;
///
/// let ns: Nameserver = "2001:4860:4860:0:0:0:0:8888".parse().unwrap();
/// assert!(ns.addr().is_ipv6());
/// assert_eq!(ns.to_string(), "2001:4860:4860:0:0:0:0:8888");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nameserver {
    addr: IpAddr,
    text: String,
}

impl Nameserver {
    /// Returns the parsed address.
    #[must_use]
    pub const fn addr(&self) -> IpAddr {
        self.addr
    }

    /// Returns the address as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for Nameserver {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            addr: s.parse()?,
            text: s.to_string(),
        })
    }
}

impl From<IpAddr> for Nameserver {
    fn from(addr: IpAddr) -> Self {
        Self {
            addr,
            text: addr.to_string(),
        }
    }
}

impl fmt::Display for Nameserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One `sortlist` entry: an address with an optional netmask.
///
/// The entry renders exactly as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortlistEntry {
    /// Network address.
    pub address: IpAddr,
    /// Netmask text as supplied after the `/`, either a dotted mask or a
    /// prefix length.
    pub netmask: Option<String>,
    text: String,
}

impl SortlistEntry {
    /// Returns the entry as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Reason a string is not a sortlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortlistError {
    /// More than one `/` separator.
    ExtraSeparator,
    /// The address part is not an IP address.
    InvalidAddress,
    /// The netmask part is empty or neither a mask nor a prefix length.
    InvalidNetmask,
}

impl fmt::Display for SortlistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExtraSeparator => "has more than one '/' separator",
            Self::InvalidAddress => "does not start with a valid IP address",
            Self::InvalidNetmask => "has an invalid netmask",
        })
    }
}

impl FromStr for SortlistEntry {
    type Err = SortlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, '/');
        let address: IpAddr = parts
            .next()
            .unwrap_or_default()
            .parse()
            .map_err(|_| SortlistError::InvalidAddress)?;

        let netmask = match parts.next() {
            None => None,
            Some(mask) if mask.contains('/') => return Err(SortlistError::ExtraSeparator),
            Some(mask) if is_valid_netmask(address, mask) => Some(mask.to_string()),
            Some(_) => return Err(SortlistError::InvalidNetmask),
        };

        Ok(Self {
            address,
            netmask,
            text: s.to_string(),
        })
    }
}

fn is_valid_netmask(address: IpAddr, mask: &str) -> bool {
    if let Ok(prefix) = mask.parse::<u8>() {
        let max = if address.is_ipv4() { 32 } else { 128 };
        return prefix <= max;
    }
    mask.parse::<IpAddr>()
        .is_ok_and(|m| m.is_ipv4() == address.is_ipv4())
}

impl fmt::Display for SortlistEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Values for the `options` line.
///
/// Numeric options are `None` when unset; flags default to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ResolverOptions {
    /// Dots a name needs before it is tried as absolute first.
    pub ndots: Option<u8>,
    /// Seconds to wait for a name server reply.
    pub timeout: Option<u8>,
    /// Rounds of queries before giving up.
    pub attempts: Option<u8>,
    /// Round-robin across name servers.
    pub rotate: bool,
    /// Skip host-name character checks.
    pub no_check_names: bool,
    /// Query AAAA before A.
    pub inet6: bool,
    /// Bit-label format for IPv6 reverse lookups.
    pub ip6_bytestring: bool,
    /// Reverse IPv6 lookups under `ip6.int`.
    pub ip6_dotint: bool,
    /// Enable EDNS0 extensions.
    pub edns0: bool,
}

impl ResolverOptions {
    /// Returns the active option tokens in lexicographic order.
    ///
    /// ```
    /// use resolvconf_manager::ResolverOptions;
    ///
    /// let opts = ResolverOptions { ndots: Some(3), inet6: true, ..Default::default() };
    /// assert_eq!(opts.tokens(), ["inet6", "ndots:3"]);
    /// ```
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        let numeric = [
            ("ndots", self.ndots),
            ("timeout", self.timeout),
            ("attempts", self.attempts),
        ];
        let flags = [
            ("rotate", self.rotate),
            ("no-check-names", self.no_check_names),
            ("inet6", self.inet6),
            ("ip6-bytestring", self.ip6_bytestring),
            ("ip6-dotint", self.ip6_dotint),
            ("edns0", self.edns0),
        ];

        let mut tokens: Vec<String> = numeric
            .into_iter()
            .filter_map(|(name, value)| value.map(|n| format!("{name}:{n}")))
            .chain(
                flags
                    .into_iter()
                    .filter(|&(_, on)| on)
                    .map(|(name, _)| name.to_string()),
            )
            .collect();
        tokens.sort();
        tokens
    }

    /// Returns `true` if no option is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Structured resolver settings that passed validation.
///
/// # Example
///
/// ```
/// use resolvconf_manager::ResolverConfig;
///
/// let config = ResolverConfig::new()
///     .with_nameserver("127.0.0.1".parse().unwrap())
///     .with_search(vec!["example.com".parse().unwrap()]);
///
/// assert_eq!(config.nameservers.len(), 1);
/// assert!(config.domain.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Name servers, queried in order.
    pub nameservers: Vec<Nameserver>,

    /// Local domain name. Never set together with `search`.
    pub domain: Option<DomainName>,

    /// Search list for host-name lookup.
    pub search: Vec<DomainName>,

    /// Address preference list.
    pub sortlist: Vec<SortlistEntry>,

    /// Tuning options.
    pub options: ResolverOptions,
}

impl ResolverConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a name server.
    #[must_use]
    pub fn with_nameserver(mut self, ns: Nameserver) -> Self {
        self.nameservers.push(ns);
        self
    }

    /// Sets the local domain.
    #[must_use]
    pub fn with_domain(mut self, domain: DomainName) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Replaces the search list.
    #[must_use]
    pub fn with_search(mut self, search: Vec<DomainName>) -> Self {
        self.search = search;
        self
    }

    /// Replaces the sortlist.
    #[must_use]
    pub fn with_sortlist(mut self, sortlist: Vec<SortlistEntry>) -> Self {
        self.sortlist = sortlist;
        self
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }
}

/// What ends up in the managed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Rendered from validated settings.
    Structured(ResolverConfig),
    /// Written unchanged, without the warning banner.
    Verbatim(String),
}

/// Validated desired state: a target path and its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvConf {
    /// Target file.
    pub path: PathBuf,
    /// What to write there.
    pub content: Content,
}

impl ResolvConf {
    /// Targets [`DEFAULT_PATH`].
    #[must_use]
    pub fn new(content: Content) -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            content,
        }
    }

    /// Overrides the target path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Returns the target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_names() {
        for ok in [
            "example.com",
            "example.com.",
            "lan",
            "a-b.c0m",
            "xn--bcher-kva.example",
            "1.2.3.in-addr.arpa",
        ] {
            assert!(ok.parse::<DomainName>().is_ok(), "{ok}");
        }

        assert_eq!("".parse::<DomainName>(), Err(DomainNameError::EmptyLabel));
        assert_eq!(".".parse::<DomainName>(), Err(DomainNameError::EmptyLabel));
        assert_eq!("a..b".parse::<DomainName>(), Err(DomainNameError::EmptyLabel));
        assert_eq!("a_b.com".parse::<DomainName>(), Err(DomainNameError::InvalidCharacter));
        assert_eq!("ex ample.com".parse::<DomainName>(), Err(DomainNameError::InvalidCharacter));
        assert_eq!("-a.com".parse::<DomainName>(), Err(DomainNameError::HyphenAtEdge));
        assert_eq!("a-.com".parse::<DomainName>(), Err(DomainNameError::HyphenAtEdge));
        assert_eq!(
            format!("{}.com", "a".repeat(64)).parse::<DomainName>(),
            Err(DomainNameError::LabelTooLong)
        );
        assert_eq!(
            vec!["abcdefghi"; 26].join(".").parse::<DomainName>(),
            Err(DomainNameError::TooLong)
        );
    }

    #[test]
    fn sortlist_entries() {
        let plain: SortlistEntry = "130.155.160.0".parse().unwrap();
        assert!(plain.netmask.is_none());
        assert_eq!(plain.to_string(), "130.155.160.0");

        let masked: SortlistEntry = "130.155.160.0/255.255.240.0".parse().unwrap();
        assert_eq!(masked.netmask.as_deref(), Some("255.255.240.0"));
        assert_eq!(masked.to_string(), "130.155.160.0/255.255.240.0");

        let upper: SortlistEntry = "2001:0DB8:0000::1/64".parse().unwrap();
        assert_eq!(upper.address, "2001:db8::1".parse::<IpAddr>().unwrap());
        assert_eq!(upper.to_string(), "2001:0DB8:0000::1/64");
        assert_eq!(upper.as_str(), "2001:0DB8:0000::1/64");

        assert!("10.0.0.0/8".parse::<SortlistEntry>().is_ok());
        assert!("2001:db8::/32".parse::<SortlistEntry>().is_ok());

        assert_eq!("nope/8".parse::<SortlistEntry>(), Err(SortlistError::InvalidAddress));
        assert_eq!("10.0.0.0/".parse::<SortlistEntry>(), Err(SortlistError::InvalidNetmask));
        assert_eq!("10.0.0.0/33".parse::<SortlistEntry>(), Err(SortlistError::InvalidNetmask));
        assert_eq!("10.0.0.0/ffff::".parse::<SortlistEntry>(), Err(SortlistError::InvalidNetmask));
        assert_eq!("10.0.0.0/8/8".parse::<SortlistEntry>(), Err(SortlistError::ExtraSeparator));
    }

    #[test]
    fn nameserver_keeps_supplied_text() {
        let ns: Nameserver = "FE80::1".parse().unwrap();
        assert_eq!(ns.addr(), "fe80::1".parse::<IpAddr>().unwrap());
        assert_eq!(ns.as_str(), "FE80::1");
        assert_eq!(ns.to_string(), "FE80::1");

        assert!("1.2.3".parse::<Nameserver>().is_err());
        assert!(" 1.1.1.1".parse::<Nameserver>().is_err());
    }

    #[test]
    fn nameserver_from_addr_uses_canonical_text() {
        let ns = Nameserver::from("2001:db8:0:0::1".parse::<IpAddr>().unwrap());
        assert_eq!(ns.as_str(), "2001:db8::1");
    }

    #[test]
    fn option_tokens_sorted_across_kinds() {
        let opts = ResolverOptions {
            ndots: Some(3),
            timeout: Some(15),
            attempts: Some(5),
            rotate: true,
            edns0: true,
            ..Default::default()
        };
        assert_eq!(
            opts.tokens(),
            ["attempts:5", "edns0", "ndots:3", "rotate", "timeout:15"]
        );
    }

    #[test]
    fn empty_options() {
        assert!(ResolverOptions::default().is_empty());
        assert!(ResolverOptions::default().tokens().is_empty());
        assert!(!ResolverOptions { inet6: true, ..Default::default() }.is_empty());
    }

    #[test]
    fn resolv_conf_defaults_to_etc() {
        let conf = ResolvConf::new(Content::Verbatim(String::new()));
        assert_eq!(conf.path(), Path::new("/etc/resolv.conf"));
        assert_eq!(conf.with_path("/tmp/x").path(), Path::new("/tmp/x"));
    }
}
