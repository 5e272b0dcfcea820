//! # resolvconf-manager
//!
//! Validate resolver parameters and render a managed `/etc/resolv.conf`.
//!
//! A configuration run supplies a [`ResolverParams`] set (name servers,
//! `domain` or `search`, `sortlist`, and `options` values). [`validate`]
//! checks every field at once and returns either the typed desired state or
//! the complete list of problems. [`Renderer`] turns the typed state into the
//! exact file text, and a [`FileSink`] puts it on disk.
//!
//! ## Quick start
//!
//! ```rust
//! use resolvconf_manager::{Renderer, ResolverParams, validate};
//!
//! let params = ResolverParams::from_json(r#"{
//!     "nameserver": ["127.0.0.1", "8.8.8.8"],
//!     "search": ["puppetlabs.com", "lan.puppetlabs.com"],
//!     "ndots": 3,
//!     "rotate": true
//! }"#).unwrap();
//!
//! let conf = validate(&params).unwrap();
//! let text = Renderer::new("myapp").content(&conf);
//!
//! assert_eq!(text, "\
//! ## WARNING: This file is managed by myapp.
//! nameserver 127.0.0.1
//! nameserver 8.8.8.8
//!
//! search puppetlabs.com lan.puppetlabs.com
//!
//! options ndots:3 rotate
//! ");
//! ```
//!
//! ## Writing the file
//!
//! [`ResolvConfManager`] ties the steps together and writes atomically; an
//! unchanged file is left alone:
//!
//! ```rust,ignore
//! use resolvconf_manager::{ResolvConfManager, WriteOutcome};
//!
//! let manager = ResolvConfManager::new("myapp");
//! if manager.apply(&params)? == WriteOutcome::Unchanged {
//!     // nothing to do
//! }
//! ```
//!
//! ## Verbatim content
//!
//! A string `content` parameter replaces the rendered file entirely. No
//! banner is added and the structured fields are not checked.
//!
//! ## Permissions
//!
//! Writing `/etc/resolv.conf` requires root. The caller is responsible for
//! privilege elevation.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod params;
pub mod render;
pub mod validate;
pub mod writer;

pub use config::{
    Content, DEFAULT_PATH, DomainName, DomainNameError, Nameserver, ResolvConf, ResolverConfig,
    ResolverOptions, SortlistEntry, SortlistError,
};
pub use error::{ErrorKind, ResolverError, Result, ValidationError, ValidationErrors};
pub use params::{Flag, NumericOption, ResolverParams};
pub use render::Renderer;
pub use validate::validate;
pub use writer::{AtomicFileSink, FileSink, ResolvConfManager, WriteOutcome};
