//! `resolv.conf` rendering.

use std::fmt::Display;

use crate::config::{Content, ResolvConf, ResolverConfig};

/// Renders validated settings into file content.
///
/// Output layout:
///
/// ```text
/// # WARNING: This file is managed by <tool>.
/// nameserver 127.0.0.1
/// nameserver 8.8.8.8
///
/// search example.com lan.example.com
///
/// sortlist 10.0.0.0/255.0.0.0
///
/// options attempts:2 ndots:3 rotate
/// ```
///
/// Absent sections are omitted along with their separating blank line.
#[derive(Debug, Clone)]
pub struct Renderer {
    tool: String,
}

impl Renderer {
    /// Creates a renderer whose banner names `tool`.
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    /// Returns the tool named in the banner.
    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Returns the banner line, without a newline.
    #[must_use]
    pub fn banner(&self) -> String {
        format!("# WARNING: This file is managed by {}.", self.tool)
    }

    /// Renders structured settings.
    #[must_use]
    pub fn render(&self, config: &ResolverConfig) -> String {
        let mut sections: Vec<String> = Vec::new();

        if !config.nameservers.is_empty() {
            sections.push(
                config
                    .nameservers
                    .iter()
                    .map(|ns| format!("nameserver {ns}\n"))
                    .collect(),
            );
        }

        if let Some(domain) = &config.domain {
            sections.push(format!("domain {domain}\n"));
        }

        if !config.search.is_empty() {
            sections.push(line("search", &config.search));
        }

        if !config.sortlist.is_empty() {
            sections.push(line("sortlist", &config.sortlist));
        }

        let options = config.options.tokens();
        if !options.is_empty() {
            sections.push(line("options", &options));
        }

        let mut out = self.banner();
        out.push('\n');
        out.push_str(&sections.join("\n"));
        out
    }

    /// Returns the file content for `conf`: rendered, or verbatim as supplied.
    #[must_use]
    pub fn content(&self, conf: &ResolvConf) -> String {
        match &conf.content {
            Content::Structured(config) => self.render(config),
            Content::Verbatim(text) => text.clone(),
        }
    }
}

fn line<T: Display>(keyword: &str, items: &[T]) -> String {
    let words: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("{keyword} {}\n", words.join(" "))
}
