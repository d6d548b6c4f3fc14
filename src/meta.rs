//! Page context resolution.
//!
//! A [`MetaInput`] is the loosely-filled page description handed over by the
//! caller. [`resolve_meta`] turns it into a [`ResolvedMeta`], the immutable
//! context every resolver reads inherited defaults and id prefixes from.

use serde::{Deserialize, Serialize};

use crate::util::{join_url, with_trailing_slash, without_trailing_slash};

/// Partial page meta as supplied by the caller.
///
/// Legacy aliases (`canonicalHost`, `canonicalUrl`, `defaultCurrency`,
/// `defaultLanguage`) are only consulted when the canonical field is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaInput {
    /// Site origin, e.g. `https://example.com/`.
    pub host: Option<String>,
    /// Legacy alias of `host`.
    pub canonical_host: Option<String>,
    /// Page path, e.g. `/blog/post`.
    pub path: Option<String>,
    /// Caller-supplied page url. Recomputed from host and path.
    pub url: Option<String>,
    /// Legacy alias of `url`.
    pub canonical_url: Option<String>,
    /// Page language (BCP 47).
    pub in_language: Option<String>,
    /// Legacy alias of `in_language`.
    pub default_language: Option<String>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
    /// Legacy alias of `currency`.
    pub default_currency: Option<String>,
    /// Page title.
    pub title: Option<String>,
    /// Page description.
    pub description: Option<String>,
    /// Primary page image.
    pub image: Option<String>,
    /// Publication date.
    pub date_published: Option<String>,
    /// Last modification date.
    pub date_modified: Option<String>,
    /// Whether page paths carry a trailing slash.
    pub trailing_slash: bool,
}

impl MetaInput {
    /// Creates meta for a host with every other field empty.
    #[must_use]
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Sets the page path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the page title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the page description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the page language.
    #[must_use]
    pub fn in_language(mut self, language: impl Into<String>) -> Self {
        self.in_language = Some(language.into());
        self
    }

    /// Sets the currency.
    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

/// Normalized page context, immutable for one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMeta {
    /// Site origin.
    pub host: Option<String>,
    /// `join(host, path)`.
    pub url: Option<String>,
    /// Normalized page path, never empty.
    pub path: String,
    /// Page language.
    pub in_language: Option<String>,
    /// Currency code.
    pub currency: Option<String>,
    /// Page title.
    pub title: Option<String>,
    /// Page description.
    pub description: Option<String>,
    /// Primary page image.
    pub image: Option<String>,
    /// Publication date.
    pub date_published: Option<String>,
    /// Last modification date.
    pub date_modified: Option<String>,
    /// Trailing slash policy the path was normalized with.
    pub trailing_slash: bool,
}

/// Named field of [`ResolvedMeta`], used by resolver id prefixes and
/// inheritance lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetaField {
    /// `host`
    Host,
    /// `url`
    Url,
    /// `path`
    Path,
    /// `inLanguage`
    InLanguage,
    /// `currency`
    Currency,
    /// `title`
    Title,
    /// `description`
    Description,
    /// `image`
    Image,
    /// `datePublished`
    DatePublished,
    /// `dateModified`
    DateModified,
}

impl MetaField {
    /// The JSON key this field is exposed under, which is also the node key
    /// used when a resolver inherits it without renaming.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Url => "url",
            Self::Path => "path",
            Self::InLanguage => "inLanguage",
            Self::Currency => "currency",
            Self::Title => "title",
            Self::Description => "description",
            Self::Image => "image",
            Self::DatePublished => "datePublished",
            Self::DateModified => "dateModified",
        }
    }
}

impl ResolvedMeta {
    /// Reads a context field by name.
    #[must_use]
    pub fn get(&self, field: MetaField) -> Option<&str> {
        match field {
            MetaField::Host => self.host.as_deref(),
            MetaField::Url => self.url.as_deref(),
            MetaField::Path => Some(self.path.as_str()),
            MetaField::InLanguage => self.in_language.as_deref(),
            MetaField::Currency => self.currency.as_deref(),
            MetaField::Title => self.title.as_deref(),
            MetaField::Description => self.description.as_deref(),
            MetaField::Image => self.image.as_deref(),
            MetaField::DatePublished => self.date_published.as_deref(),
            MetaField::DateModified => self.date_modified.as_deref(),
        }
    }

    /// Reads a context field, treating absence as the empty string.
    #[must_use]
    pub fn get_or_empty(&self, field: MetaField) -> &str {
        self.get(field).unwrap_or("")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolves caller meta into the context used for one graph resolution.
///
/// ```
/// use schemaorg_graph::{resolve_meta, MetaInput};
///
/// let meta = resolve_meta(MetaInput::for_host("https://example.com/").path("/blog/"));
/// assert_eq!(meta.path, "/blog");
/// assert_eq!(meta.url.as_deref(), Some("https://example.com/blog"));
/// ```
#[must_use]
pub fn resolve_meta(input: MetaInput) -> ResolvedMeta {
    let host = non_empty(input.host).or_else(|| non_empty(input.canonical_host));
    let currency = non_empty(input.currency).or_else(|| non_empty(input.default_currency));
    let in_language = non_empty(input.in_language).or_else(|| non_empty(input.default_language));

    let mut path = non_empty(input.path).unwrap_or_else(|| "/".to_string());
    if path != "/" {
        path = if input.trailing_slash {
            with_trailing_slash(&path)
        } else {
            without_trailing_slash(&path)
        };
    }

    // Caller urls are only a fallback when there is no host to derive one from.
    let url = match host.as_deref() {
        Some(h) => Some(join_url(h, &path)),
        None => non_empty(input.url).or_else(|| non_empty(input.canonical_url)),
    };

    ResolvedMeta {
        host,
        url,
        path,
        in_language,
        currency,
        title: non_empty(input.title),
        description: non_empty(input.description),
        image: non_empty(input.image),
        date_published: non_empty(input.date_published),
        date_modified: non_empty(input.date_modified),
        trailing_slash: input.trailing_slash,
    }
}
