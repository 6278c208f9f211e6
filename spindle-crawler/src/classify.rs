use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;
use url::Url;

/// File extensions treated as downloadable documents rather than pages.
/// Matched case-insensitively against the last path segment, query and
/// fragment excluded.
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "zip", "rar", "7z",
    "gz", "tar", "csv", "txt", "rtf", "epub",
];

const MAX_EXTENSION_LEN: usize = 5;

/// Classification of an anchor relative to the page it was found on.
/// Exactly one class applies per link; see [`classify`] for the precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Internal,
    External,
    Reference,
    Document,
}

/// Link sets harvested from a single page, keyed by class. The four anchor
/// classes are mutually exclusive; `images` is collected independently from
/// `<img src>` attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkClassification {
    pub internal: BTreeSet<String>,
    pub external: BTreeSet<String>,
    pub reference: BTreeSet<String>,
    pub documents: BTreeSet<String>,
    pub images: BTreeSet<String>,
}

impl LinkClassification {
    fn insert(&mut self, kind: LinkKind, url: String) {
        match kind {
            LinkKind::Internal => self.internal.insert(url),
            LinkKind::External => self.external.insert(url),
            LinkKind::Reference => self.reference.insert(url),
            LinkKind::Document => self.documents.insert(url),
        };
    }
}

/// Classify `link` relative to `base`. Precedence is fixed: a recognized
/// document extension wins over everything, then a differing host makes the
/// link external, then an otherwise-identical URL with a fragment is a
/// same-page reference; anything left is internal.
pub fn classify(base: &Url, link: &Url) -> LinkKind {
    if document_extension(link).is_some() {
        return LinkKind::Document;
    }
    if link.host_str() != base.host_str() {
        return LinkKind::External;
    }
    if link.scheme() == base.scheme()
        && link.path() == base.path()
        && link.fragment().is_some_and(|f| !f.is_empty())
    {
        return LinkKind::Reference;
    }
    LinkKind::Internal
}

/// The document extension of `url`'s path, if it carries a recognized one.
pub fn document_extension(url: &Url) -> Option<&'static str> {
    let segment = url.path_segments()?.next_back()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    DOCUMENT_EXTENSIONS.iter().find(|e| **e == ext).copied()
}

/// Resolve an href found on `page` into an absolute URL. Empty hrefs and
/// non-navigable schemes yield `None`; malformed hrefs are skipped the same
/// way and never abort the page. Fragments are kept so that same-page
/// references stay classifiable.
pub fn resolve_href(page: &Url, href: &str) -> Option<Url> {
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }
    page.join(href).ok()
}

/// Harvest and classify every link on a parsed page: `a[href]` anchors into
/// the four exclusive classes, `img[src]` sources into `images`.
pub fn classify_document(doc: &Html, base: &Url) -> LinkClassification {
    let anchor_selector = Selector::parse("a[href]").unwrap();
    let image_selector = Selector::parse("img[src]").unwrap();

    let mut links = LinkClassification::default();

    for element in doc.select(&anchor_selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(resolved) = resolve_href(base, href)
        {
            let kind = classify(base, &resolved);
            debug!("classified {} as {:?}", resolved, kind);
            links.insert(kind, resolved.into());
        }
    }

    for element in doc.select(&image_selector) {
        if let Some(src) = element.value().attr("src")
            && let Some(resolved) = resolve_href(base, src)
        {
            links.images.insert(resolved.into());
        }
    }

    links
}
