//! Course markup (CML) scanning and HTML rendering.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::links::url_extension;

/// MathJax script loaded by rendered pages unless overridden.
pub const DEFAULT_MATHJAX_CDN: &str =
    "https://cdn.mathjax.org/mathjax/latest/MathJax.js?config=TeX-AMS-MML_HTMLorMML";

/// Extensions accepted when harvesting plain `href` links from markup.
const RESOURCE_EXTENSIONS: &[&str] = &[
    "pdf", "ppt", "pptx", "doc", "docx", "xls", "xlsx", "csv", "txt", "zip", "gz", "tar", "7z",
    "py", "ipynb", "r", "m", "java", "c", "cpp", "h", "js", "json", "sql", "mp3", "mp4", "png",
    "jpg", "jpeg", "gif", "svg",
];

#[allow(clippy::expect_used)]
static ASSET_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<asset\b([^>]*?)/?>").expect("asset tag regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z][\w-]*)\s*=\s*"([^"]*)""#).expect("attribute regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("href regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<img\b([^>]*?)/?>").expect("img tag regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<heading\b[^>]*?level="(\d)"[^>]*>(.*?)</heading>"#)
        .expect("heading regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<list\b[^>]*?bulletType="(\w+)"[^>]*>(.*?)</list>"#)
        .expect("list regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static CO_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?co-content\s*>").expect("co-content regex is valid") // Static pattern, safe to panic
});

/// An `<asset>` element referenced from markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTag {
    pub id: String,
    pub name: String,
    pub extension: String,
}

fn attributes(raw: &str) -> HashMap<&str, &str> {
    ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str();
            let value = caps.get(2)?.as_str();
            Some((key, value))
        })
        .collect()
}

/// Every `<asset>` element with an id, in document order.
#[must_use]
pub fn asset_tags(cml: &str) -> Vec<AssetTag> {
    ASSET_TAG
        .captures_iter(cml)
        .filter_map(|caps| {
            let attrs = attributes(caps.get(1)?.as_str());
            let id = attrs.get("id")?.to_string();
            Some(AssetTag {
                id,
                name: attrs.get("name").copied().unwrap_or_default().to_string(),
                extension: attrs.get("extension").copied().unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Asset ids of `<img assetId=...>` elements.
#[must_use]
pub fn image_asset_ids(cml: &str) -> Vec<String> {
    IMG_TAG
        .captures_iter(cml)
        .filter_map(|caps| {
            let attrs = attributes(caps.get(1)?.as_str());
            attrs.get("assetId").map(|id| (*id).to_string())
        })
        .collect()
}

/// `href` targets whose path ends in a known resource extension, as `(url, extension)`.
#[must_use]
pub fn resource_hrefs(text: &str) -> Vec<(String, String)> {
    HREF.captures_iter(text)
        .filter_map(|caps| {
            let url = caps.get(1)?.as_str().trim();
            let extension = url_extension(url)?;
            RESOURCE_EXTENSIONS
                .contains(&extension.as_str())
                .then(|| (url.to_string(), extension))
        })
        .collect()
}

/// Renders markup to a standalone HTML page that loads MathJax.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    mathjax_cdn_url: String,
}

impl HtmlRenderer {
    #[must_use]
    pub fn new(mathjax_cdn_url: Option<&str>) -> Self {
        Self {
            mathjax_cdn_url: mathjax_cdn_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .unwrap_or(DEFAULT_MATHJAX_CDN)
                .to_string(),
        }
    }

    /// Converts `cml` to HTML. `asset_urls` maps asset ids to download URLs
    /// for `<img>` and `<asset>` rewriting; unknown ids are left untouched.
    #[must_use]
    pub fn render(&self, cml: &str, asset_urls: &HashMap<String, String>) -> String {
        let body = CO_CONTENT.replace_all(cml, "");
        let body = body.replace("<text>", "<p>").replace("</text>", "</p>");
        let body = HEADING.replace_all(&body, "<h$1>$2</h$1>");
        let body = LIST.replace_all(&body, |caps: &Captures<'_>| {
            let tag = if &caps[1] == "numbers" { "ol" } else { "ul" };
            format!("<{tag}>{}</{tag}>", &caps[2])
        });
        let body = IMG_TAG.replace_all(&body, |caps: &Captures<'_>| {
            let attrs = attributes(&caps[1]);
            match attrs.get("assetId").and_then(|id| asset_urls.get(*id)) {
                Some(url) => format!(r#"<img src="{url}">"#),
                None => caps[0].to_string(),
            }
        });
        let body = ASSET_TAG.replace_all(&body, |caps: &Captures<'_>| {
            let attrs = attributes(&caps[1]);
            match attrs.get("id").and_then(|id| asset_urls.get(*id)) {
                Some(url) => {
                    let name = attrs.get("name").copied().unwrap_or("asset");
                    format!(r#"<a href="{url}">{name}</a>"#)
                }
                None => caps[0].to_string(),
            }
        });

        format!(
            "<meta charset=\"UTF-8\"/>\n\
             <script type=\"text/x-mathjax-config\">\n\
             MathJax.Hub.Config({{tex2jax: {{inlineMath: [['$$','$$'], ['$','$'], ['\\\\(','\\\\)']]}}}});\n\
             </script>\n\
             <script type=\"text/javascript\" src=\"{}\"></script>\n\
             {body}\n",
            self.mathjax_cdn_url
        )
    }
}
