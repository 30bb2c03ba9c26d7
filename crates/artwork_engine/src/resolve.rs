//! Maps a clicked element on the picker page to the best full-resolution image URL.
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

/// Data attributes that carry an original-size URL, highest priority first.
const HIGH_RES_ATTRIBUTES: &[&str] = &[
    "data-fullsize",
    "data-full",
    "data-original",
    "data-hires",
    "data-high-res",
];

const LAZY_SOURCE_ATTRIBUTE: &str = "data-src";

static IMAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpg|jpeg|png|webp|gif)(\?|#|$)").expect("image link pattern")
});

/// CDN thumbnail markers and the text that replaces them, applied in order.
static THUMBNAIL_MARKERS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"\._[A-Z]{2}\d+_\.").expect("size token"), "."),
        (Regex::new(r"\._AC_UL\d+_\.").expect("listing token"), "."),
        (
            Regex::new(r"/image/([a-f0-9]+)/\d+x\d+").expect("bounding box segment"),
            "/image/$1",
        ),
    ]
});

static BACKGROUND_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background(?:-image)?\s*:[^;]*?url\(\s*["']?([^"')]+?)["']?\s*\)"#)
        .expect("background url pattern")
});

pub(crate) static IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("img selector"));

#[derive(Debug, Clone, Default)]
pub struct ImageResolver {
    base_url: Option<Url>,
}

impl ImageResolver {
    /// `base_url` is the picker page URL; relative references are resolved against it.
    pub fn new(base_url: Option<Url>) -> Self {
        Self { base_url }
    }

    /// Returns `None` when no heuristic produces an absolute http(s) URL.
    pub fn resolve(&self, element: ElementRef<'_>) -> Option<String> {
        if is_img(element) {
            return self.resolve_image(element);
        }
        if let Some(url) = self.resolve_best_descendant(element) {
            return Some(url);
        }
        let style = element.value().attr("style")?;
        let raw = BACKGROUND_URL.captures(style)?.get(1)?.as_str();
        self.absolutize(raw)
    }

    fn resolve_image(&self, img: ElementRef<'_>) -> Option<String> {
        let attrs = img.value();

        for name in HIGH_RES_ATTRIBUTES {
            if let Some(url) = attrs.attr(name).and_then(|raw| self.absolutize(raw)) {
                return Some(url);
            }
        }

        if let Some(url) = self.enclosing_image_link(img) {
            return Some(url);
        }

        if let Some(url) = attrs
            .attr(LAZY_SOURCE_ATTRIBUTE)
            .and_then(|raw| self.absolutize(raw))
        {
            return Some(url);
        }

        if let Some(url) = attrs
            .attr("srcset")
            .and_then(largest_srcset_candidate)
            .and_then(|raw| self.absolutize(raw))
        {
            return Some(url);
        }

        let src = self.absolutize(attrs.attr("src")?)?;
        Some(strip_thumbnail_markers(&src))
    }

    fn enclosing_image_link(&self, img: ElementRef<'_>) -> Option<String> {
        let link = img
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name().eq_ignore_ascii_case("a"))?;
        let href = self.absolutize(link.value().attr("href")?)?;
        IMAGE_LINK.is_match(&href).then_some(href)
    }

    /// Tries descendant images largest-declared-area first, falling back to document order.
    fn resolve_best_descendant(&self, element: ElementRef<'_>) -> Option<String> {
        let mut images: Vec<(usize, u64, ElementRef<'_>)> = element
            .select(&IMG)
            .enumerate()
            .map(|(index, img)| (index, declared_area(img), img))
            .collect();
        images.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        images
            .into_iter()
            .find_map(|(_, _, img)| self.resolve_image(img))
    }

    fn absolutize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let url = match Url::parse(trimmed) {
            Ok(url) => url,
            Err(_) => self.base_url.as_ref()?.join(trimmed).ok()?,
        };
        matches!(url.scheme(), "http" | "https").then(|| url.to_string())
    }
}

fn is_img(element: ElementRef<'_>) -> bool {
    element.value().name().eq_ignore_ascii_case("img")
}

fn declared_area(img: ElementRef<'_>) -> u64 {
    let dim = |name: &str| {
        img.value()
            .attr(name)
            .and_then(|v| v.trim().trim_end_matches("px").parse::<u64>().ok())
    };
    match (dim("width"), dim("height")) {
        (Some(w), Some(h)) => w * h,
        (Some(side), None) | (None, Some(side)) => side * side,
        (None, None) => 0,
    }
}

/// Picks the candidate with the largest `Nw` descriptor; candidates without one are skipped.
pub fn largest_srcset_candidate(srcset: &str) -> Option<&str> {
    let mut best: Option<(u64, &str)> = None;
    for candidate in srcset.split(',') {
        let mut parts = candidate.split_whitespace();
        let (Some(url), Some(descriptor)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Some(width) = descriptor
            .strip_suffix('w')
            .and_then(|w| w.parse::<u64>().ok())
        else {
            continue;
        };
        if best.map_or(true, |(max, _)| width > max) {
            best = Some((width, url));
        }
    }
    best.map(|(_, url)| url)
}

pub fn strip_thumbnail_markers(src: &str) -> String {
    THUMBNAIL_MARKERS
        .iter()
        .fold(src.to_string(), |acc, (pattern, replacement)| {
            pattern.replace(&acc, *replacement).into_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::{largest_srcset_candidate, strip_thumbnail_markers};

    #[test]
    fn srcset_picks_maximum_width() {
        let srcset = "a.jpg 320w, b.jpg 1200w, c.jpg 640w";
        assert_eq!(largest_srcset_candidate(srcset), Some("b.jpg"));
    }

    #[test]
    fn srcset_skips_malformed_descriptors() {
        let srcset = "a.jpg wide, b.jpg 2x, c.jpg 12a0w, d.jpg 300w, e.jpg";
        assert_eq!(largest_srcset_candidate(srcset), Some("d.jpg"));
        assert_eq!(largest_srcset_candidate("x.jpg 1x, y.jpg 2x"), None);
        assert_eq!(largest_srcset_candidate(""), None);
    }

    #[test]
    fn amazon_size_tokens_are_removed() {
        assert_eq!(
            strip_thumbnail_markers("https://m.media-amazon.com/images/I/81abc._SL500_.jpg"),
            "https://m.media-amazon.com/images/I/81abc.jpg"
        );
        assert_eq!(
            strip_thumbnail_markers("https://m.media-amazon.com/images/I/81abc._AC_UL320_.jpg"),
            "https://m.media-amazon.com/images/I/81abc.jpg"
        );
    }

    #[test]
    fn bounding_box_segment_is_removed() {
        assert_eq!(
            strip_thumbnail_markers("https://cdn.example/image/9f8e7d/300x300/cover.jpg"),
            "https://cdn.example/image/9f8e7d/cover.jpg"
        );
    }

    #[test]
    fn plain_urls_are_untouched() {
        let url = "https://cdn.example/covers/full.png";
        assert_eq!(strip_thumbnail_markers(url), url);
    }
}
