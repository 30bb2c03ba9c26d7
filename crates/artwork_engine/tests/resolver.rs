use artwork_engine::ImageResolver;
use scraper::{ElementRef, Html, Selector};
use url::Url;

fn resolve(html: &str, target: &str) -> Option<String> {
    let document = Html::parse_fragment(html);
    let selector = Selector::parse(target).unwrap();
    let element: ElementRef<'_> = document.select(&selector).next().expect("target element");
    let base = Url::parse("https://covers.example/search?q=a").unwrap();
    ImageResolver::new(Some(base)).resolve(element)
}

#[test]
fn high_res_attribute_beats_rendered_source() {
    let html = r#"<img src="https://cdn/thumb.jpg" data-full="https://cdn/full.jpg"
        srcset="https://cdn/a.jpg 300w, https://cdn/b.jpg 900w">"#;
    assert_eq!(resolve(html, "img").as_deref(), Some("https://cdn/full.jpg"));
}

#[test]
fn attribute_order_is_fullsize_first() {
    let html = r#"<img data-original="https://cdn/o.jpg" data-fullsize="https://cdn/fs.jpg">"#;
    assert_eq!(resolve(html, "img").as_deref(), Some("https://cdn/fs.jpg"));
}

#[test]
fn enclosing_link_to_image_wins_over_lazy_source() {
    let html = r#"<a href="/art/cover.PNG?size=max"><span><img data-src="https://cdn/lazy.jpg"></span></a>"#;
    assert_eq!(
        resolve(html, "img").as_deref(),
        Some("https://covers.example/art/cover.PNG?size=max")
    );
}

#[test]
fn link_to_non_image_is_ignored() {
    let html = r#"<a href="/album/123"><img data-src="https://cdn/lazy.jpg"></a>"#;
    assert_eq!(resolve(html, "img").as_deref(), Some("https://cdn/lazy.jpg"));
}

#[test]
fn srcset_widest_candidate_is_chosen() {
    let html = r#"<img src="https://cdn/s.jpg" srcset="https://cdn/640.jpg 640w, https://cdn/1600.jpg 1600w, https://cdn/bad.jpg huge">"#;
    assert_eq!(resolve(html, "img").as_deref(), Some("https://cdn/1600.jpg"));
}

#[test]
fn src_has_thumbnail_markers_removed() {
    let html = r#"<img src="https://m.media-amazon.com/images/I/71x._SX300_.jpg">"#;
    assert_eq!(
        resolve(html, "img").as_deref(),
        Some("https://m.media-amazon.com/images/I/71x.jpg")
    );
}

#[test]
fn container_resolves_largest_declared_descendant() {
    let html = r#"<div class="card">
        <img src="https://cdn/icon.png" width="16" height="16">
        <img src="https://cdn/cover.jpg" width="500" height="500">
    </div>"#;
    assert_eq!(resolve(html, "div.card").as_deref(), Some("https://cdn/cover.jpg"));
}

#[test]
fn container_without_image_uses_background() {
    let html = r#"<div class="tile" style="color: red; background-image: url('/bg/cover.webp')"></div>"#;
    assert_eq!(
        resolve(html, "div.tile").as_deref(),
        Some("https://covers.example/bg/cover.webp")
    );
}

#[test]
fn nothing_resolvable_yields_none() {
    assert_eq!(resolve(r#"<div class="empty"><p>text</p></div>"#, "div.empty"), None);
    assert_eq!(resolve(r#"<img src="javascript:void(0)">"#, "img"), None);
    assert_eq!(resolve(r#"<img alt="no source">"#, "img"), None);
}
