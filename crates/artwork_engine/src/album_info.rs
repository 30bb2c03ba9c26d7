use scraper::{Html, Selector};
use url::Url;

const MUSICIAN_META: &str = r#"meta[property="music:musician"], meta[name="music:musician"]"#;
const TITLE_META: &str = r#"meta[property="og:title"], meta[name="og:title"]"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumInfo {
    pub artist: String,
    pub album: String,
}

/// Works out which album the host upload page is about.
///
/// Prefers the page's music meta tags; otherwise reads `/music/{artist}/{album}`
/// from the page path.
pub fn extract_album_info(html: &str, page_url: &Url) -> Option<AlbumInfo> {
    from_meta(html).or_else(|| from_path(page_url))
}

fn from_meta(html: &str) -> Option<AlbumInfo> {
    let document = Html::parse_document(html);
    let content = |selector: &str| {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    };
    let artist = content(MUSICIAN_META)?;
    let title = content(TITLE_META)?;
    let album = strip_artist(&title, &artist);
    Some(AlbumInfo { artist, album })
}

/// Removes " by {artist}" or a leading "{artist} — " from an og:title.
fn strip_artist(title: &str, artist: &str) -> String {
    let lower_title = title.to_lowercase();
    let by_artist = format!(" by {}", artist.to_lowercase());
    if let Some(index) = lower_title.find(&by_artist) {
        // Lower-casing can shift byte offsets for non-ASCII text.
        if title.is_char_boundary(index) && title.is_char_boundary(index + by_artist.len()) {
            let mut album = String::with_capacity(title.len());
            album.push_str(&title[..index]);
            album.push_str(&title[index + by_artist.len()..]);
            return album.trim().to_string();
        }
    }
    if let Some((prefix, rest)) = title.split_once(" — ") {
        if prefix.trim().eq_ignore_ascii_case(artist) {
            return rest.trim().to_string();
        }
    }
    title.trim().to_string()
}

fn from_path(page_url: &Url) -> Option<AlbumInfo> {
    let segments: Vec<&str> = page_url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let music = segments.iter().position(|s| *s == "music")?;
    let artist = segments.get(music + 1)?;
    let album = segments.get(music + 2)?;
    if album.starts_with('+') {
        return None;
    }
    Some(AlbumInfo {
        artist: decode_segment(artist),
        album: decode_segment(album),
    })
}

/// `+` means space and `%XX` escapes are decoded, as in form encoding.
fn decode_segment(segment: &str) -> String {
    url::form_urlencoded::parse(format!("v={segment}").as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| segment.replace('+', " "))
}

#[cfg(test)]
mod tests {
    use super::{extract_album_info, AlbumInfo};
    use url::Url;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://www.last.fm{path}")).unwrap()
    }

    #[test]
    fn meta_title_drops_by_artist_suffix() {
        let html = r#"<html><head>
            <meta property="music:musician" content="Portishead">
            <meta property="og:title" content="Dummy by Portishead">
        </head></html>"#;
        let info = extract_album_info(html, &url("/music/x/y/+images/upload")).unwrap();
        assert_eq!(
            info,
            AlbumInfo {
                artist: "Portishead".to_string(),
                album: "Dummy".to_string()
            }
        );
    }

    #[test]
    fn meta_title_drops_artist_dash_prefix() {
        let html = r#"<meta name="music:musician" content="Björk"><meta name="og:title" content="Björk — Homogenic">"#;
        let info = extract_album_info(html, &url("/")).unwrap();
        assert_eq!(info.album, "Homogenic");
    }

    #[test]
    fn path_segments_are_decoded() {
        let info = extract_album_info(
            "<html></html>",
            &url("/music/Sigur+R%C3%B3s/%28%29/+images/upload"),
        )
        .unwrap();
        assert_eq!(info.artist, "Sigur Rós");
        assert_eq!(info.album, "()");
    }

    #[test]
    fn artist_only_path_has_no_album() {
        assert_eq!(
            extract_album_info("<html></html>", &url("/music/Portishead/+images/upload")),
            None
        );
    }
}
