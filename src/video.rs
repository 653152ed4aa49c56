//! YouTube video id parsing and the URLs built from an id

use crate::config::YOUTUBE_OEMBED_URL;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video id pattern is valid"))
}

/// Extract a video id from user input
///
/// Accepts:
/// - a bare 11-character id
/// - https://www.youtube.com/watch?v=<id>
/// - https://youtu.be/<id>
/// - https://www.youtube.com/embed/<id>, /shorts/<id>, /live/<id>
///
/// The scheme may be omitted ("youtu.be/<id>").
pub fn parse_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if id_pattern().is_match(input) {
        return Some(input.to_string());
    }

    let url = if input.contains("://") {
        Url::parse(input).ok()?
    } else {
        Url::parse(&format!("https://{}", input)).ok()?
    };
    let host = url.host_str()?.to_lowercase();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .or_else(|| host.strip_prefix("music."))
        .unwrap_or(&host);

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let candidate = match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            "embed" | "shorts" | "live" | "v" => segments.next().map(str::to_string),
            _ => None,
        },
        _ => None,
    }?;

    id_pattern().is_match(&candidate).then_some(candidate)
}

pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{}", video_id)
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}

pub fn oembed_url(video_id: &str) -> String {
    let mut url = Url::parse(YOUTUBE_OEMBED_URL).expect("oEmbed endpoint is a valid URL");
    url.query_pairs_mut()
        .append_pair("url", &watch_url(video_id))
        .append_pair("format", "json");
    url.into()
}
