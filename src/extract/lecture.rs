//! Lecture videos, subtitles, and lecture assets.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::DEFAULT_SUBTITLE_LANGUAGE;
use crate::syllabus::ItemRecord;

use super::links::url_extension;
use super::{ExtractError, LinkExtractor, LinkMap, pointer};

/// The video behind a lecture item, kept for the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVideo {
    pub video_id: String,
    /// Subtitle languages linked for this video, in first-seen order.
    pub languages: Vec<String>,
}

/// Subtitle fields of a video record and the extension each is stored under.
const SUBTITLE_FORMATS: [(&str, &str); 3] = [
    ("subtitles", "srt"),
    ("subtitlesTxt", "txt"),
    ("subtitlesVtt", "vtt"),
];

impl LinkExtractor {
    pub(super) async fn extract_lecture(&mut self, item: &ItemRecord) -> Result<LinkMap, ExtractError> {
        let video_id = item.video_id.as_deref().unwrap_or(&item.id);
        let course_id = self.course.course_id.clone();

        let document = self
            .get(&self.endpoints.lecture_videos(&course_id, video_id))
            .await?;
        let mut links = LinkMap::new();
        match pointer(&document, &["linked", "onDemandVideos.v1", "0"]) {
            Some(video) => {
                self.add_video(video, &mut links);
                let languages = self.add_subtitles(video, &mut links);
                self.resolved_video = Some(ResolvedVideo {
                    video_id: video_id.to_string(),
                    languages,
                });
            }
            None => debug!(video_id, "Lecture has no video record"),
        }

        let asset_links = self.lecture_assets(&course_id, video_id, &item.asset_ids).await?;
        links.merge(asset_links);
        Ok(links)
    }

    fn add_video(&self, video: &Value, links: &mut LinkMap) {
        let Some(by_resolution) = pointer(video, &["sources", "byResolution"]).and_then(Value::as_object)
        else {
            return;
        };
        let Some(source) = pick_resolution(by_resolution, self.policy.video_resolution.as_deref()) else {
            return;
        };
        if let Some(url) = source.get("mp4VideoUrl").and_then(Value::as_str) {
            links.insert("mp4", url, "");
        }
    }

    /// Links every requested subtitle and returns the languages linked.
    fn add_subtitles(&self, video: &Value, links: &mut LinkMap) -> Vec<String> {
        let requested = self.policy.subtitle_languages();
        let mut linked: Vec<String> = Vec::new();
        for (field, format) in SUBTITLE_FORMATS {
            let Some(available) = video.get(field).and_then(Value::as_object) else {
                continue;
            };
            let languages: Vec<String> = match &requested {
                None => available.keys().cloned().collect(),
                Some(wanted) => wanted
                    .iter()
                    .filter_map(|lang| {
                        if available.contains_key(lang) {
                            Some(lang.clone())
                        } else if available.contains_key(DEFAULT_SUBTITLE_LANGUAGE) {
                            warn!(language = %lang, format, "Subtitle language unavailable; falling back to en");
                            Some(DEFAULT_SUBTITLE_LANGUAGE.to_string())
                        } else {
                            None
                        }
                    })
                    .collect(),
            };
            for lang in languages {
                if let Some(url) = available.get(&lang).and_then(Value::as_str) {
                    links.insert(&format!("{lang}.{format}"), self.endpoints.absolute(url), "");
                    if !linked.contains(&lang) {
                        linked.push(lang);
                    }
                }
            }
        }
        linked
    }

    /// Inline asset ids when the syllabus carried them, else the lecture assets endpoint.
    async fn lecture_assets(
        &mut self,
        course_id: &str,
        video_id: &str,
        inline_ids: &[String],
    ) -> Result<LinkMap, ExtractError> {
        let mut links = LinkMap::new();
        let mut asset_ids = inline_ids.to_vec();

        if asset_ids.is_empty() {
            let document = self
                .get(&self.endpoints.lecture_assets(course_id, video_id))
                .await?;
            let assets = pointer(&document, &["linked", "openCourseAssets.v1"])
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for asset in assets {
                match asset.get("typeName").and_then(Value::as_str) {
                    Some("asset") => {
                        if let Some(id) = pointer(asset, &["definition", "assetId"]).and_then(Value::as_str) {
                            asset_ids.push(id.to_string());
                        }
                    }
                    Some("url") => {
                        let Some(url) = pointer(asset, &["definition", "url"]).and_then(Value::as_str) else {
                            continue;
                        };
                        let name = pointer(asset, &["definition", "name"])
                            .and_then(Value::as_str)
                            .unwrap_or_default();
                        let extension = url_extension(url).unwrap_or_else(|| "url".to_string());
                        links.insert(&extension, url.trim(), name);
                    }
                    other => debug!(type_name = ?other, "Ignoring lecture asset"),
                }
            }
        }

        let resolved = self.resolve_assets(&asset_ids).await?;
        for asset in &resolved {
            let title = asset
                .name
                .strip_suffix(&format!(".{}", asset.extension))
                .unwrap_or(&asset.name);
            links.insert(&asset.extension, asset.url.clone(), title);
        }
        self.resolved_assets.extend(resolved);
        Ok(links)
    }
}

/// The requested resolution when available, else the highest numeric one.
fn pick_resolution<'a>(by_resolution: &'a Map<String, Value>, preferred: Option<&str>) -> Option<&'a Value> {
    if let Some(preferred) = preferred
        && let Some(source) = by_resolution.get(preferred)
    {
        return Some(source);
    }
    by_resolution
        .iter()
        .max_by_key(|(label, _)| {
            label
                .chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
                .parse::<u32>()
                .unwrap_or(0)
        })
        .map(|(_, source)| source)
}
