//! Provider record to `CanonicalMovie` mapping
//!
//! Pure functions, no I/O. The play-URL blob format is
//!
//! ```text
//! title$url#title$url#url$$$title$url#...
//! ```
//!
//! where `$$$` separates alternate playback groups (only the first is used),
//! `#` separates episodes and a single `$` separates an optional title from
//! its URL.

use crate::models::{CanonicalMovie, Episode, VodRecord};
use crate::sources::SourceEntry;

const GROUP_SEPARATOR: &str = "$$$";
const EPISODE_SEPARATOR: char = '#';
const TITLE_SEPARATOR: char = '$';

/// Map a listing record; episodes are left unset
pub fn normalize(record: &VodRecord, source: &SourceEntry) -> CanonicalMovie {
    CanonicalMovie {
        id: text(&record.vod_id),
        title: text(&record.vod_name),
        poster_url: text(&record.vod_pic),
        year: text(&record.vod_year),
        area: text(&record.vod_area),
        genre_label: text(&record.type_name),
        remarks_text: text(&record.vod_remarks),
        description: optional_text(&record.vod_content),
        directors: optional_text(&record.vod_director),
        actors: optional_text(&record.vod_actor),
        source_key: source.key.clone(),
        source_display_name: source.display_name.clone(),
        is_adult: source.is_adult,
        episodes: None,
    }
}

/// Map a detail record, parsing its play-URL blob into episodes
pub fn normalize_detail(record: &VodRecord, source: &SourceEntry) -> CanonicalMovie {
    let episodes = record
        .vod_play_url
        .as_deref()
        .map(parse_episodes)
        .unwrap_or_default();

    CanonicalMovie {
        episodes: Some(episodes),
        ..normalize(record, source)
    }
}

pub fn normalize_all<'a, I>(records: I, source: &SourceEntry) -> Vec<CanonicalMovie>
where
    I: IntoIterator<Item = &'a VodRecord>,
{
    records
        .into_iter()
        .map(|record| normalize(record, source))
        .collect()
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Url,
}

/// Splits the first playback group into episodes
///
/// Segments whose URL does not start with `http://` or `https://` are
/// dropped. Surviving episodes are numbered from 1 in emitted order and
/// untitled ones are called `Episode N` after that number.
pub fn parse_episodes(blob: &str) -> Vec<Episode> {
    let mut episodes = Vec::new();
    let mut field = Field::Title;
    let mut title = String::new();
    let mut url = String::new();

    for (offset, ch) in blob.char_indices() {
        if ch == TITLE_SEPARATOR && blob[offset..].starts_with(GROUP_SEPARATOR) {
            break;
        }
        match (ch, field) {
            (EPISODE_SEPARATOR, _) => {
                push_segment(&mut episodes, field, &mut title, &mut url);
                field = Field::Title;
            }
            (TITLE_SEPARATOR, Field::Title) => field = Field::Url,
            (_, Field::Title) => title.push(ch),
            (_, Field::Url) => url.push(ch),
        }
    }
    push_segment(&mut episodes, field, &mut title, &mut url);

    episodes
}

fn push_segment(episodes: &mut Vec<Episode>, field: Field, title: &mut String, url: &mut String) {
    // With no `$` the whole segment was collected as the title and is the URL
    let (label, location) = match field {
        Field::Title => (String::new(), std::mem::take(title)),
        Field::Url => (std::mem::take(title), std::mem::take(url)),
    };

    let location = location.trim();
    if !(location.starts_with("http://") || location.starts_with("https://")) {
        return;
    }

    let index = episodes.len() as u32 + 1;
    let label = label.trim();
    episodes.push(Episode {
        index,
        title: if label.is_empty() {
            format!("Episode {index}")
        } else {
            label.to_string()
        },
        playback_url: location.to_string(),
    });
}
