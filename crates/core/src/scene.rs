//! Scene segmentation: splitting raw screenplay text into scenes on
//! heading boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

/// A single scene as carved out of the raw script text.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Zero-based dense position in file order.
    pub scene_id: u32,
    /// The heading line (`INT. KITCHEN - DAY`), empty if the script had no
    /// detectable heading before this scene's text.
    pub heading: String,
    /// Full scene text, heading included.
    pub body: String,
}

static HEADING_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)(?=^\s*(?:int\.?|ext\.?|int\./ext\.?|scene_heading:)\s")
        .expect("heading split pattern must compile")
});

static HEADING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*((?:int\.?|ext\.?|int\./ext\.?)[^\n]*)").expect("heading line pattern must compile")
});

/// Minimum number of heading-delimited chunks before we trust the split —
/// below this a script is treated as a single scene, since a handful of
/// stray "INT." substrings in prose shouldn't fragment it.
const MIN_SPLITS: usize = 5;

/// Heading text is capped at this many characters after the leading
/// `INT.`/`EXT.` marker.
const MAX_HEADING_CHARS: usize = 120;

fn truncate_heading(raw: &str) -> String {
    raw.chars().take(MAX_HEADING_CHARS).collect()
}

/// Split `text` into scenes on scene-heading boundaries.
///
/// Uses a zero-width lookahead split on `INT.`/`EXT.`/`INT./EXT.` and
/// `scene_heading:` markers at line start. If fewer than [`MIN_SPLITS`]
/// chunks result, the whole text is treated as one scene — a script with
/// too few recognizable headings isn't reliably segmentable, so we fall
/// back rather than guess.
pub fn segment(text: &str) -> Vec<Scene> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let chunks: Vec<&str> = HEADING_SPLIT
        .split(trimmed)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    if chunks.len() < MIN_SPLITS {
        return vec![Scene {
            scene_id: 0,
            heading: "full_text".to_string(),
            body: trimmed.to_string(),
        }];
    }

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| Scene {
            scene_id: i as u32,
            heading: HEADING_LINE
                .captures(chunk)
                .map(|c| truncate_heading(c[1].trim()))
                .unwrap_or_else(|| format!("scene_{i}")),
            body: chunk.to_string(),
        })
        .collect()
}
