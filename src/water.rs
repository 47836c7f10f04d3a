//! Keyword events on rivers and canals (改道, 淤塞, 开凿, …).

use std::collections::BTreeMap;

use jingshi_types::{Dynasty, RawRecord, WaterSystemEvent};

use crate::dynasty::{PERIOD_FIELD, normalize};

/// Event vocabulary, in reporting order.
pub const WATER_KEYWORDS: &[&str] = &[
    "改道", // rerouting
    "淤塞", // silting
    "决口", // breach
    "开凿", // excavation
    "疏浚", // dredging
    "断流", // desiccation
    "合流", // confluence
    "废弃", // abandonment
    "湮废", // obliteration
];

/// Period labels containing any of these are too uncertain to place.
const UNCERTAIN_MARKERS: &[char] = &['?', '？'];

pub const RIVER_FIELD: &str = "河流/水系名称";
const TEXT_FIELD: &str = "原文";
const TYPE_FIELD: &str = "类型";
const CITATION_FIELD: &str = "出处";

const UNKNOWN_RIVER: &str = "未知水系";
const NO_DESCRIPTION: &str = "无详细描述";

/// Keywords in `text` (vocabulary order), plus `kind` if it is itself a
/// vocabulary word not already found.
fn keywords_in(text: Option<&str>, kind: Option<&str>) -> Vec<&'static str> {
    let mut found: Vec<&'static str> = match text {
        Some(t) => WATER_KEYWORDS.iter().copied().filter(|k| t.contains(*k)).collect(),
        None => Vec::new(),
    };
    if let Some(k) = kind.and_then(|k| WATER_KEYWORDS.iter().copied().find(|w| *w == k))
        && !found.contains(&k)
    {
        found.push(k);
    }
    found
}

/// Group water-system events by canonical dynasty.
///
/// Every dynasty with at least one certain, recognised record gets a key,
/// even if none of its records mention a keyword. Records whose period
/// carries an uncertainty marker are skipped outright.
pub fn extract_water_events(records: &[RawRecord]) -> BTreeMap<Dynasty, Vec<WaterSystemEvent>> {
    let mut out: BTreeMap<Dynasty, Vec<WaterSystemEvent>> = BTreeMap::new();

    for record in records {
        let Some(period) = record.text(PERIOD_FIELD) else {
            continue;
        };
        if period.contains(UNCERTAIN_MARKERS) {
            continue;
        }
        let Some(dynasty) = normalize(period) else {
            continue;
        };

        let events = out.entry(dynasty).or_default();

        let text = record.text(TEXT_FIELD);
        let found = keywords_in(text, record.text(TYPE_FIELD));
        if found.is_empty() {
            continue;
        }

        events.push(WaterSystemEvent {
            river: record.text(RIVER_FIELD).unwrap_or(UNKNOWN_RIVER).to_string(),
            event: found.join(", "),
            description: text.unwrap_or(NO_DESCRIPTION).to_string(),
            source: record.text(CITATION_FIELD).map(str::to_string),
        });
    }

    out
}
