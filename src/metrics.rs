//! Per-dynasty numeric metrics mined from free-text fields.
//!
//! Every extractor walks the records once, folds each record's period label
//! onto a canonical [`Dynasty`], scans the text field with every occurrence
//! of its patterns, and merges the readings into one entry per dynasty.
//! The merge policy differs per metric and is deliberate:
//!
//! | metric       | policy                     |
//! |--------------|----------------------------|
//! | population   | largest reading wins       |
//! | admin units  | readings are summed        |
//! | climate      | last reading wins          |
//! | vegetation   | last reading wins          |
//!
//! Entries that end up with no reading at all are dropped.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use jingshi_types::{
    AdminDivisionCount, ClimateMetric, Dynasty, PopulationMetric, RawRecord, VegetationMetric,
};
use regex::Regex;

use crate::dynasty::{PERIOD_FIELD, record_dynasty};

// ── Field selection ──────────────────────────────────────────────────────

/// Which record keys hold the period label, the text to mine, and the
/// citation.
#[derive(Debug, Clone, Copy)]
pub struct TextFields<'a> {
    pub dynasty: &'a str,
    pub text: &'a str,
    pub citation: &'a str,
}

impl TextFields<'static> {
    /// 时期 / 原文 / 出处, the layout of most source datasets.
    pub const SOURCE_TEXT: Self = Self {
        dynasty: PERIOD_FIELD,
        text: "原文",
        citation: "出处",
    };

    /// 时期 / 行政划分 / 出处 (governance dataset)
    pub const ADMIN: Self = Self {
        dynasty: PERIOD_FIELD,
        text: "行政划分",
        citation: "出处",
    };
}

// ── Regex patterns ───────────────────────────────────────────────────────
//
// Digits are ASCII only: full-width figures are skipped, not misread.
//
// Real data examples:
//   户口 "天宝元年，幽州有6.7万户 37.1万人"
//   建制 "领9州 2府 41县"
//   气候 "唐代降水量600毫米，平均气温10.5℃"
//   植被 "森林覆盖率约为35%"

// N万户 M万人
static RE_HOUSEHOLDS_PEOPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<households>[0-9]+(?:\.[0-9]+)?)\s*万户\s*(?P<people>[0-9]+(?:\.[0-9]+)?)\s*万人").unwrap()
});

// N万人 or N万户 on its own
static RE_WAN_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<value>[0-9]+(?:\.[0-9]+)?)\s*万(?P<unit>人|户)").unwrap()
});

static RE_STATES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)\s*州").unwrap());
static RE_PREFECTURES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)\s*(?:郡|府)").unwrap());
static RE_COUNTIES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)\s*县").unwrap());

static RE_TEMPERATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"平均气温\s*(-?[0-9]+(?:\.[0-9]+)?)\s*℃").unwrap()
});

static RE_PRECIPITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"降水量\s*([0-9]+(?:\.[0-9]+)?)\s*(?:毫米|mm)").unwrap()
});

static RE_FOREST_COVERAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"森林覆盖率.*?([0-9]+(?:\.[0-9]+)?)\s*[%％]").unwrap()
});

/// "6.7" 万 → 67000
fn wan_to_count(s: &str) -> Option<u64> {
    let v: f64 = s.parse().ok()?;
    Some((v * 10_000.0).round() as u64)
}

// ── Shared aggregation ───────────────────────────────────────────────────

/// A per-dynasty entry that collects citations and can be empty.
trait DynastyMetric {
    fn new(dynasty: Dynasty) -> Self;
    fn sources_mut(&mut self) -> &mut Vec<String>;
    fn has_data(&self) -> bool;
}

fn add_source(sources: &mut Vec<String>, cite: &str) {
    if !sources.iter().any(|s| s == cite) {
        sources.push(cite.to_string());
    }
}

/// Walk `records`, group by canonical dynasty and let `update` fold each
/// text field into its dynasty's entry. Records with an unknown period or
/// no text are skipped; entries left without data are removed.
fn aggregate<M: DynastyMetric>(
    records: &[RawRecord],
    fields: &TextFields<'_>,
    mut update: impl FnMut(&mut M, &str),
) -> BTreeMap<Dynasty, M> {
    let mut out: BTreeMap<Dynasty, M> = BTreeMap::new();

    for record in records {
        let Some(dynasty) = record_dynasty(record, fields.dynasty) else {
            continue;
        };
        let Some(text) = record.text(fields.text) else {
            continue;
        };

        let metric = out.entry(dynasty).or_insert_with(|| M::new(dynasty));
        update(metric, text);
        if let Some(cite) = record.text(fields.citation) {
            add_source(metric.sources_mut(), cite);
        }
    }

    out.retain(|_, m| m.has_data());
    out
}

// ── Population ───────────────────────────────────────────────────────────

impl DynastyMetric for PopulationMetric {
    fn new(dynasty: Dynasty) -> Self {
        Self {
            dynasty,
            people: 0,
            households: 0,
            sources: Vec::new(),
        }
    }
    fn sources_mut(&mut self) -> &mut Vec<String> {
        &mut self.sources
    }
    fn has_data(&self) -> bool {
        self.people > 0 || self.households > 0
    }
}

/// Largest reported people and household counts per dynasty.
pub fn extract_population(
    records: &[RawRecord],
    fields: &TextFields<'_>,
) -> BTreeMap<Dynasty, PopulationMetric> {
    aggregate(records, fields, |m: &mut PopulationMetric, text| {
        for caps in RE_HOUSEHOLDS_PEOPLE.captures_iter(text) {
            if let Some(h) = wan_to_count(&caps["households"]) {
                m.households = m.households.max(h);
            }
            if let Some(p) = wan_to_count(&caps["people"]) {
                m.people = m.people.max(p);
            }
        }
        for caps in RE_WAN_COUNT.captures_iter(text) {
            let Some(v) = wan_to_count(&caps["value"]) else {
                continue;
            };
            match &caps["unit"] {
                "人" => m.people = m.people.max(v),
                _ => m.households = m.households.max(v),
            }
        }
    })
}

// ── Administrative divisions ─────────────────────────────────────────────

impl DynastyMetric for AdminDivisionCount {
    fn new(dynasty: Dynasty) -> Self {
        Self {
            dynasty,
            states: 0,
            prefectures: 0,
            counties: 0,
            sources: Vec::new(),
        }
    }
    fn sources_mut(&mut self) -> &mut Vec<String> {
        &mut self.sources
    }
    fn has_data(&self) -> bool {
        self.states > 0 || self.prefectures > 0 || self.counties > 0
    }
}

fn sum_matches(re: &Regex, text: &str) -> u64 {
    re.captures_iter(text)
        .filter_map(|c| c[1].parse::<u64>().ok())
        .fold(0u64, u64::saturating_add)
}

/// 州 / 郡府 / 县 counts per dynasty, summed over every fragment.
pub fn extract_admin_divisions(
    records: &[RawRecord],
    fields: &TextFields<'_>,
) -> BTreeMap<Dynasty, AdminDivisionCount> {
    aggregate(records, fields, |m: &mut AdminDivisionCount, text| {
        m.states = m.states.saturating_add(sum_matches(&RE_STATES, text));
        m.prefectures = m.prefectures.saturating_add(sum_matches(&RE_PREFECTURES, text));
        m.counties = m.counties.saturating_add(sum_matches(&RE_COUNTIES, text));
    })
}

// ── Climate ──────────────────────────────────────────────────────────────

impl DynastyMetric for ClimateMetric {
    fn new(dynasty: Dynasty) -> Self {
        Self {
            dynasty,
            temp: None,
            precip: None,
            sources: Vec::new(),
        }
    }
    fn sources_mut(&mut self) -> &mut Vec<String> {
        &mut self.sources
    }
    fn has_data(&self) -> bool {
        self.temp.is_some() || self.precip.is_some()
    }
}

fn last_reading(re: &Regex, text: &str) -> Option<f64> {
    re.captures_iter(text)
        .filter_map(|c| c[1].parse::<f64>().ok())
        .last()
}

/// Mean temperature (℃) and precipitation (mm) per dynasty; the last
/// reading seen overwrites earlier ones.
pub fn extract_climate(
    records: &[RawRecord],
    fields: &TextFields<'_>,
) -> BTreeMap<Dynasty, ClimateMetric> {
    aggregate(records, fields, |m: &mut ClimateMetric, text| {
        if let Some(t) = last_reading(&RE_TEMPERATURE, text) {
            m.temp = Some(t);
        }
        if let Some(p) = last_reading(&RE_PRECIPITATION, text) {
            m.precip = Some(p);
        }
    })
}

// ── Vegetation ───────────────────────────────────────────────────────────

impl DynastyMetric for VegetationMetric {
    fn new(dynasty: Dynasty) -> Self {
        Self {
            dynasty,
            coverage: None,
            sources: Vec::new(),
        }
    }
    fn sources_mut(&mut self) -> &mut Vec<String> {
        &mut self.sources
    }
    fn has_data(&self) -> bool {
        self.coverage.is_some()
    }
}

/// Forest coverage percentage per dynasty (last reading wins).
pub fn extract_vegetation(
    records: &[RawRecord],
    fields: &TextFields<'_>,
) -> BTreeMap<Dynasty, VegetationMetric> {
    aggregate(records, fields, |m: &mut VegetationMetric, text| {
        if let Some(c) = last_reading(&RE_FOREST_COVERAGE, text) {
            m.coverage = Some(c);
        }
    })
}
