//! Data shapes shared between the extraction pipeline and whatever renders it.
//!
//! Everything here is plain serde data: the maps, charts and timelines only
//! ever see these types, never the raw pattern machinery.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// ── Canonical dynasty ────────────────────────────────────────────────────

/// One of the fixed, chronologically ordered period buckets.
///
/// The derived `Ord` follows declaration order, which is also the display
/// order anywhere dynasties are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dynasty {
    #[serde(rename = "秦汉")]
    QinHan,
    #[serde(rename = "三国两晋南北朝")]
    SixDynasties,
    #[serde(rename = "隋唐五代")]
    SuiTang,
    #[serde(rename = "辽宋夏金")]
    LiaoSongXiaJin,
    #[serde(rename = "元")]
    Yuan,
    #[serde(rename = "明")]
    Ming,
    #[serde(rename = "清")]
    Qing,
}

impl Dynasty {
    pub const ALL: [Dynasty; 7] = [
        Self::QinHan,
        Self::SixDynasties,
        Self::SuiTang,
        Self::LiaoSongXiaJin,
        Self::Yuan,
        Self::Ming,
        Self::Qing,
    ];

    pub fn as_chinese(&self) -> &'static str {
        match self {
            Self::QinHan => "秦汉",
            Self::SixDynasties => "三国两晋南北朝",
            Self::SuiTang => "隋唐五代",
            Self::LiaoSongXiaJin => "辽宋夏金",
            Self::Yuan => "元",
            Self::Ming => "明",
            Self::Qing => "清",
        }
    }

    /// Exact canonical name lookup (no alias resolution).
    pub fn from_chinese(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_chinese() == name)
    }
}

impl fmt::Display for Dynasty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_chinese())
    }
}

// ── Dynasty selection ────────────────────────────────────────────────────

/// Label of the "every dynasty" sentinel.
pub const ALL_DYNASTIES_LABEL: &str = "总";

/// The currently selected slice of history: everything, or one dynasty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DynastyFilter {
    #[default]
    All,
    Only(Dynasty),
}

impl DynastyFilter {
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => ALL_DYNASTIES_LABEL,
            Self::Only(d) => d.as_chinese(),
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        if label == ALL_DYNASTIES_LABEL {
            return Some(Self::All);
        }
        Dynasty::from_chinese(label).map(Self::Only)
    }
}

impl Serialize for DynastyFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for DynastyFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown dynasty label: {label}")))
    }
}

// ── Raw input records ────────────────────────────────────────────────────

/// One object from a source JSON array, kept verbatim.
///
/// Field presence is never guaranteed, so every accessor is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Map<String, Value>);

impl RawRecord {
    /// A non-empty string field. Missing keys, non-strings and `""` are all
    /// treated as "no data".
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// First present field among `keys`, in order.
    pub fn text_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.text(k))
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

// ── Per-dynasty metrics ──────────────────────────────────────────────────

/// Largest reported people/household counts for one dynasty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationMetric {
    pub dynasty: Dynasty,
    pub people: u64,
    pub households: u64,
    /// Distinct citations, in first-seen order.
    pub sources: Vec<String>,
}

/// Summed administrative unit counts for one dynasty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminDivisionCount {
    pub dynasty: Dynasty,
    /// 州
    pub states: u64,
    /// 郡 / 府
    pub prefectures: u64,
    /// 县
    pub counties: u64,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateMetric {
    pub dynasty: Dynasty,
    /// Mean temperature, ℃
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    /// Annual precipitation, mm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precip: Option<f64>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegetationMetric {
    pub dynasty: Dynasty,
    /// Forest coverage, percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
    pub sources: Vec<String>,
}

/// A river/canal event recovered from a water-system record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterSystemEvent {
    pub river: String,
    /// Distinct keywords found, joined with ", "
    pub event: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

// ── Geo-enrichment ───────────────────────────────────────────────────────

/// `[longitude, latitude]`
pub type LonLat = [f64; 2];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Geometry {
    Point {
        coordinate: LonLat,
    },
    Line {
        #[serde(rename = "lineCoords")]
        line_coords: [LonLat; 2],
    },
}

/// A record that was successfully placed on the map. Serializes as the
/// source record with `coordinate` or `lineCoords` added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedRecord {
    #[serde(flatten)]
    pub record: RawRecord,
    #[serde(flatten)]
    pub geometry: Geometry,
}

// ── Impact events ────────────────────────────────────────────────────────

/// Disasters, wars and generic events merged into one timeline collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImpactEvent {
    Disaster(RawRecord),
    War(RawRecord),
    Event(RawRecord),
}

/// Discriminant key written on every serialized [`ImpactEvent`].
pub const IMPACT_TAG: &str = "type";

impl ImpactEvent {
    // The tag replaces any `type` the record already carried; keeping both
    // would write a duplicate key.
    pub fn disaster(mut record: RawRecord) -> Self {
        record.0.remove(IMPACT_TAG);
        Self::Disaster(record)
    }

    pub fn war(mut record: RawRecord) -> Self {
        record.0.remove(IMPACT_TAG);
        Self::War(record)
    }

    pub fn event(mut record: RawRecord) -> Self {
        record.0.remove(IMPACT_TAG);
        Self::Event(record)
    }

    pub fn record(&self) -> &RawRecord {
        match self {
            Self::Disaster(r) | Self::War(r) | Self::Event(r) => r,
        }
    }

    pub fn kind_zh(&self) -> &'static str {
        match self {
            Self::Disaster(_) => "灾害",
            Self::War(_) => "战争",
            Self::Event(_) => "事件",
        }
    }
}

// ── Full load result ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct StructuredDataset {
    /// "总" first, then every dynasty observed in the data, in order.
    pub dynasties: Vec<DynastyFilter>,
    pub population: BTreeMap<Dynasty, PopulationMetric>,
    pub admin_divisions: BTreeMap<Dynasty, AdminDivisionCount>,
    pub climate: BTreeMap<Dynasty, ClimateMetric>,
    pub vegetation: BTreeMap<Dynasty, VegetationMetric>,
    pub water_events: BTreeMap<Dynasty, Vec<WaterSystemEvent>>,
    pub products: Vec<LocatedRecord>,
    pub transport: Vec<LocatedRecord>,
    pub impact_events: Vec<ImpactEvent>,
    /// Every loaded source, keyed by source key (e.g. "keyBuildings").
    pub raw: BTreeMap<String, Vec<RawRecord>>,
}
