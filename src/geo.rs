//! Attach map geometry to product and transport records.
//!
//! Products become points at the first gazetteer place named in their text.
//! Transport routes become lines from the capital to the first *other*
//! place named, and only when the text mentions the capital at all.
//! Anything that cannot be placed is dropped from the enriched output.

use jingshi_types::{Geometry, LocatedRecord, LonLat, RawRecord};
use tracing::debug;

use crate::gazetteer::Gazetteer;

/// Text keys tried, in order, when locating a product.
pub const PRODUCT_TEXT_FIELDS: &[&str] = &["原文"];
/// Text keys tried, in order, when routing a transport record.
pub const TRANSPORT_TEXT_FIELDS: &[&str] = &["原文", "交通要道"];

/// The fixed origin of every route line and the names that refer to it.
#[derive(Debug, Clone)]
pub struct CapitalReference {
    pub origin: LonLat,
    pub aliases: &'static [&'static str],
}

impl CapitalReference {
    /// 京师, reachable under its older names too.
    pub const BEIJING: Self = Self {
        origin: [116.40, 39.91],
        aliases: &["幽州", "蓟", "蓟城", "大都", "京师"],
    };

    /// Capital at the gazetteer coordinate of `name`, if the table has it.
    pub fn from_gazetteer(
        gazetteer: &Gazetteer,
        name: &str,
        aliases: &'static [&'static str],
    ) -> Option<Self> {
        gazetteer.get(name).map(|e| Self {
            origin: e.coordinate(),
            aliases,
        })
    }

    pub fn is_mentioned_in(&self, text: &str) -> bool {
        self.aliases.iter().any(|a| text.contains(a))
    }
}

impl Default for CapitalReference {
    fn default() -> Self {
        Self::BEIJING
    }
}

/// Outcome of trying to place one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    Located(LocatedRecord),
    Unlocated(RawRecord),
}

impl Enrichment {
    pub fn located(self) -> Option<LocatedRecord> {
        match self {
            Self::Located(r) => Some(r),
            Self::Unlocated(_) => None,
        }
    }
}

/// Place a record at the first gazetteer name in its text.
pub fn enrich_point(gazetteer: &Gazetteer, record: RawRecord, text_fields: &[&str]) -> Enrichment {
    let coordinate = record
        .text_any(text_fields)
        .and_then(|t| gazetteer.locate(t));

    match coordinate {
        Some(coordinate) => Enrichment::Located(LocatedRecord {
            record,
            geometry: Geometry::Point { coordinate },
        }),
        None => Enrichment::Unlocated(record),
    }
}

/// Draw a line from the capital to the first non-capital place in the text.
pub fn enrich_line(
    gazetteer: &Gazetteer,
    capital: &CapitalReference,
    record: RawRecord,
    text_fields: &[&str],
) -> Enrichment {
    let endpoint = record
        .text_any(text_fields)
        .filter(|t| capital.is_mentioned_in(t))
        .and_then(|t| gazetteer.find_excluding(t, capital.aliases));

    match endpoint {
        Some(entry) => {
            let geometry = Geometry::Line {
                line_coords: [capital.origin, entry.coordinate()],
            };
            Enrichment::Located(LocatedRecord { record, geometry })
        }
        None => Enrichment::Unlocated(record),
    }
}

/// Point-enrich every product record, keeping only the located ones.
pub fn enrich_products(gazetteer: &Gazetteer, records: &[RawRecord]) -> Vec<LocatedRecord> {
    let located: Vec<LocatedRecord> = records
        .iter()
        .cloned()
        .filter_map(|r| enrich_point(gazetteer, r, PRODUCT_TEXT_FIELDS).located())
        .collect();
    debug!(total = records.len(), located = located.len(), "products enriched");
    located
}

/// Line-enrich every transport record, keeping only the routable ones.
pub fn enrich_transport(
    gazetteer: &Gazetteer,
    capital: &CapitalReference,
    records: &[RawRecord],
) -> Vec<LocatedRecord> {
    let located: Vec<LocatedRecord> = records
        .iter()
        .cloned()
        .filter_map(|r| enrich_line(gazetteer, capital, r, TRANSPORT_TEXT_FIELDS).located())
        .collect();
    debug!(total = records.len(), located = located.len(), "transport enriched");
    located
}
