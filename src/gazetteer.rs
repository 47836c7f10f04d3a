//! Static place-name dictionary for Beijing-area geocoding.
//!
//! Lookup is a plain substring scan in table order: the first entry whose
//! name occurs anywhere in the text wins. There is no longest-match
//! preference, so overlapping names (蓟 / 蓟城) resolve by position in the
//! table, not by which is more specific.

use jingshi_types::LonLat;

/// One named place and its approximate centre point.
#[derive(Debug, Clone, PartialEq)]
pub struct GazetteerEntry {
    pub name: &'static str,
    pub lon: f64,
    pub lat: f64,
}

impl GazetteerEntry {
    pub fn coordinate(&self) -> LonLat {
        [self.lon, self.lat]
    }
}

const fn place(name: &'static str, lon: f64, lat: f64) -> GazetteerEntry {
    GazetteerEntry { name, lon, lat }
}

/// Historical and modern names, in match-priority order.
/// Ancient names cover a wide area; the coordinate is a rough centre.
pub static BEIJING_PLACES: &[GazetteerEntry] = &[
    // ── 古称 ──
    place("蓟", 116.38, 39.95),
    place("蓟城", 116.38, 39.95),
    place("燕京", 116.40, 39.92),
    place("幽州", 116.35, 39.93),
    place("大都", 116.40, 39.94),
    place("中都", 116.35, 39.88),
    place("析津", 116.38, 39.91),
    place("京师", 116.40, 39.91),
    place("北平", 116.40, 39.91),
    place("顺天府", 116.41, 39.91),
    // ── 近郊与关隘 ──
    place("通州", 116.66, 39.91),
    place("西郊机场", 116.27, 39.95),
    place("卢沟桥", 116.22, 39.85),
    place("居庸关", 116.07, 40.29),
    place("古北口", 117.15, 40.68),
    // ── 远方城市 ──
    place("长安", 108.95, 34.26), // 西安
    place("扬州", 119.42, 32.39),
    place("太原", 112.55, 37.87),
];

/// Immutable name → coordinate table. Build once, share by reference.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::beijing()
    }
}

impl Gazetteer {
    pub fn beijing() -> Self {
        Self::new(BEIJING_PLACES.to_vec())
    }

    /// Entries are matched in the order given.
    pub fn new(entries: Vec<GazetteerEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }

    /// Exact name lookup.
    pub fn get(&self, name: &str) -> Option<&GazetteerEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// First entry (in table order) whose name occurs in `text`.
    pub fn find(&self, text: &str) -> Option<&GazetteerEntry> {
        self.find_excluding(text, &[])
    }

    /// Like [`find`](Self::find), but never returns an entry named in `exclude`.
    pub fn find_excluding(&self, text: &str, exclude: &[&str]) -> Option<&GazetteerEntry> {
        if text.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .filter(|e| !exclude.contains(&e.name))
            .find(|e| text.contains(e.name))
    }

    /// Coordinate of the first matching place name, if any.
    pub fn locate(&self, text: &str) -> Option<LonLat> {
        self.find(text).map(GazetteerEntry::coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_simple() {
        let g = Gazetteer::beijing();
        assert_eq!(g.locate("运河抵通州张家湾"), Some([116.66, 39.91]));
        assert_eq!(g.locate("居庸关外"), Some([116.07, 40.29]));
    }

    #[test]
    fn test_locate_none() {
        let g = Gazetteer::beijing();
        assert_eq!(g.locate(""), None);
        assert_eq!(g.locate("产于江南"), None);
    }

    #[test]
    fn test_table_order_beats_text_order() {
        // 扬州 appears first in the text, but 幽州 comes first in the table
        let g = Gazetteer::beijing();
        let hit = g.find("扬州货物北运幽州").unwrap();
        assert_eq!(hit.name, "幽州");
    }

    #[test]
    fn test_shorter_overlapping_name_wins_by_order() {
        // 蓟 precedes 蓟城 in the table, so the shorter name is reported
        let g = Gazetteer::beijing();
        assert_eq!(g.find("蓟城").unwrap().name, "蓟");
    }

    #[test]
    fn test_locate_matches_first_substring_entry() {
        let g = Gazetteer::beijing();
        let texts = ["卢沟桥与太原", "长安至扬州", "北平顺天府", "无地名", "古北口"];
        for text in texts {
            let expected = g
                .entries()
                .iter()
                .find(|e| text.contains(e.name))
                .map(|e| e.coordinate());
            assert_eq!(g.locate(text), expected, "text: {text}");
        }
    }

    #[test]
    fn test_find_excluding_skips_names() {
        let g = Gazetteer::beijing();
        let hit = g.find_excluding("蓟至太原", &["蓟"]).unwrap();
        assert_eq!(hit.name, "太原");
        assert!(g.find_excluding("京师", &["京师"]).is_none());
    }

    #[test]
    fn test_custom_table() {
        let g = Gazetteer::new(vec![place("甲", 1.0, 2.0), place("甲乙", 3.0, 4.0)]);
        assert_eq!(g.locate("甲乙"), Some([1.0, 2.0]));
        assert_eq!(g.get("甲乙").map(GazetteerEntry::coordinate), Some([3.0, 4.0]));
    }
}
