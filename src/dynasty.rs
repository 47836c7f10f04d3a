//! Dynasty label normalization.
//!
//! Source datasets label periods inconsistently ("唐", "唐代", "明万历年间",
//! "南北朝时期", …). Every label is folded onto one of the seven canonical
//! [`Dynasty`] buckets by alias substring match; the table order decides
//! which bucket wins when a label mentions several.

use jingshi_types::{Dynasty, DynastyFilter, RawRecord};

/// Aliases that fold onto one canonical dynasty.
pub struct DynastyAlias {
    pub dynasty: Dynasty,
    pub aliases: &'static [&'static str],
}

/// Canonical dynasties with their surface forms, in canonical order.
pub static DYNASTY_ALIASES: &[DynastyAlias] = &[
    DynastyAlias {
        dynasty: Dynasty::QinHan,
        aliases: &["秦", "汉"],
    },
    DynastyAlias {
        dynasty: Dynasty::SixDynasties,
        aliases: &["三国", "魏", "蜀", "吴", "晋", "南北朝"],
    },
    DynastyAlias {
        dynasty: Dynasty::SuiTang,
        aliases: &["隋", "唐", "五代"],
    },
    DynastyAlias {
        dynasty: Dynasty::LiaoSongXiaJin,
        aliases: &["辽", "宋", "夏", "金"],
    },
    DynastyAlias {
        dynasty: Dynasty::Yuan,
        aliases: &["元"],
    },
    DynastyAlias {
        dynasty: Dynasty::Ming,
        aliases: &["明", "万历", "天启", "崇祯", "洪武", "永乐"],
    },
    DynastyAlias {
        dynasty: Dynasty::Qing,
        aliases: &["清", "康熙", "雍正", "乾隆"],
    },
];

/// Field holding the period label in the Chinese-keyed datasets.
pub const PERIOD_FIELD: &str = "时期";
/// Field holding the period label in the disaster/war/event datasets.
pub const DYNASTY_FIELD: &str = "dynasty";

/// Resolve a raw period label to its canonical dynasty.
///
/// Returns `None` for empty or unrecognised labels; callers drop those
/// records from any dynasty-keyed aggregate.
pub fn normalize(raw: &str) -> Option<Dynasty> {
    if raw.is_empty() {
        return None;
    }
    DYNASTY_ALIASES
        .iter()
        .find(|entry| {
            raw == entry.dynasty.as_chinese() || entry.aliases.iter().any(|a| raw.contains(a))
        })
        .map(|entry| entry.dynasty)
}

/// Normalize the label stored in `field`, if the record has one.
pub fn record_dynasty(record: &RawRecord, field: &str) -> Option<Dynasty> {
    record.text(field).and_then(normalize)
}

/// Build the selectable dynasty list: "总" first, then every dynasty that
/// any label resolves to, deduplicated, in canonical order.
pub fn dynasty_list<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<DynastyFilter> {
    let mut found: Vec<Dynasty> = labels.into_iter().filter_map(normalize).collect();
    found.sort();
    found.dedup();

    std::iter::once(DynastyFilter::All)
        .chain(found.into_iter().map(DynastyFilter::Only))
        .collect()
}

/// Keep the records whose `field` label falls under `filter`.
/// Records with missing or unknown labels only survive `All`.
pub fn filter_by_dynasty<'a>(
    records: &'a [RawRecord],
    field: &str,
    filter: DynastyFilter,
) -> Vec<&'a RawRecord> {
    records
        .iter()
        .filter(|r| filter.matches(record_dynasty(r, field)))
        .collect()
}

/// Selection helpers that need the alias table.
pub trait DynastyFilterExt {
    fn matches(&self, dynasty: Option<Dynasty>) -> bool;

    /// Keep `self` if it is still offered; otherwise prefer 元, then the
    /// first available entry.
    fn reconcile(self, available: &[DynastyFilter]) -> DynastyFilter;
}

impl DynastyFilterExt for DynastyFilter {
    fn matches(&self, dynasty: Option<Dynasty>) -> bool {
        match self {
            DynastyFilter::All => true,
            DynastyFilter::Only(d) => dynasty == Some(*d),
        }
    }

    fn reconcile(self, available: &[DynastyFilter]) -> DynastyFilter {
        if available.is_empty() || available.contains(&self) {
            return self;
        }
        let yuan = DynastyFilter::Only(Dynasty::Yuan);
        if available.contains(&yuan) {
            yuan
        } else {
            available[0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: serde_json::Value) -> RawRecord {
        RawRecord::from(v)
    }

    #[test]
    fn test_normalize_canonical_names() {
        for d in Dynasty::ALL {
            assert_eq!(normalize(d.as_chinese()), Some(d));
        }
    }

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize("唐"), Some(Dynasty::SuiTang));
        assert_eq!(normalize("唐代"), Some(Dynasty::SuiTang));
        assert_eq!(normalize("东汉"), Some(Dynasty::QinHan));
        assert_eq!(normalize("北魏"), Some(Dynasty::SixDynasties));
        assert_eq!(normalize("明万历年间"), Some(Dynasty::Ming));
        assert_eq!(normalize("乾隆年间"), Some(Dynasty::Qing));
        assert_eq!(normalize("元代"), Some(Dynasty::Yuan));
    }

    #[test]
    fn test_normalize_every_alias_resolves_to_owner_or_earlier() {
        for entry in DYNASTY_ALIASES {
            for alias in entry.aliases {
                let got = normalize(alias).unwrap();
                // an earlier row can claim a label first, never a later one
                assert!(got <= entry.dynasty, "{alias} -> {got}");
            }
        }
    }

    #[test]
    fn test_normalize_table_order_decides() {
        // 宋 is a 辽宋夏金 alias, but 南北朝 is checked first
        assert_eq!(normalize("南北朝宋"), Some(Dynasty::SixDynasties));
        // 金 and 元 both appear; 辽宋夏金 precedes 元
        assert_eq!(normalize("金元之际"), Some(Dynasty::LiaoSongXiaJin));
    }

    #[test]
    fn test_normalize_unknown() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("民国"), None);
        assert_eq!(normalize("新石器时代"), None);
    }

    #[test]
    fn test_dynasty_list_ordered_with_total() {
        let list = dynasty_list(["清", "唐", "民国", "乾隆", "元代", "汉"]);
        assert_eq!(
            list,
            vec![
                DynastyFilter::All,
                DynastyFilter::Only(Dynasty::QinHan),
                DynastyFilter::Only(Dynasty::SuiTang),
                DynastyFilter::Only(Dynasty::Yuan),
                DynastyFilter::Only(Dynasty::Qing),
            ]
        );
    }

    #[test]
    fn test_filter_by_dynasty() {
        let records = vec![
            rec(json!({"时期": "唐", "名称": "a"})),
            rec(json!({"时期": "民国", "名称": "b"})),
            rec(json!({"名称": "c"})),
            rec(json!({"时期": "五代", "名称": "d"})),
        ];
        assert_eq!(filter_by_dynasty(&records, PERIOD_FIELD, DynastyFilter::All).len(), 4);

        let tang = filter_by_dynasty(&records, PERIOD_FIELD, DynastyFilter::Only(Dynasty::SuiTang));
        let names: Vec<_> = tang.iter().filter_map(|r| r.text("名称")).collect();
        assert_eq!(names, vec!["a", "d"]);

        assert!(filter_by_dynasty(&records, PERIOD_FIELD, DynastyFilter::Only(Dynasty::Qing)).is_empty());
    }

    #[test]
    fn test_record_dynasty_non_string_label() {
        let r = rec(json!({"时期": 1368}));
        assert_eq!(record_dynasty(&r, PERIOD_FIELD), None);
    }

    #[test]
    fn test_reconcile() {
        let avail = dynasty_list(["唐", "元", "明"]);
        let ming = DynastyFilter::Only(Dynasty::Ming);
        assert_eq!(ming.reconcile(&avail), ming);
        assert_eq!(DynastyFilter::All.reconcile(&avail), DynastyFilter::All);

        let qing = DynastyFilter::Only(Dynasty::Qing);
        assert_eq!(qing.reconcile(&avail), DynastyFilter::Only(Dynasty::Yuan));

        let no_yuan = dynasty_list(["唐"]);
        assert_eq!(qing.reconcile(&no_yuan), DynastyFilter::All);
    }
}
