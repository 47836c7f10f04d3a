//! Load every source dataset and derive the structured output.
//!
//! All reads are issued at once and joined; nothing derived is computed
//! until every read has settled. A source that fails to load is logged and
//! replaced by an empty collection, so one bad file never blanks the site.

use std::collections::BTreeMap;
use std::path::PathBuf;

use futures::future::join_all;
use jingshi_types::{ImpactEvent, RawRecord, StructuredDataset};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AtlasConfig;
use crate::dynasty::{DYNASTY_FIELD, PERIOD_FIELD, dynasty_list};
use crate::error::{AtlasError, Result};
use crate::gazetteer::Gazetteer;
use crate::geo::{CapitalReference, enrich_products, enrich_transport};
use crate::metrics::{
    TextFields, extract_admin_divisions, extract_climate, extract_population, extract_vegetation,
};
use crate::sources::{DataSource, scan_data_dir};
use crate::water::extract_water_events;

pub type RawCollections = BTreeMap<DataSource, Vec<RawRecord>>;

/// Read one file and return its records. Array elements that are not JSON
/// objects are skipped.
async fn read_source(source: DataSource, path: Option<PathBuf>) -> Result<Vec<RawRecord>> {
    let path = path.ok_or_else(|| AtlasError::SourceMissing(source.file_name().to_string()))?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| AtlasError::Io {
        path: path.clone(),
        source: e,
    })?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|e| AtlasError::Json {
        path: path.clone(),
        source: e,
    })?;
    let Value::Array(items) = value else {
        return Err(AtlasError::NotAnArray(path));
    };

    let total = items.len();
    let records: Vec<RawRecord> = items
        .into_iter()
        .filter(Value::is_object)
        .map(RawRecord::from)
        .collect();
    if records.len() < total {
        debug!(
            source = source.key(),
            skipped = total - records.len(),
            "non-object entries skipped"
        );
    }
    Ok(records)
}

/// [`read_source`], with failure turned into an empty collection.
async fn load_source(source: DataSource, path: Option<PathBuf>) -> Vec<RawRecord> {
    match read_source(source, path).await {
        Ok(records) => {
            debug!(source = source.key(), records = records.len(), "dataset loaded");
            records
        }
        Err(e) => {
            warn!(source = source.key(), error = %e, "dataset failed to load; using empty collection");
            Vec::new()
        }
    }
}

/// Concurrently load `sources` from the configured data directory.
///
/// Only a missing data directory is an error; individual files degrade to
/// empty collections.
pub async fn load_sources(config: &AtlasConfig, sources: &[DataSource]) -> Result<RawCollections> {
    if !config.data_dir.is_dir() {
        return Err(AtlasError::DataDir(config.data_dir.clone()));
    }
    let index = scan_data_dir(&config.data_dir);

    let loads = sources.iter().map(|&source| {
        let path = index.get(source.file_name()).cloned();
        async move { (source, load_source(source, path).await) }
    });

    Ok(join_all(loads).await.into_iter().collect())
}

/// Load every known source and derive the full dataset.
pub async fn load_all(
    config: &AtlasConfig,
    gazetteer: &Gazetteer,
    capital: &CapitalReference,
) -> Result<StructuredDataset> {
    info!(data_dir = %config.data_dir.display(), "loading datasets");
    let raw = load_sources(config, &DataSource::ALL).await?;

    let empty = raw.values().filter(|r| r.is_empty()).count();
    info!(sources = raw.len(), empty, "all datasets settled");

    Ok(build_dataset(raw, gazetteer, capital))
}

/// Tag disasters, wars and events and concatenate them, in that order.
/// A record's own `type` field is replaced by the tag.
pub fn merge_impact_events(
    disasters: &[RawRecord],
    wars: &[RawRecord],
    events: &[RawRecord],
) -> Vec<ImpactEvent> {
    disasters
        .iter()
        .cloned()
        .map(ImpactEvent::disaster)
        .chain(wars.iter().cloned().map(ImpactEvent::war))
        .chain(events.iter().cloned().map(ImpactEvent::event))
        .collect()
}

/// Run every extractor and the geo-enrichment over already-loaded data.
pub fn build_dataset(
    raw: RawCollections,
    gazetteer: &Gazetteer,
    capital: &CapitalReference,
) -> StructuredDataset {
    let get = |s: DataSource| raw.get(&s).map(Vec::as_slice).unwrap_or(&[]);

    let population = extract_population(get(DataSource::Population), &TextFields::SOURCE_TEXT);
    let admin_divisions = extract_admin_divisions(get(DataSource::Governance), &TextFields::ADMIN);
    let climate = extract_climate(get(DataSource::Climate), &TextFields::SOURCE_TEXT);
    let vegetation = extract_vegetation(get(DataSource::Vegetation), &TextFields::SOURCE_TEXT);
    let water_events = extract_water_events(get(DataSource::WaterSystems));

    let products = enrich_products(gazetteer, get(DataSource::Products));
    let transport = enrich_transport(gazetteer, capital, get(DataSource::Transport));

    let impact_events = merge_impact_events(
        get(DataSource::Disasters),
        get(DataSource::Wars),
        get(DataSource::Events),
    );

    let period_labels = get(DataSource::Population)
        .iter()
        .chain(transport.iter().map(|l| &l.record))
        .chain(products.iter().map(|l| &l.record))
        .filter_map(|r| r.text(PERIOD_FIELD));
    let event_labels = impact_events
        .iter()
        .filter_map(|e| e.record().text(DYNASTY_FIELD));
    let dynasties = dynasty_list(period_labels.chain(event_labels));

    info!(
        population = population.len(),
        admin = admin_divisions.len(),
        climate = climate.len(),
        vegetation = vegetation.len(),
        water = water_events.len(),
        products = products.len(),
        transport = transport.len(),
        impact_events = impact_events.len(),
        "dataset derived"
    );

    let raw = raw
        .into_iter()
        .map(|(source, records)| (source.key().to_string(), records))
        .collect();

    StructuredDataset {
        dynasties,
        population,
        admin_divisions,
        climate,
        vegetation,
        water_events,
        products,
        transport,
        impact_events,
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jingshi_types::{Dynasty, DynastyFilter};
    use serde_json::json;
    use std::path::Path;

    fn write(dir: &Path, source: DataSource, body: &str) {
        std::fs::write(dir.join(source.file_name()), body).unwrap();
    }

    fn config(dir: &Path) -> AtlasConfig {
        AtlasConfig {
            data_dir: dir.to_path_buf(),
            output_dir: dir.join("out"),
        }
    }

    #[tokio::test]
    async fn test_load_all_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path();
        write(d, DataSource::Climate, &json!([
            {"时期": "唐", "原文": "唐代降水量600毫米，平均气温10.5℃", "出处": "气候志"}
        ]).to_string());
        write(d, DataSource::Population, &json!([
            {"时期": "元", "原文": "大都有10万户 40万人", "出处": "元史"},
            {"时期": "未知", "原文": "5万人"}
        ]).to_string());
        write(d, DataSource::Products, &json!([
            {"时期": "明", "原文": "通州产"},
            {"时期": "清", "原文": "无地名"}
        ]).to_string());
        write(d, DataSource::Transport, &json!([
            {"时期": "金", "原文": "中都至太原"},
            {"时期": "清", "原文": "京师至扬州"}
        ]).to_string());
        write(d, DataSource::Disasters, &json!([{"dynasty": "汉", "name": "大水"}]).to_string());
        write(d, DataSource::Wars, &json!([{"dynasty": "明", "name": "土木之变"}]).to_string());
        write(d, DataSource::Events, &json!([{"name": "无朝代"}]).to_string());
        // broken inputs degrade to empty collections
        write(d, DataSource::Vegetation, "{not json");
        write(d, DataSource::Governance, "{}");

        let ds = load_all(&config(d), &Gazetteer::beijing(), &CapitalReference::BEIJING)
            .await
            .unwrap();

        assert_eq!(ds.climate[&Dynasty::SuiTang].temp, Some(10.5));
        assert_eq!(ds.population[&Dynasty::Yuan].people, 400_000);
        assert_eq!(ds.population.len(), 1);
        assert!(ds.vegetation.is_empty());
        assert!(ds.admin_divisions.is_empty());
        assert_eq!(ds.products.len(), 1);
        assert_eq!(ds.transport.len(), 1);
        assert_eq!(ds.raw.len(), DataSource::ALL.len());
        assert!(ds.raw["people"].is_empty());

        let kinds: Vec<_> = ds.impact_events.iter().map(|e| e.kind_zh()).collect();
        assert_eq!(kinds, vec!["灾害", "战争", "事件"]);

        // 金 is dropped with its unroutable transport record
        assert_eq!(
            ds.dynasties,
            vec![
                DynastyFilter::All,
                DynastyFilter::Only(Dynasty::QinHan),
                DynastyFilter::Only(Dynasty::Yuan),
                DynastyFilter::Only(Dynasty::Ming),
                DynastyFilter::Only(Dynasty::Qing),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_data_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir.path().join("absent"));
        let res = load_all(&cfg, &Gazetteer::beijing(), &CapitalReference::BEIJING).await;
        assert!(matches!(res, Err(AtlasError::DataDir(_))));
    }

    #[tokio::test]
    async fn test_empty_dir_yields_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let ds = load_all(&config(dir.path()), &Gazetteer::beijing(), &CapitalReference::BEIJING)
            .await
            .unwrap();
        assert_eq!(ds.dynasties, vec![DynastyFilter::All]);
        assert!(ds.impact_events.is_empty());
        assert!(ds.raw.values().all(Vec::is_empty));
    }

    #[tokio::test]
    async fn test_read_source_skips_non_objects() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), DataSource::Culture, r#"[{"a": 1}, 2, "x", {"b": 2}]"#);
        let path = dir.path().join(DataSource::Culture.file_name());
        let records = read_source(DataSource::Culture, Some(path)).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_read_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), DataSource::Culture, r#"{"a": 1}"#);
        let path = dir.path().join(DataSource::Culture.file_name());
        assert!(matches!(
            read_source(DataSource::Culture, Some(path)).await,
            Err(AtlasError::NotAnArray(_))
        ));
        assert!(matches!(
            read_source(DataSource::Culture, None).await,
            Err(AtlasError::SourceMissing(_))
        ));
    }

    #[test]
    fn test_impact_events_overwrite_existing_type() {
        let d = vec![RawRecord::from(json!({"dynasty": "明", "type": "水灾"}))];
        let e = vec![RawRecord::from(json!({"type": "庆典"}))];
        let merged = merge_impact_events(&d, &[], &e);

        let v = serde_json::to_value(&merged).unwrap();
        assert_eq!(v[0]["type"], "disaster");
        assert_eq!(v[1]["type"], "event");

        let text = serde_json::to_string(&merged).unwrap();
        let back: Vec<ImpactEvent> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, merged);
    }

    #[test]
    fn test_impact_events_tagged() {
        let d = vec![RawRecord::from(json!({"dynasty": "明", "名称": "地震"}))];
        let w = vec![RawRecord::from(json!({"dynasty": "金"}))];
        let merged = merge_impact_events(&d, &w, &[]);
        let v = serde_json::to_value(&merged).unwrap();
        assert_eq!(
            v,
            json!([
                {"type": "disaster", "dynasty": "明", "名称": "地震"},
                {"type": "war", "dynasty": "金"}
            ])
        );
    }
}
