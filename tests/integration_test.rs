// Integration tests for semtab: full pipeline runs against in-memory collaborators
use async_trait::async_trait;
use indexmap::IndexMap;
use semtab::config::Settings;
use semtab::runner::BatchRunner;
use semtab_annotate::{
    classify_columns, label_cells, Annotator, AnnotatorConfig, CellContext, Collaborators,
    EntityHeuristic, SubjectIdentifier, SubjectOutcome,
};
use semtab_core::{
    CandidateEntity, ColumnType, EntityScoreKind, Label, LabelSet, Record, Stage, StageSink, Table,
};
use semtab_lookup::{
    ClassInfo, EntitySearch, FallbackLabeler, GraphQuery, LookupError, LookupHit, NerLabeler,
};
use semtab_similarity::{weighted_sum, EntityWeights, SubjectWeights};
use semtab_storage::{load_batch, EntryStatus, RunManifest, StageStore};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

const DBR: &str = "http://dbpedia.org/resource/";
const DBO: &str = "http://dbpedia.org/ontology/";

fn records(rows: &[Value]) -> Vec<Record> {
    rows.iter()
        .map(|row| serde_json::from_value(row.clone()).unwrap())
        .collect()
}

fn resource(name: &str) -> String {
    format!("{}{}", DBR, name)
}

/// Labels known place names GPE; everything else is left to the fallback
struct PlaceLabeler;

#[async_trait]
impl NerLabeler for PlaceLabeler {
    async fn label_span(&self, text: &str) -> semtab_lookup::Result<Option<LabelSet>> {
        let places = ["Paris", "Lyon", "Nice", "Rome"];
        Ok(places
            .contains(&text)
            .then(|| LabelSet::single(Label::Gpe)))
    }
}

struct DictSearch {
    name: &'static str,
    hits: HashMap<&'static str, Vec<LookupHit>>,
}

impl DictSearch {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            hits: HashMap::new(),
        }
    }

    fn with(mut self, query: &'static str, hits: Vec<(&str, &str)>) -> Self {
        self.hits.insert(
            query,
            hits.into_iter()
                .map(|(uri, label)| LookupHit::new(resource(uri), label, ""))
                .collect(),
        );
        self
    }
}

#[async_trait]
impl EntitySearch for DictSearch {
    fn name(&self) -> &str {
        self.name
    }

    async fn search_entities(&self, query: &str) -> semtab_lookup::Result<Vec<LookupHit>> {
        Ok(self.hits.get(query).cloned().unwrap_or_default())
    }
}

/// Cities are populated places; nothing else is typed
struct CityGraph;

#[async_trait]
impl GraphQuery for CityGraph {
    async fn distance_to_class(&self, entity: &str, _: &[String]) -> semtab_lookup::Result<u32> {
        let cities = ["Paris", "Lyon", "Nice"].map(resource);
        Ok(if cities.iter().any(|c| c == entity) { 1 } else { 0 })
    }

    async fn classes_for_entity(&self, entity: &str) -> semtab_lookup::Result<ClassInfo> {
        let mut classes = ClassInfo::new();
        if entity == resource("Paris") || entity == resource("Lyon") {
            classes.insert(format!("{}City", DBO), ("city".into(), String::new()));
        }
        if entity == resource("Paris") {
            classes.insert(
                format!("{}PopulatedPlace", DBO),
                ("populated place".into(), String::new()),
            );
        }
        Ok(classes)
    }

    async fn candidate_classes(&self, _: &str) -> semtab_lookup::Result<Vec<LookupHit>> {
        Ok(Vec::new())
    }
}

struct DownSearch;

#[async_trait]
impl EntitySearch for DownSearch {
    fn name(&self) -> &str {
        "down"
    }

    async fn search_entities(&self, _: &str) -> semtab_lookup::Result<Vec<LookupHit>> {
        Err(LookupError::Status {
            status: 503,
            endpoint: "fake".into(),
        })
    }
}

fn city_search() -> DictSearch {
    DictSearch::new("lookup")
        .with("Paris", vec![("Paris", "Paris"), ("Paris_Hilton", "Paris Hilton")])
        .with("Lyon", vec![("Lyon", "Lyon")])
}

fn collaborators(searches: Vec<Arc<dyn EntitySearch>>) -> Collaborators {
    Collaborators {
        labeler: Arc::new(FallbackLabeler::new(Some(Arc::new(PlaceLabeler))).unwrap()),
        searches,
        graph: Arc::new(CityGraph),
    }
}

fn annotator(config: AnnotatorConfig) -> Annotator {
    Annotator::new(config, collaborators(vec![Arc::new(city_search())])).unwrap()
}

fn assert_type_counts(table: &Table) {
    let count = |t: ColumnType| {
        table
            .columns()
            .iter()
            .filter(|c| c.column_type() == Some(t))
            .count()
    };
    let subjects = count(ColumnType::Subject);
    assert!(subjects <= 1);
    assert_eq!(
        count(ColumnType::Categorical) + count(ColumnType::Literal) + subjects,
        table.columns_number()
    );
}

#[tokio::test]
async fn test_name_age_table() {
    let rows = records(&[
        json!({"Name": "Paris", "Age": "5"}),
        json!({"Name": "Lyon", "Age": "3"}),
    ]);

    let (table, report) = annotator(AnnotatorConfig::default())
        .annotate_records("places", &rows)
        .await
        .unwrap();

    let name = table.column(0).unwrap();
    let age = table.column(1).unwrap();
    for cell in name.cells() {
        assert!(cell.label().unwrap().contains(&Label::Gpe));
    }
    for cell in age.cells() {
        assert!(cell.label().unwrap().contains(&Label::Cardinal));
    }

    assert_eq!(name.column_type(), Some(ColumnType::Subject));
    assert_eq!(age.column_type(), Some(ColumnType::Literal));
    assert_eq!(report.subject.column(), Some(0));
    assert!(matches!(report.subject, SubjectOutcome::Identified { column: 0, .. }));

    let paris = resource("Paris");
    let lyon = resource("Lyon");
    assert_eq!(table.cell(0, 0).unwrap().annotation(), Some(paris.as_str()));
    assert_eq!(table.cell(1, 0).unwrap().annotation(), Some(lyon.as_str()));
    assert_eq!(name.annotation(), Some("http://dbpedia.org/ontology/City"));
    assert_eq!(age.annotation(), Some("http://www.w3.org/2001/XMLSchema#integer"));

    assert_eq!(report.annotated_cells, 2);
    assert_eq!(report.literal_columns, 1);
    assert_type_counts(&table);
}

#[tokio::test]
async fn test_subject_override_forces_column() {
    let rows = records(&[
        json!({"City": "Paris", "Population": "2100000", "Mayor": "Rome"}),
        json!({"City": "Lyon", "Population": "520000", "Mayor": "Nice"}),
    ]);
    let config = AnnotatorConfig {
        subject_column: Some(1),
        ..AnnotatorConfig::default()
    };

    let (table, report) = annotator(config).annotate_records("forced", &rows).await.unwrap();

    assert_eq!(table.subject_column_index(), Some(1));
    assert_eq!(report.subject, SubjectOutcome::Forced { column: 1 });
    assert_eq!(table.column(0).unwrap().column_type(), Some(ColumnType::Categorical));
    assert_eq!(table.column(2).unwrap().column_type(), Some(ColumnType::Categorical));
    assert_type_counts(&table);
}

#[tokio::test]
async fn test_subject_override_out_of_range() {
    let rows = records(&[json!({"City": "Paris"})]);
    let config = AnnotatorConfig {
        subject_column: Some(3),
        ..AnnotatorConfig::default()
    };
    assert!(annotator(config).annotate_records("bad", &rows).await.is_err());
}

/// Fixed string-similarity scores keyed by candidate URI
struct FixedStringScores(HashMap<String, f64>);

#[async_trait]
impl EntityHeuristic for FixedStringScores {
    fn kind(&self) -> EntityScoreKind {
        EntityScoreKind::StringSimilarity
    }

    async fn score(&self, _: &CellContext<'_>, candidates: &[CandidateEntity]) -> Vec<f64> {
        candidates
            .iter()
            .map(|c| self.0.get(&c.uri).copied().unwrap_or(0.0))
            .collect()
    }
}

#[tokio::test]
async fn test_string_similarity_alone_decides_annotation() {
    let search = DictSearch::new("lookup").with(
        "Paris",
        vec![("Paris_Hilton", "Paris Hilton"), ("Paris", "Paris"), ("Paris,_Texas", "Paris, Texas")],
    );
    let scores: HashMap<String, f64> = [("Paris_Hilton", 0.5), ("Paris", 0.9), ("Paris,_Texas", 0.2)]
        .into_iter()
        .map(|(uri, score)| (resource(uri), score))
        .collect();

    struct FlatGraph;

    #[async_trait]
    impl GraphQuery for FlatGraph {
        async fn distance_to_class(&self, _: &str, _: &[String]) -> semtab_lookup::Result<u32> {
            Ok(0)
        }

        async fn classes_for_entity(&self, _: &str) -> semtab_lookup::Result<ClassInfo> {
            Ok(ClassInfo::new())
        }

        async fn candidate_classes(&self, _: &str) -> semtab_lookup::Result<Vec<LookupHit>> {
            Ok(Vec::new())
        }
    }

    let collaborators = Collaborators {
        labeler: Arc::new(FallbackLabeler::new(Some(Arc::new(PlaceLabeler))).unwrap()),
        searches: vec![Arc::new(search)],
        graph: Arc::new(FlatGraph),
    };
    let annotator = Annotator::new(AnnotatorConfig::default(), collaborators)
        .unwrap()
        .with_entity_heuristic(Arc::new(FixedStringScores(scores.clone())));

    let rows = records(&[json!({"Name": "Paris"})]);
    let (table, _) = annotator.annotate_records("single", &rows).await.unwrap();

    let cell = table.cell(0, 0).unwrap();
    let candidates = cell.candidate_entities().unwrap();
    assert_eq!(candidates.len(), 3);
    for candidate in candidates {
        let expected = scores[&candidate.uri];
        assert!((candidate.final_score().unwrap() - expected).abs() < 1e-9);
    }
    assert_eq!(cell.annotation(), Some(resource("Paris").as_str()));
}

#[tokio::test]
async fn test_overlapping_sources_merge_first_seen() {
    let first = DictSearch::new("lookup").with(
        "Paris",
        vec![("Paris", "Paris (city)"), ("Paris,_Texas", "Paris, Texas")],
    );
    let second = DictSearch::new("sparql").with(
        "Paris",
        vec![("Paris", "Paris, France"), ("Paris_Hilton", "Paris Hilton")],
    );
    let annotator = Annotator::new(
        AnnotatorConfig::default(),
        collaborators(vec![Arc::new(first), Arc::new(second)]),
    )
    .unwrap();

    let rows = records(&[json!({"Name": "Paris"})]);
    let (table, report) = annotator.annotate_records("merged", &rows).await.unwrap();

    let candidates = table.cell(0, 0).unwrap().candidate_entities().unwrap();
    let uris: Vec<&str> = candidates.iter().map(|c| c.uri.as_str()).collect();
    assert_eq!(
        uris,
        vec![
            resource("Paris").as_str(),
            resource("Paris,_Texas").as_str(),
            resource("Paris_Hilton").as_str()
        ]
    );
    assert_eq!(candidates[0].label, "Paris (city)");
    assert_eq!(report.candidates.failed_lookups, 0);
}

#[tokio::test]
async fn test_failing_source_does_not_abort_table() {
    let annotator = Annotator::new(
        AnnotatorConfig::default(),
        collaborators(vec![Arc::new(DownSearch), Arc::new(city_search())]),
    )
    .unwrap();

    let rows = records(&[json!({"Name": "Paris"}), json!({"Name": "Lyon"})]);
    let (table, report) = annotator.annotate_records("partial", &rows).await.unwrap();

    assert_eq!(report.annotated_cells, 2);
    assert!(report.candidates.failed_lookups >= 2);
    assert_eq!(table.cell(1, 0).unwrap().annotation(), Some(resource("Lyon").as_str()));
}

#[tokio::test]
async fn test_classification_is_idempotent() {
    let rows = records(&[
        json!({"Name": "Paris", "Code": "75", "Note": "capital"}),
        json!({"Name": "Lyon", "Code": "69", "Note": null}),
    ]);
    let mut table = Table::from_records("twice", &rows).unwrap();
    let labeler = FallbackLabeler::new(Some(Arc::new(PlaceLabeler))).unwrap();
    label_cells(&mut table, &labeler, 2).await.unwrap();

    classify_columns(&mut table).unwrap();
    let first: Vec<_> = table.columns().iter().map(|c| c.column_type()).collect();
    classify_columns(&mut table).unwrap();
    let second: Vec<_> = table.columns().iter().map(|c| c.column_type()).collect();

    assert_eq!(first, second);
    assert_type_counts(&table);
}

#[tokio::test]
async fn test_subject_identification_is_deterministic() {
    let rows = records(&[
        json!({"Home": "Paris", "Away": "Lyon"}),
        json!({"Home": "Nice", "Away": "Rome"}),
    ]);
    let mut base = Table::from_records("derby", &rows).unwrap();
    let labeler = FallbackLabeler::new(Some(Arc::new(PlaceLabeler))).unwrap();
    label_cells(&mut base, &labeler, 1).await.unwrap();
    classify_columns(&mut base).unwrap();

    let identifier = SubjectIdentifier::new(SubjectWeights::default(), 10.0).unwrap();
    let chosen: Vec<Option<usize>> = (0..5)
        .map(|_| {
            let mut table = base.clone();
            identifier.identify(&mut table, None).unwrap();
            table.subject_column_index()
        })
        .collect();

    // same content in both columns; the leftmost wins every run
    assert!(chosen.iter().all(|c| *c == Some(0)));
}

#[test]
fn test_raising_one_score_never_lowers_final_score() {
    let weights = EntityWeights::default();
    let kinds = [
        EntityScoreKind::StringSimilarity,
        EntityScoreKind::NerBasedSimilarity,
        EntityScoreKind::HeadingBasedSimilarity,
        EntityScoreKind::EntityEmbeddingsBasedSimilarity,
        EntityScoreKind::ContextBasedSimilarity,
    ];
    let base = [0.3, 0.0, 0.7, 0.1, 0.5];

    for (raised, kind) in kinds.iter().enumerate() {
        let mut low = CandidateEntity::new(resource("X"), "X", "");
        let mut high = CandidateEntity::new(resource("X"), "X", "");
        for (i, k) in kinds.iter().enumerate() {
            low.record(*k, base[i]).unwrap();
            let bump = if i == raised { 0.25 } else { 0.0 };
            high.record(*k, base[i] + bump).unwrap();
        }
        assert!(
            weighted_sum(&high, &weights) >= weighted_sum(&low, &weights),
            "raising {:?} lowered the final score",
            kind
        );
    }
}

#[test]
fn test_cleared_table_round_trip() {
    let rows = records(&[
        json!({"Name": " Paris&nbsp;", "Age": 5, "Note": ""}),
        json!({"Name": "Lyon\u{200b}", "Age": null, "Note": "a  b"}),
    ]);
    let table = Table::from_records("trip", &rows).unwrap();
    let cleared = table.cleared_records();

    let text = serde_json::to_string(&cleared).unwrap();
    let decoded: Vec<IndexMap<String, Option<String>>> = serde_json::from_str(&text).unwrap();
    let reloaded = Table::from_cleared_records("trip", &decoded).unwrap();

    assert_eq!(reloaded.cleared_records(), cleared);
    assert_eq!(cleared[0]["Note"], None);
}

#[test]
fn test_malformed_input_fails_before_any_stage() {
    assert!(Table::from_records("empty", &[]).is_err());
    assert!(Table::from_records("keyless", &records(&[json!({}), json!({})])).is_err());
    let ragged = records(&[json!({"A": "1", "B": "2"}), json!({"A": "3"})]);
    assert!(Table::from_records("ragged", &ragged).is_err());
}

#[tokio::test]
async fn test_stage_files_follow_pipeline() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(StageStore::new(dir.path()).unwrap());
    let annotator = annotator(AnnotatorConfig::default()).with_sink(store.clone() as Arc<dyn StageSink>);

    let rows = records(&[
        json!({"Name": "Paris", "Age": "5"}),
        json!({"Name": "Lyon", "Age": "3"}),
    ]);
    let (table, _) = annotator.annotate_records("places", &rows).await.unwrap();

    assert_eq!(store.written_stages("places"), Stage::ALL.to_vec());
    let reloaded = store.load_table("places").unwrap().unwrap();
    assert_eq!(reloaded, table);
}

#[tokio::test]
async fn test_batch_continues_past_bad_inputs() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    std::fs::write(
        input.path().join("a_places.json"),
        r#"[{"Name": "Paris", "Age": "5"}, {"Name": "Lyon", "Age": "3"}]"#,
    )
    .unwrap();
    std::fs::write(input.path().join("b_broken.json"), "[{").unwrap();
    std::fs::write(input.path().join("c_ragged.json"), r#"[{"A": "1", "B": "2"}, {"A": "3"}]"#).unwrap();

    let settings = Settings::default();
    let runner = BatchRunner::new(
        &settings,
        collaborators(vec![Arc::new(city_search())]),
        output.path(),
    )
    .unwrap();

    let batch = load_batch(input.path()).unwrap();
    let manifest = runner.run(batch).await.unwrap();

    assert_eq!(manifest.count(EntryStatus::Annotated), 1);
    assert_eq!(manifest.count(EntryStatus::Failed), 1);
    assert_eq!(manifest.count(EntryStatus::Skipped), 1);

    let written = RunManifest::load(output.path()).unwrap();
    assert_eq!(written.entries.len(), 3);
    assert!(output.path().join("a_places").join("table.json").exists());
}
