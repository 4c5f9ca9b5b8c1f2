use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use menu_seeder::config::TableNames;
use menu_seeder::error::{RemoteError, SeedError};
use menu_seeder::logic::{AssetIngest, Phase, SeedOrchestrator};
use menu_seeder::model::{
    generate_id, Blob, CategorySeed, CustomisationSeed, Id, MenuItemSeed, Row, SeedDataset,
};
use menu_seeder::seed;
use menu_seeder::store::{BlobStore, MemoryStore, RowStore};

/// Ingest double: stores one blob per call like the real ingestor, without
/// the HTTP download, and can be told to fail for a given source URL.
struct StubIngestor {
    blobs: Arc<MemoryStore>,
    fail_url: Option<String>,
}

impl StubIngestor {
    fn new(blobs: Arc<MemoryStore>) -> Self {
        Self {
            blobs,
            fail_url: None,
        }
    }

    fn failing_for(blobs: Arc<MemoryStore>, url: &str) -> Self {
        Self {
            blobs,
            fail_url: Some(url.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl AssetIngest for StubIngestor {
    async fn ingest(&self, source_url: &str) -> Result<String, SeedError> {
        if self.fail_url.as_deref() == Some(source_url) {
            return Err(SeedError::Download {
                url: source_url.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        let blob = self
            .blobs
            .create_blob(&generate_id(), "image.png", vec![1, 2, 3], "image/png")
            .await
            .map_err(SeedError::Remote)?;
        Ok(self.blobs.view_url(&blob.id))
    }
}

/// Row store wrapper that can fire a cancellation token or stall on chosen
/// create calls, to observe the orchestrator mid-phase. The wrapped call
/// itself always goes through.
struct InstrumentedRows {
    inner: Arc<MemoryStore>,
    cancel_on_table: Option<(String, CancellationToken)>,
    delay_row_named: Option<(String, Duration)>,
}

impl InstrumentedRows {
    fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            cancel_on_table: None,
            delay_row_named: None,
        }
    }
}

#[async_trait::async_trait]
impl RowStore for InstrumentedRows {
    async fn list_rows(&self, table: &str) -> Result<Vec<Row>, RemoteError> {
        self.inner.list_rows(table).await
    }

    async fn create_row(&self, table: &str, id: &Id, fields: Value) -> Result<Row, RemoteError> {
        if let Some((name, delay)) = &self.delay_row_named {
            if fields.get("name").and_then(|v| v.as_str()) == Some(name) {
                tokio::time::sleep(*delay).await;
            }
        }
        if let Some((trigger, token)) = &self.cancel_on_table {
            if table == trigger {
                token.cancel();
            }
        }
        self.inner.create_row(table, id, fields).await
    }

    async fn delete_row(&self, table: &str, id: &Id) -> Result<(), RemoteError> {
        self.inner.delete_row(table, id).await
    }
}

fn orchestrator(store: &Arc<MemoryStore>, ingestor: StubIngestor) -> SeedOrchestrator {
    SeedOrchestrator::new(
        store.clone(),
        store.clone(),
        Arc::new(ingestor),
        TableNames::default(),
        4,
    )
}

fn small_dataset() -> SeedDataset {
    SeedDataset {
        categories: vec![CategorySeed {
            name: "Burgers".to_string(),
            description: "Grilled burgers".to_string(),
        }],
        customisations: vec![CustomisationSeed {
            name: "Fries".to_string(),
            price: 2.5,
            kind: "side".to_string(),
        }],
        menu: vec![MenuItemSeed {
            name: "Cheeseburger".to_string(),
            description: "The classic".to_string(),
            image_url: "https://cdn.example.com/cheeseburger.png".to_string(),
            price: 8.99,
            rating: 4.5,
            calories: 550,
            protein: 25,
            category_name: "Burgers".to_string(),
            customisations: vec!["Fries".to_string()],
        }],
    }
}

#[tokio::test]
async fn full_run_creates_exact_counts_with_valid_references() {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = orchestrator(&store, StubIngestor::new(store.clone()));
    let dataset = seed::dataset();

    let summary = orchestrator.run(&dataset).await.unwrap();

    assert_eq!(summary.categories, dataset.categories.len());
    assert_eq!(summary.customisations, dataset.customisations.len());
    assert_eq!(summary.menu_items, dataset.menu.len());
    assert_eq!(summary.links, dataset.link_count());

    assert_eq!(store.row_count("categories"), dataset.categories.len());
    assert_eq!(store.row_count("customisations"), dataset.customisations.len());
    assert_eq!(store.row_count("menu"), dataset.menu.len());
    assert_eq!(store.row_count("menu_customisations"), dataset.link_count());
    // One uploaded image per menu item.
    assert_eq!(store.blob_count(), dataset.menu.len());

    // Every categoryRef on a menu row resolves to a category created this run.
    let category_ids: HashSet<String> = store
        .rows("categories")
        .into_iter()
        .map(|row| row.id)
        .collect();
    for row in store.rows("menu") {
        let category_ref = row.fields["categories"].as_str().unwrap().to_string();
        assert!(category_ids.contains(&category_ref));
        assert!(row.fields["image_url"]
            .as_str()
            .unwrap()
            .starts_with("memory://blobs/"));
    }

    // Every link row resolves on both sides.
    let menu_ids: HashSet<String> = store.rows("menu").into_iter().map(|row| row.id).collect();
    let customisation_ids: HashSet<String> = store
        .rows("customisations")
        .into_iter()
        .map(|row| row.id)
        .collect();
    for row in store.rows("menu_customisations") {
        assert!(menu_ids.contains(row.fields["menu"].as_str().unwrap()));
        assert!(customisation_ids.contains(row.fields["customisations"].as_str().unwrap()));
    }
}

#[tokio::test]
async fn rerunning_does_not_duplicate_rows_or_blobs() {
    let store = Arc::new(MemoryStore::new());
    let dataset = seed::dataset();

    for _ in 0..2 {
        let orchestrator = orchestrator(&store, StubIngestor::new(store.clone()));
        orchestrator.run(&dataset).await.unwrap();

        assert_eq!(store.row_count("categories"), dataset.categories.len());
        assert_eq!(store.row_count("customisations"), dataset.customisations.len());
        assert_eq!(store.row_count("menu"), dataset.menu.len());
        assert_eq!(store.row_count("menu_customisations"), dataset.link_count());
        assert_eq!(store.blob_count(), dataset.menu.len());
    }
}

#[tokio::test]
async fn clearing_removes_preexisting_rows_and_blobs() {
    let store = Arc::new(MemoryStore::new());
    store.insert_row(
        "menu",
        Row {
            id: "stale-menu-row".to_string(),
            fields: json!({"name": "Ghost Burger"}).as_object().unwrap().clone(),
        },
    );
    store.insert_row(
        "categories",
        Row {
            id: "stale-category".to_string(),
            fields: json!({"name": "Ghosts"}).as_object().unwrap().clone(),
        },
    );
    store.insert_blob(
        Blob {
            id: "stale-blob".to_string(),
            name: "orphan.png".to_string(),
        },
        vec![0],
    );

    let orchestrator = orchestrator(&store, StubIngestor::new(store.clone()));
    let dataset = small_dataset();
    let summary = orchestrator.run(&dataset).await.unwrap();

    assert_eq!(summary.cleared_rows, 2);
    assert_eq!(summary.cleared_blobs, 1);
    assert_eq!(store.row_count("menu"), 1);
    assert_eq!(store.row_count("categories"), 1);
    assert_eq!(store.blob_count(), 1);
    assert!(!store.rows("menu").iter().any(|r| r.id == "stale-menu-row"));
    assert!(!store
        .rows("categories")
        .iter()
        .any(|r| r.id == "stale-category"));
}

#[tokio::test]
async fn unknown_category_name_is_a_fatal_dataset_defect() {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = orchestrator(&store, StubIngestor::new(store.clone()));

    let mut dataset = small_dataset();
    dataset.menu[0].category_name = "Sushi".to_string();

    let failure = orchestrator.run(&dataset).await.unwrap_err();

    assert_eq!(failure.phase, Phase::SeedingMenu);
    assert_eq!(failure.entity.as_deref(), Some("Cheeseburger"));
    assert!(
        matches!(
            &failure.error,
            SeedError::DatasetIntegrity { kind: "category", name } if name == "Sushi"
        ),
        "got {:?}",
        failure.error
    );
    // No menu row and no link rows for the defective item.
    assert_eq!(store.row_count("menu"), 0);
    assert_eq!(store.row_count("menu_customisations"), 0);
}

#[tokio::test]
async fn unknown_customisation_name_is_a_fatal_dataset_defect() {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = orchestrator(&store, StubIngestor::new(store.clone()));

    let mut dataset = small_dataset();
    dataset.menu[0].customisations = vec!["Gold Leaf".to_string()];

    let failure = orchestrator.run(&dataset).await.unwrap_err();

    assert_eq!(failure.phase, Phase::SeedingMenu);
    assert!(
        matches!(
            &failure.error,
            SeedError::DatasetIntegrity { kind: "customisation", name } if name == "Gold Leaf"
        ),
        "got {:?}",
        failure.error
    );
    assert_eq!(store.row_count("menu_customisations"), 0);
}

#[tokio::test]
async fn download_failure_aborts_the_menu_phase() {
    let store = Arc::new(MemoryStore::new());
    let dataset = small_dataset();
    let ingestor = StubIngestor::failing_for(store.clone(), &dataset.menu[0].image_url);
    let orchestrator = orchestrator(&store, ingestor);

    let failure = orchestrator.run(&dataset).await.unwrap_err();

    assert_eq!(failure.phase, Phase::SeedingMenu);
    assert_eq!(failure.entity.as_deref(), Some("Cheeseburger"));
    assert!(
        matches!(failure.error, SeedError::Download { .. }),
        "got {:?}",
        failure.error
    );
    // Earlier phases completed, but nothing was created for the failed item.
    assert_eq!(store.row_count("categories"), 1);
    assert_eq!(store.row_count("menu"), 0);
    assert_eq!(store.row_count("menu_customisations"), 0);
}

#[tokio::test]
async fn remote_failure_reports_phase_and_entity() {
    let store = Arc::new(MemoryStore::new());
    store.fail_next("create_row:categories");
    let orchestrator = orchestrator(&store, StubIngestor::new(store.clone()));

    let failure = orchestrator.run(&small_dataset()).await.unwrap_err();

    assert_eq!(failure.phase, Phase::SeedingCategories);
    assert_eq!(failure.entity.as_deref(), Some("Burgers"));
    assert!(
        matches!(failure.error, SeedError::Remote(_)),
        "got {:?}",
        failure.error
    );
}

#[tokio::test]
async fn cancellation_before_the_run_stops_at_the_first_phase() {
    let store = Arc::new(MemoryStore::new());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let orchestrator =
        orchestrator(&store, StubIngestor::new(store.clone())).with_cancellation(cancel);

    let failure = orchestrator.run(&small_dataset()).await.unwrap_err();

    assert_eq!(failure.phase, Phase::Clearing);
    assert!(
        matches!(failure.error, SeedError::Cancelled),
        "got {:?}",
        failure.error
    );
    assert_eq!(store.row_count("categories"), 0);
}

#[tokio::test]
async fn mid_phase_cancellation_finishes_the_in_flight_call_before_stopping() {
    let store = Arc::new(MemoryStore::new());
    let cancel = CancellationToken::new();
    // The token fires from inside the first category create; that call still
    // completes, and the next unit of work must not start.
    let rows = Arc::new(InstrumentedRows {
        cancel_on_table: Some(("categories".to_string(), cancel.clone())),
        ..InstrumentedRows::new(store.clone())
    });
    let orchestrator = SeedOrchestrator::new(
        rows,
        store.clone(),
        Arc::new(StubIngestor::new(store.clone())),
        TableNames::default(),
        4,
    )
    .with_cancellation(cancel);

    let mut dataset = small_dataset();
    dataset.categories.push(CategorySeed {
        name: "Pizzas".to_string(),
        description: "Oven-baked pizzas".to_string(),
    });

    let failure = orchestrator.run(&dataset).await.unwrap_err();

    assert_eq!(failure.phase, Phase::SeedingCategories);
    assert_eq!(failure.entity.as_deref(), Some("Pizzas"));
    assert!(
        matches!(failure.error, SeedError::Cancelled),
        "got {:?}",
        failure.error
    );
    // The create that was already on the wire landed; nothing after it did.
    assert_eq!(store.row_count("categories"), 1);
}

#[tokio::test]
async fn failed_item_lets_in_flight_sibling_creates_complete() {
    let store = Arc::new(MemoryStore::new());

    let mut dataset = small_dataset();
    dataset.menu.push(MenuItemSeed {
        name: "Bean Burrito".to_string(),
        description: "Black beans and rice".to_string(),
        image_url: "https://cdn.example.com/burrito.png".to_string(),
        price: 7.25,
        rating: 4.2,
        calories: 480,
        protein: 18,
        category_name: "Burgers".to_string(),
        customisations: vec![],
    });

    // The burrito's download fails immediately while the cheeseburger's menu
    // create is still sleeping on the wire; the run must wait for that
    // create (and the item's link rows) rather than dropping it mid-flight.
    let rows = Arc::new(InstrumentedRows {
        delay_row_named: Some(("Cheeseburger".to_string(), Duration::from_millis(200))),
        ..InstrumentedRows::new(store.clone())
    });
    let ingestor = StubIngestor::failing_for(store.clone(), &dataset.menu[1].image_url);
    let orchestrator = SeedOrchestrator::new(
        rows,
        store.clone(),
        Arc::new(ingestor),
        TableNames::default(),
        4,
    );

    let failure = orchestrator.run(&dataset).await.unwrap_err();

    assert_eq!(failure.phase, Phase::SeedingMenu);
    assert_eq!(failure.entity.as_deref(), Some("Bean Burrito"));
    assert!(
        matches!(failure.error, SeedError::Download { .. }),
        "got {:?}",
        failure.error
    );

    // The cheeseburger's in-flight work completed: its row and its link row
    // both exist even though the run failed.
    let menu_rows = store.rows("menu");
    assert_eq!(menu_rows.len(), 1);
    assert_eq!(menu_rows[0].fields["name"].as_str(), Some("Cheeseburger"));
    assert_eq!(store.row_count("menu_customisations"), 1);
}
