//! Integration tests for ingestion into the SQLite store.
//!
//! Each test builds a source tree in a temp directory and loads it into an
//! in-memory database.

use anyhow::anyhow;
use config_hub::db::Database;
use config_hub::discovery::SourceTree;
use config_hub::ingest::{ApplicationStatus, Ingestor, ProfileStatus};
use config_hub::query::PropertyQuery;
use config_hub::store::PropertySink;
use config_hub::types::PropertyRow;
use std::cell::Cell;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// The orders/billing tree used across tests.
fn orders_and_billing() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "orders/application.yml", "timeout: 30\n");
    write(temp.path(), "orders/orders-prod.yml", "timeout: 5\nregion: us\n");
    write(temp.path(), "billing/application.yml", "currency: usd\n");
    temp
}

fn all_rows(db: &Database) -> Vec<PropertyRow> {
    let mut rows: Vec<PropertyRow> = ["orders", "billing", "payments", "search"]
        .iter()
        .flat_map(|app| {
            db.find_properties(&PropertyQuery::from_parts(app, None, None))
                .unwrap()
        })
        .map(|p| p.row)
        .collect();
    rows.sort();
    rows
}

mod scenario_tests {
    use super::*;

    #[test]
    fn profile_rows_hold_merged_values() {
        let temp = orders_and_billing();
        let db = setup_db();
        let tree = SourceTree::new(temp.path());

        let summary = Ingestor::new(&tree, &db).run().unwrap();
        assert_eq!(summary.applications_loaded(), 2);
        assert_eq!(summary.failures(), 0);

        let prod = db
            .find_properties(&PropertyQuery::from_parts("orders", Some("prod"), None))
            .unwrap();
        let pairs: Vec<(&str, &str)> = prod
            .iter()
            .map(|p| (p.row.prop_key.as_str(), p.row.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("region", "us"), ("timeout", "5")]);
    }

    #[test]
    fn base_rows_are_stored_under_application_profile() {
        let temp = orders_and_billing();
        let db = setup_db();
        Ingestor::new(&SourceTree::new(temp.path()), &db).run().unwrap();

        let billing = db
            .find_properties(&PropertyQuery::from_parts("billing", None, None))
            .unwrap();
        assert_eq!(billing.len(), 1);
        assert_eq!(
            billing[0].row,
            PropertyRow::current("billing", "application", "currency", "usd")
        );

        let orders_base = db
            .find_properties(&PropertyQuery::from_parts("orders", Some("application"), None))
            .unwrap();
        assert_eq!(orders_base.len(), 1);
        assert_eq!(orders_base[0].row.value, "30");
    }

    #[test]
    fn reingestion_is_idempotent() {
        let temp = orders_and_billing();
        let db = setup_db();
        let tree = SourceTree::new(temp.path());

        Ingestor::new(&tree, &db).run().unwrap();
        let first = all_rows(&db);
        let count = db.count_properties().unwrap();

        Ingestor::new(&tree, &db).run().unwrap();
        assert_eq!(all_rows(&db), first);
        assert_eq!(db.count_properties().unwrap(), count);
        assert_eq!(count, 4);
    }

    #[test]
    fn reingestion_picks_up_changed_values() {
        let temp = orders_and_billing();
        let db = setup_db();
        let tree = SourceTree::new(temp.path());
        Ingestor::new(&tree, &db).run().unwrap();

        write(temp.path(), "orders/orders-prod.yml", "timeout: 9\nregion: us\n");
        Ingestor::new(&tree, &db).run().unwrap();

        let timeout = db
            .find_properties(&PropertyQuery::from_parts(
                "orders",
                Some("prod"),
                Some("timeout"),
            ))
            .unwrap();
        assert_eq!(timeout.len(), 1);
        assert_eq!(timeout[0].row.value, "9");
    }

    #[test]
    fn mixed_formats_merge_across_files() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "search/application.properties",
            "index.shards=3\nindex.replicas=1\n",
        );
        write(temp.path(), "search/search-prod.yml", "index:\n  replicas: 2\n");
        let db = setup_db();

        Ingestor::new(&SourceTree::new(temp.path()), &db).run().unwrap();

        let prod = db
            .find_properties(&PropertyQuery::from_parts("search", Some("prod"), None))
            .unwrap();
        let pairs: Vec<(&str, &str)> = prod
            .iter()
            .map(|p| (p.row.prop_key.as_str(), p.row.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("index.replicas", "2"), ("index.shards", "3")]);
    }
}

mod isolation_tests {
    use super::*;

    #[test]
    fn missing_base_skips_only_that_application() {
        let temp = orders_and_billing();
        write(temp.path(), "payments/payments-prod.yml", "gateway: stripe\n");
        let db = setup_db();

        let summary = Ingestor::new(&SourceTree::new(temp.path()), &db)
            .run()
            .unwrap();

        let payments = summary.application("payments").unwrap();
        assert!(matches!(payments.status, ApplicationStatus::Skipped { .. }));
        assert_eq!(summary.applications_loaded(), 2);
        assert!(
            db.find_properties(&PropertyQuery::from_parts("payments", None, None))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn invalid_base_name_skips_application() {
        let temp = orders_and_billing();
        write(temp.path(), "payments/config.yml", "gateway: stripe\n");
        let db = setup_db();

        let summary = Ingestor::new(&SourceTree::new(temp.path()), &db)
            .run()
            .unwrap();

        match &summary.application("payments").unwrap().status {
            ApplicationStatus::Skipped { reason } => assert!(reason.contains("config.yml")),
            other => panic!("expected skip, got {other:?}"),
        }
        assert_eq!(summary.applications_loaded(), 2);
    }

    #[test]
    fn undecodable_base_skips_application() {
        let temp = orders_and_billing();
        write(temp.path(), "payments/application.yml", "a: [1, 2\n");
        write(temp.path(), "payments/payments-prod.yml", "gateway: stripe\n");
        let db = setup_db();

        let summary = Ingestor::new(&SourceTree::new(temp.path()), &db)
            .run()
            .unwrap();

        assert!(!summary.application("payments").unwrap().is_loaded());
        assert!(summary.application("orders").unwrap().is_loaded());
    }

    #[test]
    fn unsupported_format_fails_only_that_profile() {
        let temp = orders_and_billing();
        write(temp.path(), "orders/orders-qa.toml", "timeout = 1\n");
        write(temp.path(), "orders/orders-dev.yml", "debug: true\n");
        let db = setup_db();

        let summary = Ingestor::new(&SourceTree::new(temp.path()), &db)
            .run()
            .unwrap();

        let orders = summary.application("orders").unwrap();
        match &orders.profile("qa").unwrap().status {
            ProfileStatus::Failed { reason, .. } => assert!(reason.contains("toml")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(orders.profile("dev").unwrap().is_loaded());
        assert!(orders.profile("prod").unwrap().is_loaded());

        let dev = db
            .find_properties(&PropertyQuery::from_parts("orders", Some("dev"), None))
            .unwrap();
        assert_eq!(dev.len(), 2);
        assert!(
            db.find_properties(&PropertyQuery::from_parts("orders", Some("qa"), None))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn colliding_profile_files_are_reported_not_loaded() {
        let temp = orders_and_billing();
        write(temp.path(), "orders/app-dev.yml", "debug: true\n");
        write(temp.path(), "orders/app-dev.properties", "debug=false\n");
        let db = setup_db();

        let summary = Ingestor::new(&SourceTree::new(temp.path()), &db)
            .run()
            .unwrap();

        let dev = summary.application("orders").unwrap().profile("dev").unwrap();
        match &dev.status {
            ProfileStatus::Failed { reason, rows_written } => {
                assert!(reason.contains("more than one file"));
                assert_eq!(*rows_written, 0);
            }
            other => panic!("expected collision failure, got {other:?}"),
        }
        assert!(
            db.find_properties(&PropertyQuery::from_parts("orders", Some("dev"), None))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn missing_source_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let db = setup_db();
        let tree = SourceTree::new(temp.path().join("absent"));
        assert!(Ingestor::new(&tree, &db).run().is_err());
    }
}

mod storage_failure_tests {
    use super::*;

    /// Accepts a fixed number of writes, then fails every write.
    struct FlakySink {
        remaining: Cell<usize>,
        accepted: Cell<usize>,
    }

    impl FlakySink {
        fn failing_after(n: usize) -> Self {
            Self {
                remaining: Cell::new(n),
                accepted: Cell::new(0),
            }
        }
    }

    impl PropertySink for FlakySink {
        fn upsert(&self, _row: &PropertyRow) -> anyhow::Result<()> {
            if self.remaining.get() == 0 {
                return Err(anyhow!("disk full"));
            }
            self.remaining.set(self.remaining.get() - 1);
            self.accepted.set(self.accepted.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_reported_and_ingestion_continues() {
        let temp = orders_and_billing();
        // billing base (1 row) succeeds; orders base write fails
        let sink = FlakySink::failing_after(1);

        let summary = Ingestor::new(&SourceTree::new(temp.path()), &sink)
            .run()
            .unwrap();

        assert_eq!(summary.applications.len(), 2);
        assert!(summary.application("billing").unwrap().profile("application").unwrap().is_loaded());

        let orders = summary.application("orders").unwrap();
        for report in &orders.profiles {
            match &report.status {
                ProfileStatus::Failed { reason, rows_written } => {
                    assert!(reason.contains("disk full"));
                    assert_eq!(*rows_written, 0);
                }
                other => panic!("expected storage failure, got {other:?}"),
            }
        }
        assert_eq!(summary.rows_written(), 1);
        assert_eq!(sink.accepted.get(), 1);
    }

    #[test]
    fn partial_profile_keeps_rows_already_written() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "orders/application.yml", "a: 1\nb: 2\nc: 3\n");
        let sink = FlakySink::failing_after(2);

        let summary = Ingestor::new(&SourceTree::new(temp.path()), &sink)
            .run()
            .unwrap();

        let base = summary.application("orders").unwrap().profile("application").unwrap();
        assert!(matches!(
            base.status,
            ProfileStatus::Failed { rows_written: 2, .. }
        ));
        assert_eq!(summary.rows_written(), 2);
    }
}

mod source_shape_tests {
    use super::*;

    fn stored_pairs(db: &Database, app: &str, profile: &str) -> Vec<(String, String)> {
        db.find_properties(&PropertyQuery::from_parts(app, Some(profile), None))
            .unwrap()
            .into_iter()
            .map(|p| (p.row.prop_key, p.row.value))
            .collect()
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_application_directory_is_ingested() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        std::fs::create_dir_all(&root).unwrap();
        write(temp.path(), "mounted/orders/application.yml", "timeout: 30\n");
        std::fs::create_dir_all(temp.path().join("mounted/orders/..data")).unwrap();
        symlink(temp.path().join("mounted/orders"), root.join("orders")).unwrap();
        symlink(
            temp.path().join("mounted/orders/..data"),
            temp.path().join("mounted/orders/archive"),
        )
        .unwrap();
        let db = setup_db();

        let summary = Ingestor::new(&SourceTree::new(&root), &db).run().unwrap();

        assert_eq!(summary.applications_loaded(), 1);
        assert_eq!(summary.failures(), 0);
        assert_eq!(
            stored_pairs(&db, "orders", "application"),
            vec![("timeout".to_string(), "30".to_string())]
        );
    }

    #[test]
    fn yaml_non_string_keys_and_empty_lists_are_stored() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "orders/application.yml",
            "codes:\n  404: missing\nhosts: []\n",
        );
        let db = setup_db();

        Ingestor::new(&SourceTree::new(temp.path()), &db).run().unwrap();

        assert_eq!(
            stored_pairs(&db, "orders", "application"),
            vec![
                ("codes[404]".to_string(), "missing".to_string()),
                ("hosts".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn properties_surrogate_pairs_are_decoded() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "orders/application.properties",
            "greeting=hi \\uD83D\\uDE00\n",
        );
        let db = setup_db();

        let summary = Ingestor::new(&SourceTree::new(temp.path()), &db).run().unwrap();

        assert!(summary.application("orders").unwrap().is_loaded());
        assert_eq!(
            stored_pairs(&db, "orders", "application"),
            vec![("greeting".to_string(), "hi \u{1F600}".to_string())]
        );
    }
}
