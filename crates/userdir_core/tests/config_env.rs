use std::path::Path;
use userdir_core::{logging_status, MemoryKvStore, StoreConfig, UserFilters, UserSort, UserStore};

// Single test: it mutates process environment, so nothing else in this
// binary may read it concurrently.
#[test]
fn loaded_config_drives_store_and_logger() {
    let settings = tempfile::tempdir().unwrap();
    std::fs::write(
        settings.path().join("settings.json"),
        r#"{ "storageKey": "from-file", "defaultPageSize": 3, "logLevel": "debug", "seedSampleData": true }"#,
    )
    .unwrap();

    std::env::set_var("USERDIR_STORAGE_KEY", "staff");
    std::env::set_var("USERDIR_LOG_LEVEL", "Warning");
    let config = StoreConfig::load(settings.path());
    std::env::remove_var("USERDIR_STORAGE_KEY");
    std::env::remove_var("USERDIR_LOG_LEVEL");

    assert_eq!(config.storage_key, "staff");
    assert_eq!(config.log_level, "warn");
    assert_eq!(config.default_page_size, 3);
    assert!(config.seed_sample_data);

    let store = UserStore::open(MemoryKvStore::new(), &config);
    assert_eq!(store.storage_key(), "staff");
    let page = store.default_page();
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 3);

    store
        .create(userdir_core::UserFields {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            gender: userdir_core::Gender::Female,
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1985, 12, 10).unwrap(),
            city: None,
            phone: "+44 20 7946 0000".to_string(),
            email: "ada@example.com".to_string(),
        })
        .unwrap();
    let shown = store.query(&UserFilters::default(), &UserSort::default(), &page);
    assert_eq!(shown.total, 4);
    assert_eq!(shown.records.len(), 3);

    let logs = tempfile::tempdir().unwrap();
    let log_dir = logs.path().to_str().unwrap();
    config.init_logging(log_dir).unwrap();
    let (level, dir) = logging_status().unwrap();
    assert_eq!(level, "warn");
    assert_eq!(dir, Path::new(log_dir));

    let louder = StoreConfig {
        log_level: "trace".to_string(),
        ..config.clone()
    };
    assert!(louder.init_logging(log_dir).is_err());
}
