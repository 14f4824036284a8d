mod common;

use panelkit_fields::{FieldDef, ModuleDef, SearchValue};
use panelkit_query::SortDirection;
use panelkit_records::{Conditions, OrderSpec, ProjectionOptions, Projector, RecordsError, RecordsExport};
use tempfile::TempDir;
use tracing_test::traced_test;

fn keys(row: &panelkit_records::Row) -> Vec<&str> {
    row.keys().map(String::as_str).collect()
}

#[tokio::test]
async fn headings_and_rows_share_key_order() {
    let tmp = TempDir::new().unwrap();
    let panel = common::panel(&tmp).await;

    let table = RecordsExport::new(&panel)
        .for_module("contact")
        .with_id()
        .with_timestamps()
        .run()
        .await
        .unwrap();

    let expected = vec![
        "id",
        "name",
        "email",
        "age",
        "company",
        "secret",
        "created_at",
        "updated_at",
    ];
    assert_eq!(keys(&table.headings), expected);
    assert_eq!(table.rows.len(), 4);
    for row in &table.rows {
        assert_eq!(keys(row), expected);
    }

    let labels: Vec<&str> = table.headings.values().map(String::as_str).collect();
    assert_eq!(
        labels,
        vec![
            "ID",
            "Name",
            "E-mail",
            "field.age",
            "field.company",
            "field.secret",
            "Created",
            "Updated"
        ]
    );

    let ann = &table.rows[0];
    assert_eq!(ann["id"], "1");
    assert_eq!(ann["secret"], "••••••••");
    assert_eq!(ann["created_at"], "2024-01-02 03:04:05");
}

#[tokio::test]
async fn only_columns_keeps_id_and_timestamps() {
    let tmp = TempDir::new().unwrap();
    let panel = common::panel(&tmp).await;

    let table = RecordsExport::new(&panel)
        .for_module("contact")
        .with_id()
        .with_timestamps()
        .with_columns(["email"])
        .run()
        .await
        .unwrap();

    assert_eq!(keys(&table.headings), vec!["id", "email", "created_at", "updated_at"]);
    assert_eq!(keys(&table.rows[0]), vec!["id", "email", "created_at", "updated_at"]);
    assert_eq!(table.rows[0]["email"], "ann@acme.test");
}

#[tokio::test]
async fn export_applies_search_domain_and_order() {
    let tmp = TempDir::new().unwrap();
    let panel = common::panel(&tmp).await;

    let mut conditions = Conditions::new();
    conditions.insert("age".into(), SearchValue::from("30,"));
    conditions.insert("nickname".into(), SearchValue::from("x"));
    let mut order = OrderSpec::new();
    order.insert("age".into(), SortDirection::Desc);

    let table = RecordsExport::new(&panel)
        .for_module("contact")
        .for_domain(1)
        .with_conditions(conditions)
        .with_order(order)
        .run()
        .await
        .unwrap();

    let names: Vec<&str> = table.rows.iter().map(|r| r["name"].as_str()).collect();
    assert_eq!(names, vec!["Cara", "Bob"]);
}

#[tokio::test]
async fn domain_scoped_export_is_repeatable() {
    let tmp = TempDir::new().unwrap();
    let panel = common::panel(&tmp).await;
    let export = RecordsExport::new(&panel).for_module("contact").for_domain(2).with_id();

    let first = export.run().await.unwrap();
    let second = export.run().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.rows.len(), 1);
    assert_eq!(first.rows[0]["name"], "Dan");
}

#[tokio::test]
async fn csv_starts_with_translated_headings() {
    let tmp = TempDir::new().unwrap();
    let panel = common::panel(&tmp).await;

    let csv = RecordsExport::new(&panel)
        .for_module("contact")
        .with_columns(["name", "email"])
        .run()
        .await
        .unwrap()
        .to_csv()
        .unwrap();

    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Name,E-mail"));
    assert_eq!(lines.next(), Some("Ann,ann@acme.test"));
    assert_eq!(csv.lines().count(), 5);
}

#[tokio::test]
async fn module_is_required() {
    let tmp = TempDir::new().unwrap();
    let panel = common::panel(&tmp).await;

    let err = RecordsExport::new(&panel).run().await.unwrap_err();
    assert!(matches!(err, RecordsError::NoModule));

    let err = RecordsExport::new(&panel)
        .for_module("invoice")
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::Fields(_)));
}

#[tokio::test]
#[traced_test]
async fn module_without_store_exports_headings_only() {
    let tmp = TempDir::new().unwrap();
    let panel = common::panel(&tmp).await;
    let mut bare = panel.clone();
    bare.stores = panelkit_query::StoreRegistry::new();

    let table = RecordsExport::new(&bare)
        .for_module("company")
        .with_id()
        .run()
        .await
        .unwrap();
    assert!(table.is_empty());
    assert_eq!(keys(&table.headings), vec!["id", "name"]);
    assert!(logs_contain("no record store for module"));
}

#[tokio::test]
async fn projector_formats_with_uitypes() {
    let tmp = TempDir::new().unwrap();
    let panel = common::panel(&tmp).await;
    let contact = panel.catalog.require_module("contact").await.unwrap();
    let record = panelkit_query::Record::new(9)
        .with("name", "Eve")
        .with("company_id", 2);

    let row = Projector::new(&panel.catalog, &panel.translator).project_record(
        &contact,
        &record,
        &ProjectionOptions::default(),
    );
    assert_eq!(row["company"], "2");
    assert_eq!(row["secret"], "");
    assert_eq!(row["age"], "");
}

#[tokio::test]
async fn exported_checkboxes_use_translated_labels() {
    let tmp = TempDir::new().unwrap();
    let panel = common::panel(&tmp).await;
    let module = ModuleDef::new(30, "subscriber").field(FieldDef::new("active", "boolean"));
    let projector = Projector::new(&panel.catalog, &panel.translator);

    for (stored, shown) in [("on", "Yes"), ("0", "No")] {
        let record = panelkit_query::Record::new(1).with("active", stored);
        let row = projector.project_record(&module, &record, &ProjectionOptions::default());
        assert_eq!(row["active"], shown);
    }
}
