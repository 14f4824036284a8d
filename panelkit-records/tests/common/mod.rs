#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use panelkit_config::PanelConfig;
use panelkit_fields::{Catalog, ModulesContext};
use panelkit_query::{MemoryStore, Record};
use panelkit_records::{Panel, PivotRelation};
use panelkit_views::{MemoryTranslations, MemoryViewCatalog, Translator, ViewResolver};
use tempfile::TempDir;

pub const COMPANY_YAML: &str = r#"
id: 1
name: company
model: companies
fields:
  - name: name
    uitype: text
related_lists:
  - id: 10
    module: company
    related_module: contact
    related_field: company
    tab: 1
    label: related.contacts
    type: n-1
    data:
      actions: [add, select]
  - id: 11
    module: company
    related_module: company
    label: related.partners
    type: n-n
    method: partners
    data:
      actions: [select]
"#;

pub const CONTACT_YAML: &str = r#"
id: 2
name: contact
model: contacts
domain_scoped: true
fields:
  - name: name
    uitype: text
    required: true
  - name: email
    uitype: email
    data:
      repeated: true
  - name: age
    uitype: integer
  - name: company
    column: company_id
    uitype: entity
    data:
      module: company
  - name: secret
    uitype: password
    displaytype: detail_only
"#;

fn contacts() -> Vec<Record> {
    let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let updated = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
    let contact = |id: i64, name: &str, age: i64, company: i64, domain: i64| {
        Record::new(id)
            .with("name", name)
            .with("email", format!("{}@acme.test", name.to_lowercase()))
            .with("age", age)
            .with("company_id", company)
            .with("secret", "hunter2")
            .with("domain_id", domain)
            .with_timestamps(created, updated)
    };
    vec![
        contact(1, "Ann", 29, 1, 1),
        contact(2, "Bob", 35, 1, 1),
        contact(3, "Cara", 41, 2, 1),
        contact(4, "Dan", 50, 1, 2),
    ]
}

/// `count` contacts in domain 1, named `Contact {id}`.
pub fn many_contacts(count: i64) -> Vec<Record> {
    (1..=count)
        .map(|id| {
            Record::new(id)
                .with("name", format!("Contact {id}"))
                .with("age", 20 + id % 50)
                .with("domain_id", 1)
        })
        .collect()
}

fn companies() -> Vec<Record> {
    ["Acme", "Globex", "Initech", "Umbrella"]
        .iter()
        .zip(1..)
        .map(|(name, id)| Record::new(id).with("name", *name))
        .collect()
}

fn partners() -> Vec<Record> {
    vec![
        Record::new(1).with("company_id", 1).with("partner_id", 2),
        Record::new(2).with("company_id", 1).with("partner_id", 3),
    ]
}

pub fn translations() -> MemoryTranslations {
    MemoryTranslations::new()
        .with("default.field.id", "ID")
        .with("default.field.name", "Name")
        .with("contact.field.email", "E-mail")
        .with("default.field.email_confirmation", "Confirm e-mail")
        .with("default.field.created_at", "Created")
        .with("default.field.updated_at", "Updated")
        .with("panelkit::default.button.save", "Save")
        .with("default.yes", "Yes")
        .with("default.no", "No")
}

pub fn views() -> MemoryViewCatalog {
    MemoryViewCatalog::new()
        .with_view("panelkit::modules.default.uitypes.list.email")
        .with_view("panelkit.modules.contact.uitypes.list.integer")
}

/// Panel over the company and contact modules, with in-memory stores and
/// the `partners` pivot relation registered.
pub async fn panel(tmp: &TempDir) -> Panel {
    let dir = tmp.path().join("modules");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("company.yaml"), COMPANY_YAML).unwrap();
    std::fs::write(dir.join("contact.yaml"), CONTACT_YAML).unwrap();
    let catalog = Catalog::new(ModulesContext::open(tmp.path()).build().await.unwrap());

    let config = PanelConfig::default();
    let resolver = ViewResolver::from_config(Arc::new(views()), &config);
    let translator = Translator::new(Arc::new(translations()), config.framework_package.clone());

    let companies = Arc::new(MemoryStore::with_records("companies", companies()));
    let pivot = Arc::new(MemoryStore::with_records("company_partners", partners()));

    Panel::new(config, Arc::new(catalog), resolver, translator)
        .with_store(Arc::new(MemoryStore::with_records("contacts", contacts())))
        .with_store(companies.clone())
        .with_relation(
            "partners",
            Arc::new(PivotRelation::new(pivot, companies, "company_id", "partner_id")),
        )
}
