//! Datatable column configuration

use panelkit_fields::{FieldDef, FieldOptions, ModuleDef, UiType, ViewContext};
use serde::Serialize;

use crate::filters::Filter;
use crate::panel::Panel;

/// One listable field as the datatable sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatatableColumn {
    pub name: String,
    #[serde(rename = "db_column")]
    pub column: String,
    pub uitype: String,
    pub package: String,
    /// Template identifier rendering the field's list cells.
    pub view: String,
    pub visible: bool,
    pub data: FieldOptions,
}

/// Template rendering `field` in list cells: `uitypes.list.{uitype}` looked
/// up through the view chain, else the framework's text cell.
pub fn list_view(panel: &Panel, module: &ModuleDef, uitype: &dyn UiType) -> String {
    let fallback = format!(
        "{}::modules.default.uitypes.list.text",
        panel.views.framework_package()
    );
    let view = format!("uitypes.list.{}", uitype.name());
    panel
        .views
        .resolve(uitype.package(), &module.name, &view, Some(&fallback))
        .unwrap_or(fallback)
}

/// Columns of every listable field of `module`. A field is visible when
/// `filter` lists it. Without a filter there are no columns.
pub fn datatable_columns(
    panel: &Panel,
    module: &ModuleDef,
    filter: Option<&Filter>,
) -> Vec<DatatableColumn> {
    let Some(filter) = filter else {
        return Vec::new();
    };
    panel
        .catalog
        .visible_fields(module, ViewContext::List)
        .into_iter()
        .map(|field| column(panel, module, field, filter))
        .collect()
}

fn column(panel: &Panel, module: &ModuleDef, field: &FieldDef, filter: &Filter) -> DatatableColumn {
    let uitype = panel.catalog.uitype_for(field);
    DatatableColumn {
        name: field.name.clone(),
        column: field.column().to_string(),
        uitype: uitype.name().to_string(),
        package: uitype.package().to_string(),
        view: list_view(panel, module, uitype.as_ref()),
        visible: filter.columns.contains(&field.name),
        data: field.data.clone(),
    }
}
