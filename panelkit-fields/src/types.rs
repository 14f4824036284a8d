//! Module, field, tab and related-list definitions.
//!
//! All types serialize to/from YAML via serde. A [`ModuleDef`] is the unit
//! persisted on disk; fields, tabs and related lists are embedded in it.

use std::fmt;
use std::str::FromStr;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FieldsError, Result};

/// Name of the display type applied when a field names none.
pub const DEFAULT_DISPLAYTYPE: &str = "everywhere";

/// One selectable choice of a `select` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectChoice {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SelectChoice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: Some(label.into()),
        }
    }

    /// Label, or the raw value when no label is set.
    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

/// A view a field can be shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewContext {
    Create,
    Edit,
    Detail,
    List,
    Everywhere,
}

impl FromStr for ViewContext {
    type Err = FieldsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            "detail" => Ok(Self::Detail),
            "list" => Ok(Self::List),
            "everywhere" => Ok(Self::Everywhere),
            other => Err(FieldsError::InvalidViewContext {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ViewContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewContext::Create => "create",
            ViewContext::Edit => "edit",
            ViewContext::Detail => "detail",
            ViewContext::List => "list",
            ViewContext::Everywhere => "everywhere",
        };
        f.write_str(name)
    }
}

/// Per-view visibility flags. Unset views are hidden.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewFlags {
    #[serde(default)]
    pub create: bool,
    #[serde(default)]
    pub edit: bool,
    #[serde(default)]
    pub detail: bool,
    #[serde(default)]
    pub list: bool,
}

/// Explicit `visible` option of a field: a flag for every view, or one
/// flag per view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Visibility {
    All(bool),
    PerView(ViewFlags),
}

impl Visibility {
    pub fn allows(&self, context: ViewContext) -> bool {
        match self {
            Visibility::All(visible) => *visible,
            Visibility::PerView(flags) => match context {
                ViewContext::Create => flags.create,
                ViewContext::Edit => flags.edit,
                ViewContext::Detail => flags.detail,
                ViewContext::List => flags.list,
                ViewContext::Everywhere => false,
            },
        }
    }
}

/// Free-form options of a field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldOptions {
    /// Validation rules, passed through to the form layer verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<Visibility>,
    /// Ask for the value twice on forms.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub repeated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<SelectChoice>,
    /// Related module of an `entity` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Dotted path displayed for an `entity` field, e.g. `author.name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A field descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    pub name: String,
    /// Storage column. Defaults to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Uitype name, or its numeric id as a string.
    pub uitype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displaytype: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Translation key of the label. Defaults to `field.<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub data: FieldOptions,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, uitype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: None,
            uitype: uitype.into(),
            displaytype: None,
            required: false,
            label: None,
            data: FieldOptions::default(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_displaytype(mut self, displaytype: impl Into<String>) -> Self {
        self.displaytype = Some(displaytype.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_options(mut self, data: FieldOptions) -> Self {
        self.data = data;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn column(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    pub fn label_key(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("field.{}", self.name))
    }

    pub fn displaytype_name(&self) -> &str {
        self.displaytype.as_deref().unwrap_or(DEFAULT_DISPLAYTYPE)
    }

    /// Visibility in `context`: the explicit `visible` option wins, the
    /// display type decides otherwise.
    pub fn is_visible(&self, context: ViewContext, displaytype: &DisplayType) -> bool {
        match &self.data.visible {
            Some(visibility) => visibility.allows(context),
            None => displaytype.allows(context),
        }
    }
}

/// Named visibility policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayType {
    pub id: u64,
    pub name: String,
    pub listable: bool,
    pub detailable: bool,
    pub createable: bool,
    pub editable: bool,
}

impl DisplayType {
    pub fn allows(&self, context: ViewContext) -> bool {
        match context {
            ViewContext::Create => self.createable,
            ViewContext::Edit => self.editable,
            ViewContext::Detail => self.detailable,
            ViewContext::List => self.listable,
            ViewContext::Everywhere => {
                self.listable && self.detailable && self.createable && self.editable
            }
        }
    }

    /// Display types registered at boot.
    pub fn builtin() -> Vec<DisplayType> {
        let make = |id, name: &str, flags: [bool; 4]| DisplayType {
            id,
            name: name.to_string(),
            listable: flags[0],
            detailable: flags[1],
            createable: flags[2],
            editable: flags[3],
        };
        vec![
            make(1, "everywhere", [true, true, true, true]),
            make(2, "detail_only", [false, true, false, false]),
            make(3, "list_only", [true, false, false, false]),
            make(4, "create_only", [false, false, true, false]),
            make(5, "edit_only", [false, false, false, true]),
            make(6, "hidden", [false, false, false, false]),
            make(7, "not_createable", [true, true, false, true]),
        ]
    }
}

/// Named permission capability. Grants are stored elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capability {
    pub id: u64,
    pub name: String,
}

impl Capability {
    pub fn builtin() -> Vec<Capability> {
        ["retrieve", "create", "update", "delete", "admin"]
            .iter()
            .zip(1..)
            .map(|(name, id)| Capability {
                id,
                name: (*name).to_string(),
            })
            .collect()
    }
}

/// A tab of a module's detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabDef {
    pub id: u64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub sequence: i32,
}

/// Cardinality of a related list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RelationType {
    #[serde(rename = "1-n")]
    OneToMany,
    #[serde(rename = "n-1")]
    ManyToOne,
    #[serde(rename = "n-n")]
    ManyToMany,
}

/// Action offered on a related list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RelatedAction {
    Add,
    Select,
}

/// Options of a related list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RelatedListData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<RelatedAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_tab: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_name: Option<String>,
}

/// A list of records of another module shown on a record's detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelatedListDef {
    pub id: u64,
    /// Module whose detail view shows the list.
    pub module: String,
    pub related_module: String,
    /// FK field on the related module, for `n-1` lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<u64>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub relation: RelationType,
    /// Registered relation provider serving this list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub data: RelatedListData,
}

impl RelatedListDef {
    pub fn can_add(&self) -> bool {
        self.data.actions.contains(&RelatedAction::Add)
    }

    pub fn can_select(&self) -> bool {
        self.data.actions.contains(&RelatedAction::Select)
    }

    pub fn is_visible_as_tab(&self) -> bool {
        self.data.add_tab.unwrap_or(true)
    }

    /// Explicit relation name, else the camel-cased plural of the related
    /// module name (`sales_order` → `salesOrders`).
    pub fn relation_name(&self) -> String {
        if let Some(name) = &self.data.relation_name {
            return name.clone();
        }
        pluralize(&self.related_module.to_case(Case::Camel))
    }

    /// True when the list relates a module to itself.
    pub fn is_reflexive(&self) -> bool {
        self.module == self.related_module
    }
}

fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if !matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u') | None) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// A module definition: the unit persisted as one YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleDef {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Owning package. Unset for application modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Storage model backing the module's records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Records carry a `domain_id` attribute.
    #[serde(default)]
    pub domain_scoped: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<TabDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_lists: Vec<RelatedListDef>,
}

impl ModuleDef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            icon: None,
            package: None,
            model: None,
            domain_scoped: false,
            fields: Vec::new(),
            tabs: Vec::new(),
            related_lists: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn domain_scoped(mut self) -> Self {
        self.domain_scoped = true;
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn related_list(mut self, list: RelatedListDef) -> Self {
        self.related_lists.push(list);
        self
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_related_list(&self, id: u64) -> Option<&RelatedListDef> {
        self.related_lists.iter().find(|r| r.id == id)
    }

    /// Related lists shown on `tab`, in sequence order.
    pub fn related_lists_for_tab(&self, tab: u64) -> Vec<&RelatedListDef> {
        let mut lists: Vec<_> = self
            .related_lists
            .iter()
            .filter(|r| r.tab == Some(tab))
            .collect();
        lists.sort_by_key(|r| r.sequence);
        lists
    }

    /// Reject definitions whose field names are not unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(FieldsError::duplicate_field(&self.name, &field.name));
            }
        }
        Ok(())
    }
}
