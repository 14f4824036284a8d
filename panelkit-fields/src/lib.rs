//! Module and field definitions
//!
//! `panelkit-fields` owns the schema side of the admin panel: what modules
//! exist, which fields they carry and how each field behaves.
//!
//! # Architecture
//!
//! - **YAML on disk**: one file per module, seeded from defaults that do not
//!   exist yet ([`ModulesContext`])
//! - **Open uitype strategies**: the [`UiType`] trait decides editing,
//!   display and search for a field; [`UiTypeRegistry`] holds them by name
//!   and numeric id
//! - **Cached lookups**: [`Catalog`] resolves modules, uitypes, display types
//!   and capabilities through one typed [`LookupCache`]

pub mod cache;
pub mod catalog;
pub mod context;
pub mod error;
pub mod registry;
pub mod types;
pub mod uitype;

pub use cache::{Cached, EntityKind, LookupCache, LookupMode};
pub use catalog::Catalog;
pub use context::{atomic_write, ModuleDefaults, ModulesContext, ModulesContextBuilder};
pub use error::{FieldsError, Result};
pub use registry::UiTypeRegistry;
pub use types::{
    Capability, DisplayType, FieldDef, FieldOptions, ModuleDef, RelatedAction, RelatedListData,
    RelatedListDef, RelationType, SelectChoice, TabDef, ViewContext, ViewFlags, Visibility,
    DEFAULT_DISPLAYTYPE,
};
pub use uitype::{FormContext, FormMode, FormWidget, SearchValue, UiType, BUILTIN_PACKAGE};
