//! Edit form descriptions

use panelkit_fields::{FormContext, FormMode, FormWidget, ModuleDef, ViewContext};
use panelkit_query::Record;
use tracing::trace;

use crate::panel::Panel;

#[derive(Debug, Clone, Copy)]
pub struct EditFormBuilder<'a> {
    panel: &'a Panel,
}

impl<'a> EditFormBuilder<'a> {
    pub fn new(panel: &'a Panel) -> Self {
        Self { panel }
    }

    /// One widget per field visible in `mode`, bound to `record` when
    /// editing. Repeated fields carry a `{name}_confirmation` widget.
    pub fn build(&self, module: &ModuleDef, record: Option<&Record>, mode: FormMode) -> Vec<FormWidget> {
        let catalog = &self.panel.catalog;
        let translator = &self.panel.translator;

        catalog
            .visible_fields(module, ViewContext::from(mode))
            .into_iter()
            .map(|field| {
                let uitype = catalog.uitype_for(field);
                let label_key = field.label_key();
                let ctx = FormContext {
                    mode,
                    label: translator.trans(&label_key, Some(module)),
                };
                let value = record.and_then(|r| r.column_value(field.column()));
                let mut widget = uitype.render_for_edit(field, value.as_deref(), &ctx);

                if field.data.repeated {
                    let mut confirmation = widget.clone();
                    confirmation.name = format!("{}_confirmation", field.name);
                    confirmation.label =
                        translator.trans(&format!("{label_key}_confirmation"), Some(module));
                    widget.confirmation = Some(Box::new(confirmation));
                }
                trace!(module = %module.name, field = %field.name, form_type = %widget.form_type, "form widget");
                widget
            })
            .collect()
    }

    /// Label of the submit button.
    pub fn submit_label(&self, module: &ModuleDef) -> String {
        self.panel.translator.trans("button.save", Some(module))
    }
}
