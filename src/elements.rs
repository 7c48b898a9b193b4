//! Page elements for form pages. Each variant maps to one template identifier used by the renderer.

use crate::column::ColumnType;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

pub const PARAGRAPH_TEMPLATE: &str = "paragraph.ftl";
pub const FORM_INPUT_TEMPLATE: &str = "form_input.ftl";
pub const FORM_INPUT_GROUP_TEMPLATE: &str = "form_input_group.ftl";
pub const FORM_SELECT_TEMPLATE: &str = "form_select.ftl";

/// One `<option>` of a select field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        SelectOption {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl<V: Into<String>, L: Into<String>> From<(V, L)> for SelectOption {
    fn from((value, label): (V, L)) -> Self {
        SelectOption::new(value, label)
    }
}

/// Produces select options at render time. Invoked from request threads.
pub type OptionSupplier = Arc<dyn Fn() -> Vec<SelectOption> + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormInput {
    pub column: String,
    pub column_type: ColumnType,
}

#[derive(Clone)]
pub struct FormSelect {
    pub column: String,
    pub column_type: ColumnType,
    supplier: OptionSupplier,
}

impl fmt::Debug for FormSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSelect")
            .field("column", &self.column)
            .field("column_type", &self.column_type)
            .finish_non_exhaustive()
    }
}

impl FormSelect {
    pub fn new(column: impl Into<String>, column_type: ColumnType, supplier: OptionSupplier) -> Self {
        FormSelect {
            column: column.into(),
            column_type,
            supplier,
        }
    }

    /// Calls the supplier. Never cached: each render sees current data.
    pub fn options(&self) -> Vec<SelectOption> {
        (self.supplier)()
    }
}

/// Ordered group of inputs and selects. Insertion order is layout order.
#[derive(Clone, Debug, Default)]
pub struct FormInputGroup {
    pub header: Option<String>,
    inputs: Vec<PageElement>,
}

impl FormInputGroup {
    pub fn new(header: Option<String>) -> Self {
        FormInputGroup {
            header,
            inputs: Vec::new(),
        }
    }

    pub fn add_input(&mut self, input: FormInput) {
        self.inputs.push(PageElement::FormInput(input));
    }

    pub fn add_select(&mut self, select: FormSelect) {
        self.inputs.push(PageElement::FormSelect(select));
    }

    pub fn inputs(&self) -> &[PageElement] {
        &self.inputs
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

#[derive(Clone, Debug)]
pub enum PageElement {
    Paragraph(Paragraph),
    FormInput(FormInput),
    FormInputGroup(FormInputGroup),
    FormSelect(FormSelect),
}

impl PageElement {
    /// Template identifier; renaming one breaks the rendering layer.
    pub fn template_name(&self) -> &'static str {
        match self {
            PageElement::Paragraph(_) => PARAGRAPH_TEMPLATE,
            PageElement::FormInput(_) => FORM_INPUT_TEMPLATE,
            PageElement::FormInputGroup(_) => FORM_INPUT_GROUP_TEMPLATE,
            PageElement::FormSelect(_) => FORM_SELECT_TEMPLATE,
        }
    }

    /// Column this element is bound to, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            PageElement::FormInput(i) => Some(i.column.as_str()),
            PageElement::FormSelect(s) => Some(s.column.as_str()),
            PageElement::Paragraph(_) | PageElement::FormInputGroup(_) => None,
        }
    }

    /// Template model for this element. Select options are produced by the supplier on every call.
    pub fn view(&self) -> Value {
        match self {
            PageElement::Paragraph(p) => json!({
                "template": PARAGRAPH_TEMPLATE,
                "text": p.text,
            }),
            PageElement::FormInput(i) => json!({
                "template": FORM_INPUT_TEMPLATE,
                "column": i.column,
                "type": i.column_type,
            }),
            PageElement::FormInputGroup(g) => json!({
                "template": FORM_INPUT_GROUP_TEMPLATE,
                "header": g.header,
                "inputs": g.inputs.iter().map(PageElement::view).collect::<Vec<_>>(),
            }),
            PageElement::FormSelect(s) => json!({
                "template": FORM_SELECT_TEMPLATE,
                "column": s.column,
                "type": s.column_type,
                "options": s.options(),
            }),
        }
    }
}
