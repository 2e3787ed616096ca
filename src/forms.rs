//! Typed dialog inputs.
//!
//! Each command declares a [`FormSchema`]; the host renders it and hands back
//! raw `(id, value)` pairs, which are bound against the schema once. Unknown
//! ids and wrongly typed values are rejected at that point, so commands only
//! ever read values the schema promised.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Text,
    MultilineText,
    /// `YYYY-MM-DD`, may be left empty.
    Date,
    Choice(&'static [&'static str]),
    Toggle,
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    Text(String),
    Bool(bool),
}

#[derive(Debug, Clone)]
pub struct InputSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: InputKind,
    pub default: InputValue,
}

impl InputSpec {
    pub fn text(id: &'static str, label: &'static str, default: impl Into<String>) -> Self {
        Self::with_kind(id, label, InputKind::Text, InputValue::Text(default.into()))
    }

    pub fn multiline(id: &'static str, label: &'static str) -> Self {
        Self::with_kind(id, label, InputKind::MultilineText, InputValue::Text(String::new()))
    }

    pub fn date(id: &'static str, label: &'static str, default: impl Into<String>) -> Self {
        Self::with_kind(id, label, InputKind::Date, InputValue::Text(default.into()))
    }

    /// The first option is the default selection.
    pub fn choice(id: &'static str, label: &'static str, options: &'static [&'static str]) -> Self {
        let default = options.first().copied().unwrap_or_default().to_string();
        Self::with_kind(id, label, InputKind::Choice(options), InputValue::Text(default))
    }

    pub fn toggle(id: &'static str, label: &'static str, default: bool) -> Self {
        Self::with_kind(id, label, InputKind::Toggle, InputValue::Bool(default))
    }

    pub fn read_only(id: &'static str, label: &'static str, text: impl Into<String>) -> Self {
        Self::with_kind(id, label, InputKind::ReadOnly, InputValue::Text(text.into()))
    }

    fn with_kind(id: &'static str, label: &'static str, kind: InputKind, default: InputValue) -> Self {
        Self {
            id,
            label,
            kind,
            default,
        }
    }

    fn accepts(&self, value: &InputValue) -> Result<(), FormError> {
        match (&self.kind, value) {
            (InputKind::Toggle, InputValue::Bool(_)) => Ok(()),
            (InputKind::Choice(options), InputValue::Text(t)) => {
                if options.contains(&t.as_str()) {
                    Ok(())
                } else {
                    Err(FormError::InvalidChoice {
                        id: self.id.to_string(),
                        value: t.clone(),
                    })
                }
            }
            (InputKind::Toggle, InputValue::Text(_)) | (_, InputValue::Bool(_)) => {
                Err(FormError::TypeMismatch(self.id.to_string()))
            }
            (_, InputValue::Text(_)) => Ok(()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown input '{0}'")]
    UnknownInput(String),
    #[error("input '{0}' has the wrong value type")]
    TypeMismatch(String),
    #[error("'{value}' is not an option of '{id}'")]
    InvalidChoice { id: String, value: String },
}

#[derive(Debug, Clone)]
pub struct FormSchema {
    inputs: Vec<InputSpec>,
}

impl FormSchema {
    pub fn new(inputs: Vec<InputSpec>) -> Self {
        Self { inputs }
    }

    pub fn inputs(&self) -> &[InputSpec] {
        &self.inputs
    }

    fn spec(&self, id: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|s| s.id == id)
    }

    /// Values as the dialog first shows them.
    pub fn defaults(&self) -> FormValues {
        FormValues {
            values: self
                .inputs
                .iter()
                .map(|s| (s.id, s.default.clone()))
                .collect(),
        }
    }
}

/// Values bound to a schema. Every schema id is present.
#[derive(Debug, Clone)]
pub struct FormValues {
    values: BTreeMap<&'static str, InputValue>,
}

impl FormValues {
    /// Bind raw host values; ids the host did not send keep their defaults.
    pub fn bind<I, K>(schema: &FormSchema, raw: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (K, InputValue)>,
        K: AsRef<str>,
    {
        let mut bound = schema.defaults();
        for (id, value) in raw {
            let spec = schema
                .spec(id.as_ref())
                .ok_or_else(|| FormError::UnknownInput(id.as_ref().to_string()))?;
            spec.accepts(&value)?;
            bound.values.insert(spec.id, value);
        }
        Ok(bound)
    }

    /// Text of an input, trimmed. Empty for toggles.
    pub fn text(&self, id: &str) -> &str {
        match self.values.get(id) {
            Some(InputValue::Text(t)) => t.trim(),
            _ => "",
        }
    }

    pub fn flag(&self, id: &str) -> bool {
        matches!(self.values.get(id), Some(InputValue::Bool(true)))
    }
}

type Validator = Box<dyn Fn(&FormValues) -> bool + Send>;

/// One open dialog: its schema and the handlers registered for it.
///
/// Handlers live exactly as long as the session; closing (or dropping) it
/// releases them.
pub struct DialogSession {
    title: String,
    schema: FormSchema,
    validators: Vec<Validator>,
    closed: bool,
}

impl DialogSession {
    pub fn new(title: impl Into<String>, schema: FormSchema) -> Self {
        Self {
            title: title.into(),
            schema,
            validators: Vec::new(),
            closed: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn on_validate(&mut self, validator: impl Fn(&FormValues) -> bool + Send + 'static) {
        if !self.closed {
            self.validators.push(Box::new(validator));
        }
    }

    pub fn handler_count(&self) -> usize {
        self.validators.len()
    }

    /// Run on every input change; the OK button is enabled only when this
    /// returns `true`.
    pub fn input_changed(&self, values: &FormValues) -> bool {
        !self.closed && self.validators.iter().all(|v| v(values))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        if !self.closed {
            debug!(dialog = %self.title, handlers = self.validators.len(), "dialog closed");
            self.validators.clear();
            self.closed = true;
        }
    }
}

impl Drop for DialogSession {
    fn drop(&mut self) {
        self.close();
    }
}
