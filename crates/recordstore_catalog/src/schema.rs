//! Schema definitions.
//!
//! A [`Schema`] is a named, ordered list of typed [`Field`]s. Records declare
//! which schemas they provide by dotted name; the catalog reads the declared
//! fields off those records when indexing.

use std::fmt;

/// The declared kind of a schema field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Single line of text.
    TextLine,
    /// Single line of bytes, usually ASCII.
    BytesLine,
    /// Multi-line text.
    Text,
    /// Raw bytes.
    Bytes,
    /// Integer.
    Int,
    /// Floating point number.
    Float,
    /// Fixed-point decimal.
    Decimal,
    /// Boolean.
    Bool,
    /// Calendar date.
    Date,
    /// Date and time.
    Datetime,
    /// Time of day.
    Time,
    /// Duration.
    Timedelta,
    /// Ordered collection.
    List(Box<FieldKind>),
    /// Unordered collection of unique values.
    Set(Box<FieldKind>),
    /// Fixed sequence.
    Tuple(Box<FieldKind>),
}

impl FieldKind {
    /// Tag used in index names.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::TextLine => "TextLine",
            Self::BytesLine => "BytesLine",
            Self::Text => "Text",
            Self::Bytes => "Bytes",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Decimal => "Decimal",
            Self::Bool => "Bool",
            Self::Date => "Date",
            Self::Datetime => "Datetime",
            Self::Time => "Time",
            Self::Timedelta => "Timedelta",
            Self::List(_) => "List",
            Self::Set(_) => "Set",
            Self::Tuple(_) => "Tuple",
        }
    }

    /// Returns the element kind of a collection.
    pub fn element(&self) -> Option<&FieldKind> {
        match self {
            Self::List(inner) | Self::Set(inner) | Self::Tuple(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns true for list, set and tuple kinds.
    pub fn is_collection(&self) -> bool {
        self.element().is_some()
    }

    /// Returns true for single-line text and bytes.
    pub fn is_single_line(&self) -> bool {
        matches!(self, Self::TextLine | Self::BytesLine)
    }

    /// Returns true for any text kind, single- or multi-line.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::TextLine | Self::BytesLine | Self::Text)
    }

    /// Returns true for text and byte kinds, the kinds a text index can read.
    pub fn is_textual(&self) -> bool {
        self.is_text() || matches!(self, Self::Bytes)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.element() {
            Some(inner) => write!(f, "{}<{inner}>", self.tag()),
            None => f.write_str(self.tag()),
        }
    }
}

/// A typed field declared by a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Attribute name read off records.
    pub name: String,
    /// Human-readable title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Declared kind.
    pub kind: FieldKind,
}

impl Field {
    /// Creates a field with an empty title and description.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            description: String::new(),
            kind,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A named set of fields.
///
/// Names are dotted identifiers (`"app.schemas.Article"`) so they can be
/// resolved back to the definition through a [`crate::DottedNameResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    /// Creates a schema with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field. A field with the same name is replaced in place.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Returns the dotted name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
