//! Form schema arena
//!
//! The schema is a tree of fields stored in a flat arena. Fields refer to
//! their parent and children by [`FieldId`] index, so there are no owning
//! back-pointers and no reference cycles.
//!
//! Fully-qualified names (FQNs) join the names of every non-root ancestor
//! and the field itself with `-`. The root field's FQN is its own name.

use serde::{Deserialize, Serialize};

/// Index of a field inside a [`FormSchema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(usize);

impl FieldId {
    /// Position of the field in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Declared value kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Integer,
    Decimal,
    Boolean,
    Date,
    Time,
    DateTime,
    Geopoint,
    Geotrace,
    Geoshape,
    Binary,
    /// Audit trail attachment in the meta block
    Audit,
    /// Closed choice list (single or multiple selection)
    Choice,
    /// Group marker; carries no value of its own
    Group,
    /// Any kind without a dedicated mapper
    Other,
}

impl ValueKind {
    /// Kinds whose values are coordinates
    pub fn is_spatial(self) -> bool {
        matches!(self, Self::Geopoint | Self::Geotrace | Self::Geoshape)
    }
}

/// One option of a choice list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Value stored in submissions
    pub value: String,

    /// Display label
    #[serde(default)]
    pub label: Option<String>,
}

/// A single field of the schema tree
#[derive(Debug, Clone)]
pub struct SchemaField {
    /// Element name
    pub name: String,

    /// Declared value kind
    pub kind: ValueKind,

    /// Whether a submission may contain the field several times
    pub repeatable: bool,

    /// Whether the choice list accepts several selections
    pub multiple_choice: bool,

    /// Choice options, in schema order
    pub choices: Vec<ChoiceOption>,

    parent: Option<FieldId>,
    children: Vec<FieldId>,
}

impl SchemaField {
    fn new(name: String, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            repeatable: false,
            multiple_choice: false,
            choices: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// True for a closed choice list allowing multiple selections
    pub fn is_multiple_choice_list(&self) -> bool {
        self.kind == ValueKind::Choice && self.multiple_choice && !self.choices.is_empty()
    }

    /// Parent field, `None` for the root
    pub fn parent(&self) -> Option<FieldId> {
        self.parent
    }

    /// Child fields in declaration order
    pub fn children(&self) -> &[FieldId] {
        &self.children
    }
}

/// Description of a field to add to the schema
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: ValueKind,
    pub repeatable: bool,
    pub multiple_choice: bool,
    pub choices: Vec<ChoiceOption>,
}

impl FieldSpec {
    /// A field of the given kind
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            repeatable: false,
            multiple_choice: false,
            choices: Vec::new(),
        }
    }

    /// A non-repeating group
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Group)
    }

    /// A repeat group
    pub fn repeat(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Group).repeatable()
    }

    fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// A choice list with the given option values
    pub fn choice<I, S>(name: impl Into<String>, multiple: bool, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = Self::new(name, ValueKind::Choice);
        spec.multiple_choice = multiple;
        spec.choices = values
            .into_iter()
            .map(|v| ChoiceOption {
                value: v.into(),
                label: None,
            })
            .collect();
        spec
    }
}

/// The form schema: an arena of fields rooted at index 0
#[derive(Debug, Clone)]
pub struct FormSchema {
    fields: Vec<SchemaField>,
}

impl FormSchema {
    /// Creates a schema containing only the root field
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            fields: vec![SchemaField::new(root_name.into(), ValueKind::Group)],
        }
    }

    /// The root field
    pub fn root(&self) -> FieldId {
        FieldId(0)
    }

    /// Adds a child to `parent` and returns its id
    pub fn add_field(&mut self, parent: FieldId, spec: FieldSpec) -> FieldId {
        let id = FieldId(self.fields.len());
        let mut field = SchemaField::new(spec.name, spec.kind);
        field.repeatable = spec.repeatable;
        field.multiple_choice = spec.multiple_choice;
        field.choices = spec.choices;
        field.parent = Some(parent);
        self.fields.push(field);
        self.fields[parent.0].children.push(id);
        id
    }

    /// Looks up a field
    pub fn field(&self, id: FieldId) -> &SchemaField {
        &self.fields[id.0]
    }

    /// Number of fields including the root
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// A schema always has a root, so it is never empty
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `id` is the root field
    pub fn is_root(&self, id: FieldId) -> bool {
        id.0 == 0
    }

    /// The form's root element name
    pub fn root_name(&self) -> &str {
        &self.fields[0].name
    }

    /// All field ids in depth-first declaration order, root first
    pub fn depth_first(&self) -> Vec<FieldId> {
        let mut out = Vec::with_capacity(self.fields.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.field(id).children.iter().rev().copied());
        }
        out
    }

    /// Fields from the first non-root ancestor down to `id`, inclusive
    pub fn path(&self, id: FieldId) -> Vec<FieldId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(field) = current {
            if self.is_root(field) {
                break;
            }
            path.push(field);
            current = self.field(field).parent;
        }
        path.reverse();
        path
    }

    /// Fields strictly below `ancestor` down to `id`, inclusive
    ///
    /// With `None` this is the same as [`FormSchema::path`].
    pub fn path_from(&self, ancestor: Option<FieldId>, id: FieldId) -> Vec<FieldId> {
        let path = self.path(id);
        match ancestor {
            Some(base) if !self.is_root(base) => match path.iter().position(|f| *f == base) {
                Some(pos) => path[pos + 1..].to_vec(),
                None => path,
            },
            _ => path,
        }
    }

    /// Number of non-root names in the field's path (root is 0)
    pub fn depth(&self, id: FieldId) -> usize {
        self.path(id).len()
    }

    /// Fully-qualified name of a field
    pub fn fqn(&self, id: FieldId) -> String {
        self.fqn_with_shift(id, 0)
    }

    /// FQN with the first `shift` ancestor names removed
    pub fn fqn_with_shift(&self, id: FieldId, shift: usize) -> String {
        if self.is_root(id) {
            return self.field(id).name.clone();
        }
        self.path(id)
            .into_iter()
            .skip(shift)
            .map(|f| self.field(f).name.as_str())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// FQN relative to `base` (the field's names below `base`)
    pub fn relative_fqn(&self, id: FieldId, base: Option<FieldId>) -> String {
        let shift = base.map(|b| self.depth(b)).unwrap_or(0);
        self.fqn_with_shift(id, shift)
    }

    /// Closest repeatable ancestor, excluding the field itself
    pub fn nearest_repeat_ancestor(&self, id: FieldId) -> Option<FieldId> {
        let mut current = self.field(id).parent;
        while let Some(field) = current {
            if self.field(field).repeatable {
                return Some(field);
            }
            current = self.field(field).parent;
        }
        None
    }

    /// Repeat groups in depth-first order
    pub fn repeat_groups(&self) -> Vec<FieldId> {
        self.depth_first()
            .into_iter()
            .filter(|id| {
                let field = self.field(*id);
                field.repeatable && field.kind == ValueKind::Group
            })
            .collect()
    }

    /// Geopoint, geotrace and geoshape fields in depth-first order
    pub fn spatial_fields(&self) -> Vec<FieldId> {
        self.depth_first()
            .into_iter()
            .filter(|id| self.field(*id).kind.is_spatial())
            .collect()
    }

    /// Whether any field collects an audit trail
    pub fn has_audit(&self) -> bool {
        self.fields.iter().any(|f| f.kind == ValueKind::Audit)
    }

    /// Finds a field by FQN
    pub fn find(&self, fqn: &str) -> Option<FieldId> {
        self.depth_first()
            .into_iter()
            .find(|id| !self.is_root(*id) && self.fqn(*id) == fqn)
    }
}
