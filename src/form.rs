use crate::error::{Result, SyncError};
use crate::i18n::Language;
use crate::record::{LanguageRecord, Translations};
use crate::resolve::{normalize_aliases, normalize_group};
use crate::schema::{FieldKind, FieldSpec, Schema};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error};

/// What to do when a caller addresses a node that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesyncPolicy {
    /// Panic immediately (development)
    Panic,

    /// Log the violation and leave the tree untouched (production)
    Ignore,
}

impl Default for DesyncPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            DesyncPolicy::Panic
        } else {
            DesyncPolicy::Ignore
        }
    }
}

// ==================== Paths ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Dotted address of a node: `"heroTitle"`, `"levels"`, `"levels.0.positions"`,
/// `"items.2"`. Field names and indices alternate, starting with a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || SyncError::InvalidPath(raw.to_string());
        let mut segments = Vec::new();

        for (position, part) in raw.split('.').enumerate() {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid());
            }
            let expects_field = position % 2 == 0;
            let is_index = part.bytes().all(|b| b.is_ascii_digit());
            match (expects_field, is_index) {
                (true, false) => segments.push(PathSegment::Field(part.to_string())),
                (false, true) => {
                    let index = part.parse().map_err(|_| invalid())?;
                    segments.push(PathSegment::Index(index));
                }
                _ => return Err(invalid()),
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Field names along the path, indices stripped.
    pub fn field_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                PathSegment::Field(name) => Some(name.as_str()),
                PathSegment::Index(_) => None,
            })
            .collect()
    }

    fn ends_with_field(&self) -> bool {
        matches!(self.segments.last(), Some(PathSegment::Field(_)))
    }
}

impl FromStr for FieldPath {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ==================== Nodes ====================

#[derive(Debug, Clone, PartialEq)]
pub enum FormNode {
    /// Scalar control (also a flat-list entry)
    Value(Value),

    /// Ordered container of entries
    List(FormArray),

    /// Group of named controls (a group-list entry)
    Group(FormGroup),
}

impl FormNode {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FormNode::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&FormArray> {
        match self {
            FormNode::List(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&FormGroup> {
        match self {
            FormNode::Group(group) => Some(group),
            _ => None,
        }
    }
}

/// Named controls in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormGroup {
    controls: Vec<(&'static str, FormNode)>,
}

impl FormGroup {
    pub fn get(&self, name: &str) -> Option<&FormNode> {
        self.controls
            .iter()
            .find(|(control, _)| *control == name)
            .map(|(_, node)| node)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FormNode> {
        self.controls
            .iter_mut()
            .find(|(control, _)| *control == name)
            .map(|(_, node)| node)
    }

    /// Scalar value of a control.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(FormNode::as_value)
    }

    /// List container of a control.
    pub fn list(&self, name: &str) -> Option<&FormArray> {
        self.get(name).and_then(FormNode::as_list)
    }

    pub fn controls(&self) -> impl Iterator<Item = (&'static str, &FormNode)> {
        self.controls.iter().map(|(name, node)| (*name, node))
    }

    fn ensure(&mut self, name: &'static str) -> &mut FormNode {
        match self.controls.iter().position(|(control, _)| *control == name) {
            Some(index) => &mut self.controls[index].1,
            None => {
                self.controls
                    .push((name, FormNode::Value(Value::String(String::new()))));
                let last = self.controls.len() - 1;
                &mut self.controls[last].1
            }
        }
    }
}

/// Ordered entries of a repeatable field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormArray {
    entries: Vec<FormNode>,
}

impl FormArray {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FormNode> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormNode> {
        self.entries.iter()
    }

    fn push(&mut self, node: FormNode) {
        self.entries.push(node);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    /// Rewrite `field` in every group entry to its 1-based position.
    fn renumber(&mut self, field: &'static str) {
        for (position, entry) in self.entries.iter_mut().enumerate() {
            if let FormNode::Group(group) = entry {
                *group.ensure(field) = FormNode::Value(Value::from(position + 1));
            }
        }
    }
}

// ==================== Tree ====================

/// One editable group per language, shaped by a schema.
///
/// Containers are mutated in place: reloading a language clears and refills
/// the same arrays, so a path to a list keeps addressing the live list.
#[derive(Debug, Clone)]
pub struct FormTree<'s> {
    schema: &'s Schema,
    languages: BTreeMap<Language, FormGroup>,
    policy: DesyncPolicy,
}

impl<'s> FormTree<'s> {
    /// A tree with an empty, schema-shaped group for every language.
    pub fn new(schema: &'s Schema, policy: DesyncPolicy) -> Self {
        let languages = Language::all()
            .into_iter()
            .map(|language| (language, build_group(&schema.fields, None, None, Seed::Loaded)))
            .collect();
        Self {
            schema,
            languages,
            policy,
        }
    }

    /// A tree populated from stored translations (absent languages load empty).
    pub fn from_translations(
        schema: &'s Schema,
        translations: &Translations,
        policy: DesyncPolicy,
    ) -> Self {
        let mut tree = Self::new(schema, policy);
        for language in Language::all() {
            tree.populate(language, translations.get(language));
        }
        tree
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn policy(&self) -> DesyncPolicy {
        self.policy
    }

    pub fn group(&self, language: Language) -> Option<&FormGroup> {
        self.languages.get(&language)
    }

    /// Load a record into a language's group.
    ///
    /// Scalars are overwritten (absent means ""), lists are cleared and
    /// refilled in stored order. A missing record loads as fully empty. Legacy
    /// field aliases are read under their current names.
    pub fn populate(&mut self, language: Language, record: Option<&LanguageRecord>) {
        let schema = self.schema;
        let normalized = record
            .map(|record| normalize_aliases(schema, record))
            .unwrap_or_default();
        let root = self
            .languages
            .entry(language)
            .or_insert_with(FormGroup::default);

        for field in &schema.fields {
            let source = normalized.get(field.name);
            let node = root.ensure(field.name);
            match (&field.kind, node) {
                (FieldKind::FlatList { .. }, FormNode::List(array)) => {
                    array.clear();
                    for item in source.and_then(Value::as_array).into_iter().flatten() {
                        array.push(FormNode::Value(item.clone()));
                    }
                }
                (FieldKind::GroupList { fields, .. }, FormNode::List(array)) => {
                    array.clear();
                    let groups = source.and_then(Value::as_array).into_iter().flatten();
                    for (index, group) in groups.filter_map(Value::as_object).enumerate() {
                        array.push(FormNode::Group(build_group(
                            fields,
                            Some(group),
                            Some(index + 1),
                            Seed::Loaded,
                        )));
                    }
                }
                (_, node) => *node = build_node(field, source, None, Seed::Loaded),
            }
        }

        debug!("Populated {} form for '{}'", language, schema.name);
    }

    // ==================== Reads ====================

    /// The list container at `path`.
    pub fn list(&self, language: Language, path: &str) -> Option<&FormArray> {
        let path = FieldPath::parse(path).ok()?;
        self.node(language, &path).and_then(FormNode::as_list)
    }

    /// The scalar value at `path` (a group field or a flat-list entry).
    pub fn value(&self, language: Language, path: &str) -> Option<&Value> {
        let path = FieldPath::parse(path).ok()?;
        self.node(language, &path).and_then(FormNode::as_value)
    }

    fn node(&self, language: Language, path: &FieldPath) -> Option<&FormNode> {
        let mut group = self.languages.get(&language)?;
        let mut node: Option<&FormNode> = None;
        for segment in path.segments() {
            node = Some(match segment {
                PathSegment::Field(name) => match node {
                    None => group.get(name)?,
                    Some(FormNode::Group(current)) => {
                        group = current;
                        group.get(name)?
                    }
                    Some(_) => return None,
                },
                PathSegment::Index(index) => node?.as_list()?.get(*index)?,
            });
        }
        node
    }

    fn node_mut(&mut self, language: Language, path: &FieldPath) -> Option<&mut FormNode> {
        let root = self.languages.get_mut(&language)?;
        let (first, rest) = path.segments().split_first()?;
        let PathSegment::Field(name) = first else {
            return None;
        };
        let mut node = root.get_mut(name)?;
        for segment in rest {
            node = match (segment, node) {
                (PathSegment::Index(index), FormNode::List(array)) => {
                    array.entries.get_mut(*index)?
                }
                (PathSegment::Field(name), FormNode::Group(group)) => group.get_mut(name)?,
                _ => return None,
            };
        }
        Some(node)
    }

    // ==================== Edits ====================

    /// Append an entry to the list at `path` in `language`.
    ///
    /// Group fields missing from `initial` take their schema defaults and the
    /// sequence field is set to the new length. Returns the new entry's index.
    pub fn try_add_entry(
        &mut self,
        language: Language,
        path: &str,
        initial: Option<&Value>,
    ) -> Result<usize> {
        let path = FieldPath::parse(path)?;
        let schema = self.schema;
        let spec = self.list_spec(&path)?;
        let array = self.array_mut(language, &path)?;
        let position = array.len() + 1;

        let entry = match &spec.kind {
            FieldKind::FlatList { item_default, .. } => FormNode::Value(
                initial
                    .filter(|value| is_scalar(value))
                    .unwrap_or(item_default)
                    .clone(),
            ),
            FieldKind::GroupList { fields, .. } => {
                let source = initial
                    .and_then(Value::as_object)
                    .map(|group| normalize_group(fields, group));
                FormNode::Group(build_group(fields, source.as_ref(), Some(position), Seed::New))
            }
            FieldKind::Scalar { .. } | FieldKind::Sequence => {
                return Err(SyncError::NotAList {
                    path: path.to_string(),
                    schema: schema.name.to_string(),
                })
            }
        };

        array.push(entry);
        Ok(array.len() - 1)
    }

    /// Remove the entry at `index` from the list at `path`, renumbering the
    /// list's sequence field to `1..N`. Nested lists go with their group.
    pub fn try_remove_entry(
        &mut self,
        language: Language,
        path: &str,
        index: usize,
    ) -> Result<FormNode> {
        let path = FieldPath::parse(path)?;
        let spec = self.list_spec(&path)?;
        let array = self.array_mut(language, &path)?;

        if index >= array.len() {
            return Err(SyncError::IndexOutOfRange {
                path: path.to_string(),
                index,
                len: array.len(),
            });
        }

        let removed = array.entries.remove(index);
        if let Some(sequence) = spec.sequence_field() {
            array.renumber(sequence);
        }
        Ok(removed)
    }

    /// Set a scalar at `path`: a group field (`"steps.0.title"`) or a flat-list
    /// entry (`"items.1"`). Sequence fields are engine-managed and refused.
    pub fn try_set_value(&mut self, language: Language, path: &str, value: Value) -> Result<()> {
        let path = FieldPath::parse(path)?;
        let schema = self.schema;
        let spec = schema.resolve_names(&path.field_names());
        let settable = match spec.map(|spec| &spec.kind) {
            Some(FieldKind::Scalar { .. }) => path.ends_with_field(),
            Some(FieldKind::FlatList { .. }) => !path.ends_with_field(),
            _ => false,
        };
        if !settable || !is_scalar(&value) {
            return Err(SyncError::NotAScalar {
                path: path.to_string(),
                schema: schema.name.to_string(),
            });
        }

        match self.node_mut(language, &path) {
            Some(FormNode::Value(current)) => {
                *current = value;
                Ok(())
            }
            _ => Err(SyncError::MissingNode {
                path: path.to_string(),
                language: language.to_string(),
            }),
        }
    }

    /// [`try_add_entry`](Self::try_add_entry) under the tree's desync policy.
    pub fn add_entry(
        &mut self,
        language: Language,
        path: &str,
        initial: Option<&Value>,
    ) -> Option<usize> {
        let result = self.try_add_entry(language, path, initial);
        self.enforce(result)
    }

    /// [`try_remove_entry`](Self::try_remove_entry) under the tree's desync policy.
    pub fn remove_entry(&mut self, language: Language, path: &str, index: usize) -> Option<FormNode> {
        let result = self.try_remove_entry(language, path, index);
        self.enforce(result)
    }

    /// [`try_set_value`](Self::try_set_value) under the tree's desync policy.
    pub fn set_value(&mut self, language: Language, path: &str, value: Value) -> Option<()> {
        let result = self.try_set_value(language, path, value);
        self.enforce(result)
    }

    fn enforce<T>(&self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => match self.policy {
                DesyncPolicy::Panic => panic!("Form tree desynchronized: {}", e),
                DesyncPolicy::Ignore => {
                    error!("Form tree desynchronized, operation ignored: {}", e);
                    None
                }
            },
        }
    }

    fn list_spec(&self, path: &FieldPath) -> Result<&'s FieldSpec> {
        let schema: &'s Schema = self.schema;
        schema
            .resolve_names(&path.field_names())
            .filter(|spec| spec.is_list() && path.ends_with_field())
            .ok_or_else(|| SyncError::NotAList {
                path: path.to_string(),
                schema: schema.name.to_string(),
            })
    }

    fn array_mut(&mut self, language: Language, path: &FieldPath) -> Result<&mut FormArray> {
        match self.node_mut(language, path) {
            Some(FormNode::List(array)) => Ok(array),
            _ => Err(SyncError::MissingNode {
                path: path.to_string(),
                language: language.to_string(),
            }),
        }
    }
}

// ==================== Construction ====================

/// How a group is being built: from stored data, or as a fresh entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seed {
    /// Absent scalars are ""
    Loaded,

    /// Absent scalars take their schema default; sequence is the position
    New,
}

fn build_group(
    fields: &[FieldSpec],
    source: Option<&Map<String, Value>>,
    position: Option<usize>,
    seed: Seed,
) -> FormGroup {
    let controls = fields
        .iter()
        .map(|field| {
            let value = source.and_then(|group| group.get(field.name));
            (field.name, build_node(field, value, position, seed))
        })
        .collect();
    FormGroup { controls }
}

fn build_node(field: &FieldSpec, source: Option<&Value>, position: Option<usize>, seed: Seed) -> FormNode {
    match &field.kind {
        FieldKind::Scalar { default } => {
            let value = source.filter(|value| is_scalar(value)).cloned();
            FormNode::Value(match (value, seed) {
                (Some(value), _) => value,
                (None, Seed::Loaded) => Value::String(String::new()),
                (None, Seed::New) => default.clone(),
            })
        }
        FieldKind::Sequence => {
            let stored = source.filter(|value| value.is_number()).cloned();
            let value = match (seed, stored, position) {
                (Seed::New, _, Some(position)) => Value::from(position),
                (Seed::Loaded, Some(stored), _) => stored,
                (_, _, Some(position)) => Value::from(position),
                (_, stored, None) => stored.unwrap_or_else(|| Value::String(String::new())),
            };
            FormNode::Value(value)
        }
        FieldKind::FlatList { .. } => {
            let entries = source
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter(|item| is_scalar(item))
                .map(|item| FormNode::Value(item.clone()))
                .collect();
            FormNode::List(FormArray { entries })
        }
        FieldKind::GroupList { fields, .. } => {
            let entries = source
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_object)
                .enumerate()
                .map(|(index, group)| {
                    FormNode::Group(build_group(fields, Some(group), Some(index + 1), seed))
                })
                .collect();
            FormNode::List(FormArray { entries })
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}
