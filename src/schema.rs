use serde_json::{Map, Value};

/// Shape of one page's per-language content.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Schema identifier (usually the page slug)
    pub name: &'static str,

    /// Top-level fields, in display order
    pub fields: Vec<FieldSpec>,

    /// Rule deciding whether a stored record counts as real content
    pub presence: PresenceRule,

    /// Title-equivalent fields, tried in order when promoting a display title
    pub title_fields: Vec<&'static str>,
}

/// One field of a schema or of a group.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Current (canonical) field name, the only one ever written
    pub name: &'static str,

    pub kind: FieldKind,

    /// Legacy names this field may be stored under
    pub aliases: Vec<&'static str>,

    /// Decorative fields (icons, colours, status) never make a group worth keeping
    pub decorative: bool,

    /// Values are links; checked by the translation validator
    pub url: bool,
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    /// String or number; `default` seeds newly added entries
    Scalar { default: Value },

    /// Engine-managed position number, contiguous from 1 inside its list
    Sequence,

    /// Ordered list of scalar values
    FlatList {
        item_default: Value,
        allow_blank: bool,
    },

    /// Ordered list of groups, each shaped by `fields`
    GroupList {
        fields: Vec<FieldSpec>,
        keep: KeepRule,
    },
}

/// Decides whether a serialized group survives into storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeepRule {
    /// Kept if any non-decorative, non-sequence field is non-blank
    Meaningful,

    /// Kept if any of the named fields is non-blank (lists count after filtering)
    AnyOf(Vec<&'static str>),

    /// Always kept, even when blank
    Always,
}

/// Decides whether a language record has real content of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceRule {
    /// Any of the named fields is non-blank
    Fields(Vec<&'static str>),

    /// Any of the named fields is non-blank, or the first list field is non-empty
    FieldsOrFirstList(Vec<&'static str>),
}

impl Schema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            presence: PresenceRule::FieldsOrFirstList(Vec::new()),
            title_fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn presence(mut self, rule: PresenceRule) -> Self {
        self.presence = rule;
        self
    }

    pub fn title_fields(mut self, fields: &[&'static str]) -> Self {
        self.title_fields = fields.to_vec();
        self
    }

    /// Look up a top-level field by its current name.
    pub fn find(&self, name: &str) -> Option<&FieldSpec> {
        find_field(&self.fields, name)
    }

    /// The first list field (flat or grouped) in schema order.
    pub fn first_list(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.is_list())
    }

    /// Resolve a chain of field names (indices already stripped) to the spec
    /// of the last field. Every intermediate field must be a group list.
    pub fn resolve_names(&self, names: &[&str]) -> Option<&FieldSpec> {
        let (last, parents) = names.split_last()?;
        let mut fields = &self.fields;
        for name in parents {
            match &find_field(fields, name)?.kind {
                FieldKind::GroupList { fields: nested, .. } => fields = nested,
                _ => return None,
            }
        }
        find_field(fields, last)
    }
}

impl FieldSpec {
    pub fn scalar(name: &'static str) -> Self {
        Self::with_kind(
            name,
            FieldKind::Scalar {
                default: Value::String(String::new()),
            },
        )
    }

    pub fn sequence(name: &'static str) -> Self {
        Self::with_kind(name, FieldKind::Sequence)
    }

    pub fn flat_list(name: &'static str) -> Self {
        Self::with_kind(
            name,
            FieldKind::FlatList {
                item_default: Value::String(String::new()),
                allow_blank: false,
            },
        )
    }

    pub fn group_list(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self::with_kind(
            name,
            FieldKind::GroupList {
                fields,
                keep: KeepRule::Meaningful,
            },
        )
    }

    fn with_kind(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            aliases: Vec::new(),
            decorative: false,
            url: false,
        }
    }

    /// Set the value a newly added entry starts with. Applies to scalars and
    /// to the items of a flat list.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        match &mut self.kind {
            FieldKind::Scalar { default } => *default = value.into(),
            FieldKind::FlatList { item_default, .. } => *item_default = value.into(),
            FieldKind::Sequence | FieldKind::GroupList { .. } => {}
        }
        self
    }

    pub fn alias(mut self, legacy_name: &'static str) -> Self {
        self.aliases.push(legacy_name);
        self
    }

    pub fn decorative(mut self) -> Self {
        self.decorative = true;
        self
    }

    pub fn url(mut self) -> Self {
        self.url = true;
        self
    }

    pub fn allow_blank(mut self) -> Self {
        if let FieldKind::FlatList { allow_blank, .. } = &mut self.kind {
            *allow_blank = true;
        }
        self
    }

    pub fn keep(mut self, rule: KeepRule) -> Self {
        if let FieldKind::GroupList { keep, .. } = &mut self.kind {
            *keep = rule;
        }
        self
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::FlatList { .. } | FieldKind::GroupList { .. }
        )
    }

    /// Whether a stored value of this field holds something an editor entered.
    ///
    /// Lists are judged after the filtering applied when they are saved: blank
    /// flat items don't count (unless `allow_blank`), and neither do groups
    /// their keep rule would drop.
    pub fn has_content(&self, value: &Value) -> bool {
        match &self.kind {
            FieldKind::Scalar { .. } | FieldKind::Sequence => !is_blank(value),
            FieldKind::FlatList { allow_blank, .. } => value.as_array().is_some_and(|items| {
                items
                    .iter()
                    .filter(|item| !item.is_array() && !item.is_object())
                    .any(|item| *allow_blank || !is_blank(item))
            }),
            FieldKind::GroupList { fields, keep } => value.as_array().is_some_and(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_object)
                    .any(|entry| keeps_group(fields, keep, entry))
            }),
        }
    }

    /// The sequence field of a group list, if it has one.
    pub fn sequence_field(&self) -> Option<&'static str> {
        match &self.kind {
            FieldKind::GroupList { fields, .. } => fields
                .iter()
                .find(|field| matches!(field.kind, FieldKind::Sequence))
                .map(|field| field.name),
            _ => None,
        }
    }
}

fn find_field<'a>(fields: &'a [FieldSpec], name: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|field| field.name == name)
}

/// Whether a group entry survives into storage under `rule`.
pub fn keeps_group(fields: &[FieldSpec], rule: &KeepRule, entry: &Map<String, Value>) -> bool {
    let filled = |name: &str| match (entry.get(name), find_field(fields, name)) {
        (Some(value), Some(field)) => field.has_content(value),
        (Some(value), None) => !is_blank(value),
        (None, _) => false,
    };
    match rule {
        KeepRule::Always => true,
        KeepRule::AnyOf(names) => names.iter().any(|name| filled(name)),
        KeepRule::Meaningful => fields
            .iter()
            .filter(|field| !field.decorative && !matches!(field.kind, FieldKind::Sequence))
            .any(|field| filled(field.name)),
    }
}

/// Whether a stored value carries nothing an editor entered.
///
/// Null, whitespace-only strings, empty lists and empty objects are blank.
/// Numbers and booleans are never blank.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn levels_schema() -> Schema {
        Schema::new("careers")
            .field(FieldSpec::scalar("heroTitle"))
            .field(FieldSpec::group_list(
                "levels",
                vec![
                    FieldSpec::sequence("levelNumber"),
                    FieldSpec::scalar("name"),
                    FieldSpec::flat_list("positions"),
                ],
            ))
            .presence(PresenceRule::Fields(vec!["heroTitle"]))
            .title_fields(&["heroTitle"])
    }

    #[test]
    fn test_find_top_level_field() {
        let schema = levels_schema();
        assert!(schema.find("heroTitle").is_some());
        assert!(schema.find("missing").is_none());
    }

    #[test]
    fn test_first_list_skips_scalars() {
        let schema = levels_schema();
        assert_eq!(schema.first_list().map(|f| f.name), Some("levels"));
    }

    #[test]
    fn test_resolve_nested_names() {
        let schema = levels_schema();
        let positions = schema.resolve_names(&["levels", "positions"]).unwrap();
        assert!(matches!(positions.kind, FieldKind::FlatList { .. }));
        assert!(schema.resolve_names(&["heroTitle", "positions"]).is_none());
        assert!(schema.resolve_names(&[]).is_none());
    }

    #[test]
    fn test_sequence_field_detection() {
        let schema = levels_schema();
        assert_eq!(
            schema.find("levels").unwrap().sequence_field(),
            Some("levelNumber")
        );
        assert_eq!(schema.find("heroTitle").unwrap().sequence_field(), None);
    }

    #[test]
    fn test_with_default_on_scalar_and_flat_list() {
        let icon = FieldSpec::scalar("icon").with_default("fa-star");
        assert!(matches!(icon.kind, FieldKind::Scalar { ref default } if default == "fa-star"));

        let tags = FieldSpec::flat_list("tags").with_default("new").allow_blank();
        match tags.kind {
            FieldKind::FlatList {
                item_default,
                allow_blank,
            } => {
                assert_eq!(item_default, json!("new"));
                assert!(allow_blank);
            }
            _ => panic!("expected flat list"),
        }
    }

    #[test]
    fn test_keep_only_applies_to_group_lists() {
        let links = FieldSpec::group_list("links", vec![FieldSpec::scalar("url")])
            .keep(KeepRule::AnyOf(vec!["url"]));
        assert!(matches!(
            links.kind,
            FieldKind::GroupList { ref keep, .. } if *keep == KeepRule::AnyOf(vec!["url"])
        ));

        let title = FieldSpec::scalar("title").keep(KeepRule::Always);
        assert!(matches!(title.kind, FieldKind::Scalar { .. }));
    }

    #[test]
    fn test_has_content_filters_lists() {
        let schema = levels_schema();
        let positions = schema.resolve_names(&["levels", "positions"]).unwrap();
        assert!(!positions.has_content(&json!(["", "  "])));
        assert!(positions.has_content(&json!(["", "dev"])));
        assert!(FieldSpec::flat_list("notes").allow_blank().has_content(&json!([""])));

        let levels = schema.find("levels").unwrap();
        assert!(!levels.has_content(&json!([{"levelNumber": 1, "name": "", "positions": [""]}])));
        assert!(levels.has_content(&json!([{"levelNumber": 1, "name": "", "positions": ["dev"]}])));
        assert!(!levels.has_content(&json!("not a list")));
    }

    #[test]
    fn test_keeps_group_rules() {
        let fields = vec![
            FieldSpec::scalar("label"),
            FieldSpec::scalar("icon").with_default("fa-star").decorative(),
            FieldSpec::flat_list("links"),
        ];
        let entry = |value: Value| value.as_object().unwrap().clone();

        let decorated = entry(json!({"label": "", "icon": "fa-star", "links": [""]}));
        assert!(!keeps_group(&fields, &KeepRule::Meaningful, &decorated));
        assert!(keeps_group(&fields, &KeepRule::Always, &decorated));

        let linked = entry(json!({"label": "", "links": ["https://a.org"]}));
        assert!(keeps_group(&fields, &KeepRule::AnyOf(vec!["links"]), &linked));
        assert!(!keeps_group(&fields, &KeepRule::AnyOf(vec!["label"]), &linked));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!("   ")));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!({})));
        assert!(!is_blank(&json!("x")));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!(false)));
        assert!(!is_blank(&json!([""])));
    }
}
