use std::collections::HashSet;

use serde_json::Value;

use super::{label, tree::join_path, value::Scalar};
use crate::error::ReconcileError;

/// Value type accepted by an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrKind {
    /// Free-form string.
    String,
    /// Integer or floating-point number, range unconstrained.
    Number,
    /// Whole number. Stored as a JSON number, so it also satisfies
    /// consumers expecting [`AttrKind::Number`].
    Integer,
    /// Boolean toggle.
    Boolean,
    /// One of a fixed, ordered list of string values.
    Enumeration(Vec<String>),
}

impl AttrKind {
    /// Short name used in listings and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            AttrKind::String => "string",
            AttrKind::Number => "number",
            AttrKind::Integer => "integer",
            AttrKind::Boolean => "boolean",
            AttrKind::Enumeration(_) => "enum",
        }
    }

    /// Allowed values of an enumeration, `None` for other kinds.
    pub fn allowed_values(&self) -> Option<&[String]> {
        match self {
            AttrKind::Enumeration(values) => Some(values),
            _ => None,
        }
    }

    /// Check that `value` satisfies this kind.
    pub fn check(&self, path: &str, value: &Scalar) -> Result<(), ReconcileError> {
        let ok = match (self, value) {
            (AttrKind::String, Scalar::String(_)) => true,
            (AttrKind::Number, Scalar::Number(_)) => true,
            (AttrKind::Integer, Scalar::Number(n)) => n.is_i64() || n.is_u64(),
            (AttrKind::Boolean, Scalar::Bool(_)) => true,
            (AttrKind::Enumeration(values), Scalar::String(s)) => values.contains(s),
            _ => false,
        };
        if ok {
            return Ok(());
        }
        let expected = match self {
            AttrKind::Enumeration(values) => format!("one of: {values:?}"),
            other => other.name().to_string(),
        };
        Err(ReconcileError::TypeMismatch {
            path: path.to_string(),
            expected,
            actual: match value {
                Scalar::String(s) => format!("{s:?}"),
                other => format!("{} {other}", other.type_name()),
            },
        })
    }

    /// Parse user input (a form field or command-line argument) into a value
    /// of this kind.
    pub fn parse(&self, path: &str, input: &str) -> Result<Scalar, ReconcileError> {
        let mismatch = |expected: &str| ReconcileError::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            actual: format!("{input:?}"),
        };
        let value = match self {
            AttrKind::String => Scalar::from(input),
            AttrKind::Number => {
                if let Ok(i) = input.parse::<i64>() {
                    Scalar::from(i)
                } else {
                    input
                        .parse::<f64>()
                        .ok()
                        .and_then(Scalar::float)
                        .ok_or_else(|| mismatch("number"))?
                }
            }
            AttrKind::Integer => input
                .parse::<i64>()
                .map(Scalar::from)
                .map_err(|_| mismatch("integer"))?,
            AttrKind::Boolean => match input {
                "true" | "on" | "yes" => Scalar::from(true),
                "false" | "off" | "no" => Scalar::from(false),
                _ => return Err(mismatch("boolean")),
            },
            AttrKind::Enumeration(_) => Scalar::from(input),
        };
        self.check(path, &value)?;
        Ok(value)
    }
}

/// One configurable setting addressed by a dotted path.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    pub(crate) path: String,
    pub(crate) kind: AttrKind,
    pub(crate) default: Scalar,
    pub(crate) current: Option<Scalar>,
    pub(crate) description: Option<String>,
}

impl AttributeDescriptor {
    pub fn new(path: impl Into<String>, kind: AttrKind, default: impl Into<Scalar>) -> Self {
        Self {
            path: path.into(),
            kind,
            default: default.into(),
            current: None,
            description: None,
        }
    }

    pub fn string(path: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(path, AttrKind::String, Scalar::String(default.into()))
    }

    pub fn number(path: impl Into<String>, default: impl Into<Scalar>) -> Self {
        Self::new(path, AttrKind::Number, default)
    }

    pub fn integer(path: impl Into<String>, default: i64) -> Self {
        Self::new(path, AttrKind::Integer, default)
    }

    pub fn boolean(path: impl Into<String>, default: bool) -> Self {
        Self::new(path, AttrKind::Boolean, default)
    }

    pub fn enumeration<I, S>(path: impl Into<String>, values: I, default: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        Self::new(
            path,
            AttrKind::Enumeration(values),
            Scalar::String(default.into()),
        )
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &AttrKind {
        &self.kind
    }

    pub fn default_value(&self) -> &Scalar {
        &self.default
    }

    /// Effective value: the explicit value if set, otherwise the default.
    pub fn current_value(&self) -> &Scalar {
        self.current.as_ref().unwrap_or(&self.default)
    }

    /// Explicit value. `None` means the attribute inherits its default.
    pub fn explicit_value(&self) -> Option<&Scalar> {
        self.current.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Human-readable name of the attribute.
    pub fn label(&self) -> String {
        label::path_label(&self.path)
    }

    /// Human-readable names for the allowed values of an enumeration.
    pub fn value_labels(&self) -> Vec<String> {
        self.kind
            .allowed_values()
            .map(|values| values.iter().map(|v| label::display_name(v)).collect())
            .unwrap_or_default()
    }

    /// Parse user input into a value of this attribute's kind.
    pub fn parse_value(&self, input: &str) -> Result<Scalar, ReconcileError> {
        self.kind.parse(&self.path, input)
    }
}

/// Ordered catalog of attribute descriptors with unique paths.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorList {
    items: Vec<AttributeDescriptor>,
}

impl DescriptorList {
    /// Validate and build a descriptor list.
    ///
    /// Paths must be non-empty, have no empty segments, be unique, and no
    /// path may nest under another one. Defaults must match their kind.
    pub fn new(items: Vec<AttributeDescriptor>) -> Result<Self, ReconcileError> {
        let mut seen = HashSet::new();
        for item in &items {
            let path = item.path.as_str();
            if path.is_empty() || path.split('.').any(str::is_empty) {
                return Err(ReconcileError::descriptor(path, "empty path segment"));
            }
            if !seen.insert(path) {
                return Err(ReconcileError::descriptor(path, "duplicate path"));
            }
            if let AttrKind::Enumeration(values) = &item.kind
                && values.is_empty()
            {
                return Err(ReconcileError::descriptor(path, "enumeration has no values"));
            }
            item.kind.check(path, &item.default).map_err(|e| {
                ReconcileError::descriptor(path, format!("default does not match kind: {e}"))
            })?;
        }
        for item in &items {
            let segments: Vec<&str> = item.path.split('.').collect();
            for end in 1..segments.len() {
                let prefix = segments[..end].join(".");
                if seen.contains(prefix.as_str()) {
                    return Err(ReconcileError::descriptor(
                        &item.path,
                        format!("nests under attribute `{prefix}`"),
                    ));
                }
            }
        }
        Ok(Self { items })
    }

    /// Build a descriptor list from a JSON Schema document.
    ///
    /// Nested `properties` of objects become dotted path prefixes. Leaves of
    /// type string, number, integer or boolean become descriptors; a string
    /// `enum` becomes an enumeration. Leaves without a `default` are skipped.
    /// Local `$ref`s into `$defs` or `definitions` are followed.
    ///
    /// A property that refers back to an object already being expanded (a
    /// recursive type) is skipped, since it has no finite set of paths. A
    /// `$ref` chain that never reaches a schema is an error.
    pub fn from_schema(schema: &Value) -> Result<Self, ReconcileError> {
        let mut items = Vec::new();
        let (root, refs) = resolve(schema, schema, "")?;
        if root.get("properties").and_then(Value::as_object).is_none() {
            return Err(ReconcileError::descriptor("", "schema root has no properties"));
        }
        let mut expanding = vec!["#"];
        expanding.extend(refs);
        collect_schema(schema, root, "", &mut expanding, &mut items)?;
        Self::new(items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeDescriptor> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, AttributeDescriptor> {
        self.items.iter_mut()
    }

    pub fn get(&self, path: &str) -> Option<&AttributeDescriptor> {
        self.items.iter().find(|d| d.path == path)
    }

    pub(crate) fn get_mut(&mut self, path: &str) -> Option<&mut AttributeDescriptor> {
        self.items.iter_mut().find(|d| d.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|d| d.path.as_str())
    }
}

impl<'a> IntoIterator for &'a DescriptorList {
    type Item = &'a AttributeDescriptor;
    type IntoIter = std::slice::Iter<'a, AttributeDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Follow `$ref`s until a concrete schema is reached. Returns the schema and
/// the references followed to get there.
fn resolve<'a>(
    root: &'a Value,
    mut node: &'a Value,
    path: &str,
) -> Result<(&'a Value, Vec<&'a str>), ReconcileError> {
    let mut refs: Vec<&str> = Vec::new();
    loop {
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            if refs.contains(&reference) {
                return Err(ReconcileError::descriptor(
                    path,
                    format!("recursive $ref `{reference}` never reaches a schema"),
                ));
            }
            let pointer = reference.strip_prefix('#').ok_or_else(|| {
                ReconcileError::descriptor(path, format!("unsupported $ref `{reference}`"))
            })?;
            node = root.pointer(pointer).ok_or_else(|| {
                ReconcileError::descriptor(path, format!("unresolved $ref `{reference}`"))
            })?;
            refs.push(reference);
            continue;
        }
        // Wrapped references: `allOf: [{ "$ref": ... }]`.
        if let Some([single]) = node.get("allOf").and_then(Value::as_array).map(Vec::as_slice) {
            node = single;
            continue;
        }
        return Ok((node, refs));
    }
}

fn collect_schema<'a>(
    root: &'a Value,
    node: &'a Value,
    prefix: &str,
    expanding: &mut Vec<&'a str>,
    out: &mut Vec<AttributeDescriptor>,
) -> Result<(), ReconcileError> {
    let Some(props) = node.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    for (key, prop) in props {
        let path = join_path(prefix, key);
        let (prop, refs) = resolve(root, prop, &path)?;
        if refs.iter().any(|r| expanding.contains(r)) {
            log::debug!("skipping recursive schema property `{path}`");
            continue;
        }
        if prop.get("properties").is_some() {
            let depth = expanding.len();
            expanding.extend(refs);
            collect_schema(root, prop, &path, expanding, out)?;
            expanding.truncate(depth);
            continue;
        }
        match leaf_from_schema(&path, prop) {
            Some(d) => out.push(d),
            None => log::debug!("skipping schema property `{path}`"),
        }
    }
    Ok(())
}

fn leaf_from_schema(path: &str, prop: &Value) -> Option<AttributeDescriptor> {
    let default = Scalar::from_json(prop.get("default")?)?;

    let kind = if let Some(variants) = prop.get("enum").and_then(Value::as_array) {
        let values = variants
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        AttrKind::Enumeration(values)
    } else {
        match schema_type(prop)? {
            "string" => AttrKind::String,
            "number" => AttrKind::Number,
            "integer" => AttrKind::Integer,
            "boolean" => AttrKind::Boolean,
            _ => return None,
        }
    };

    let mut descriptor = AttributeDescriptor::new(path, kind, default);
    descriptor.description = prop
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(descriptor)
}

/// The `type` keyword, skipping `"null"` in a type list (`["string", "null"]`).
fn schema_type(prop: &Value) -> Option<&str> {
    match prop.get("type")? {
        Value::String(s) => Some(s),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}
