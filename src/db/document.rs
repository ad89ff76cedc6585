// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Schemaless documents and partial-update expressions.
//!
//! An [`UpdateExpression`] is an ordered list of assignments against
//! [`FieldPath`]s such as `profile.wakeUpTime` or `profiles[2].selected`.
//! Applying an expression is all-or-nothing for the document it targets.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::{Map, Value};

use super::store::StoreError;

/// A stored item: top-level attribute name to value.
pub type Document = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Path to an attribute, possibly nested inside maps and lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Path to a top-level attribute.
    pub fn field(name: impl Into<String>) -> Self {
        Self(vec![PathSegment::Field(name.into())])
    }

    /// Descend into a map member.
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.0.push(PathSegment::Field(name.into()));
        self
    }

    /// Descend into a list element.
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    /// Name of the top-level attribute this path lives under.
    pub fn root(&self) -> &str {
        match self.0.first() {
            Some(PathSegment::Field(name)) => name,
            _ => "",
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Assign a value, creating missing intermediate maps.
    Set(FieldPath, Value),
    /// Remove an attribute or list element. Missing targets are ignored.
    Remove(FieldPath),
    /// Append to an existing list attribute.
    Append(FieldPath, Vec<Value>),
}

impl UpdateAction {
    fn path(&self) -> &FieldPath {
        match self {
            UpdateAction::Set(path, _)
            | UpdateAction::Remove(path)
            | UpdateAction::Append(path, _) => path,
        }
    }
}

/// Ordered set of assignments applied to a single item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateExpression {
    actions: Vec<UpdateAction>,
}

impl UpdateExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: FieldPath, value: impl Into<Value>) -> Self {
        self.actions.push(UpdateAction::Set(path, value.into()));
        self
    }

    pub fn remove(mut self, path: FieldPath) -> Self {
        self.actions.push(UpdateAction::Remove(path));
        self
    }

    pub fn append(mut self, path: FieldPath, values: Vec<Value>) -> Self {
        self.actions.push(UpdateAction::Append(path, values));
        self
    }

    pub fn push(&mut self, action: UpdateAction) {
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[UpdateAction] {
        &self.actions
    }

    /// Top-level attributes touched by this expression.
    pub fn touched_attributes(&self) -> BTreeSet<String> {
        self.actions
            .iter()
            .map(|action| action.path().root().to_string())
            .collect()
    }

    /// Apply every action to `doc`. On error the document is left untouched.
    pub fn apply(&self, doc: &mut Document) -> Result<(), StoreError> {
        let mut root = Value::Object(doc.clone());

        for action in &self.actions {
            match action {
                UpdateAction::Set(path, value) => {
                    set_path(&mut root, path.segments(), value.clone(), path)?
                }
                UpdateAction::Remove(path) => remove_path(&mut root, path.segments()),
                UpdateAction::Append(path, values) => {
                    let list = get_path_mut(&mut root, path.segments())
                        .and_then(Value::as_array_mut)
                        .ok_or_else(|| {
                            StoreError::InvalidUpdate(format!("'{}' is not an existing list", path))
                        })?;
                    list.extend(values.iter().cloned());
                }
            }
        }

        if let Value::Object(map) = root {
            *doc = map;
        }
        Ok(())
    }
}

fn set_path(
    target: &mut Value,
    segments: &[PathSegment],
    value: Value,
    full: &FieldPath,
) -> Result<(), StoreError> {
    let invalid = || StoreError::InvalidUpdate(format!("invalid document path '{}'", full));

    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return Ok(());
    };

    match head {
        PathSegment::Field(name) => {
            if target.is_null() {
                *target = Value::Object(Map::new());
            }
            let map = target.as_object_mut().ok_or_else(invalid)?;
            if rest.is_empty() {
                map.insert(name.clone(), value);
                return Ok(());
            }
            let child = map.entry(name.clone()).or_insert(Value::Null);
            if child.is_null() && matches!(rest.first(), Some(PathSegment::Index(_))) {
                return Err(invalid());
            }
            set_path(child, rest, value, full)
        }
        PathSegment::Index(index) => {
            let list = target.as_array_mut().ok_or_else(invalid)?;
            if rest.is_empty() {
                match (*index).cmp(&list.len()) {
                    std::cmp::Ordering::Less => list[*index] = value,
                    std::cmp::Ordering::Equal => list.push(value),
                    std::cmp::Ordering::Greater => return Err(invalid()),
                }
                return Ok(());
            }
            let child = list.get_mut(*index).ok_or_else(invalid)?;
            set_path(child, rest, value, full)
        }
    }
}

fn remove_path(target: &mut Value, segments: &[PathSegment]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let Some(parent) = get_path_mut(target, parents) else {
        return;
    };

    match (last, parent) {
        (PathSegment::Field(name), Value::Object(map)) => {
            map.remove(name);
        }
        (PathSegment::Index(index), Value::Array(list)) if *index < list.len() => {
            list.remove(*index);
        }
        _ => {}
    }
}

fn get_path_mut<'a>(target: &'a mut Value, segments: &[PathSegment]) -> Option<&'a mut Value> {
    segments
        .iter()
        .try_fold(target, |current, segment| match segment {
            PathSegment::Field(name) => current.as_object_mut()?.get_mut(name),
            PathSegment::Index(index) => current.as_array_mut()?.get_mut(*index),
        })
}
