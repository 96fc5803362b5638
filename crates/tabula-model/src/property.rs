//! # Model properties
//!
//! Properties are the fields of a mapped model: column properties backed by
//! one or more storage columns, and relationship properties linking to
//! another model. The kind of every property is fixed when the snapshot is
//! extracted, so traversal code matches on a closed enum instead of probing
//! attributes at each visit.

use serde::{Deserialize, Serialize};

use crate::types::NativeType;

/// Traversal direction of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Direction {
    /// True for directions whose value side is a collection.
    pub fn many_valued(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneToMany => "one_to_many",
            Self::ManyToOne => "many_to_one",
            Self::ManyToMany => "many_to_many",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One storage column as captured in the snapshot.
///
/// `nullable` defaults to true and `has_default` to false, matching the
/// usual mapper defaults, so descriptors only spell out the exceptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,

    /// Native storage type of the column.
    #[serde(rename = "type")]
    pub native: NativeType,

    #[serde(default = "default_true")]
    pub nullable: bool,

    /// Whether the column carries a server- or client-side default value.
    #[serde(default)]
    pub has_default: bool,

    /// Whether the column participates in a foreign-key constraint.
    #[serde(default)]
    pub foreign_key: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Column {
    /// New nullable column without defaults, foreign keys, or documentation.
    pub fn new(name: impl Into<String>, native: NativeType) -> Self {
        Self {
            name: name.into(),
            native,
            nullable: true,
            has_default: false,
            foreign_key: false,
            doc: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn with_foreign_key(mut self) -> Self {
        self.foreign_key = true;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A model field backed directly by storage columns.
///
/// Almost always exactly one column whose name equals the property key, but
/// aliased attributes and composite properties may group several columns
/// under one key. Descriptors may therefore write either a bare column or
/// the grouped `{ key, columns }` form; both deserialize to the same thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColumnPropertySpec")]
pub struct ColumnProperty {
    pub key: String,
    pub columns: Vec<Column>,
}

/// Accepted descriptor shapes for a column property.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnPropertySpec {
    Grouped { key: String, columns: Vec<Column> },
    Single(Column),
}

impl From<ColumnPropertySpec> for ColumnProperty {
    fn from(spec: ColumnPropertySpec) -> Self {
        match spec {
            ColumnPropertySpec::Grouped { key, columns } => Self { key, columns },
            ColumnPropertySpec::Single(column) => Self {
                key: column.name.clone(),
                columns: vec![column],
            },
        }
    }
}

impl ColumnProperty {
    /// Property keyed by the column's own name.
    pub fn from_column(column: Column) -> Self {
        Self {
            key: column.name.clone(),
            columns: vec![column],
        }
    }

    /// Property grouping several columns under an explicit key.
    pub fn grouped(key: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            key: key.into(),
            columns,
        }
    }

    /// True when any underlying column participates in a foreign key.
    pub fn has_foreign_key(&self) -> bool {
        self.columns.iter().any(|c| c.foreign_key)
    }
}

/// A model field linking to another model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipProperty {
    pub key: String,

    /// Class name of the related model, resolved through the registry.
    pub target: String,

    pub direction: Direction,

    /// Attribute on the target model that points back at this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_reference: Option<String>,

    /// Names of this model's columns that realize the link.
    #[serde(default)]
    pub local_columns: Vec<String>,

    /// Names of the target model's columns on the remote side of the link.
    #[serde(default)]
    pub remote_side: Vec<String>,
}

impl RelationshipProperty {
    pub fn new(key: impl Into<String>, target: impl Into<String>, direction: Direction) -> Self {
        Self {
            key: key.into(),
            target: target.into(),
            direction,
            back_reference: None,
            local_columns: Vec::new(),
            remote_side: Vec::new(),
        }
    }

    pub fn with_back_reference(mut self, name: impl Into<String>) -> Self {
        self.back_reference = Some(name.into());
        self
    }

    pub fn with_local_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.local_columns = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_remote_side<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remote_side = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Borrowed view over either property kind, as yielded by walkers.
#[derive(Debug, Clone, Copy)]
pub enum PropertyRef<'a> {
    Column(&'a ColumnProperty),
    Relationship(&'a RelationshipProperty),
}

impl<'a> PropertyRef<'a> {
    pub fn key(&self) -> &'a str {
        match self {
            Self::Column(prop) => &prop.key,
            Self::Relationship(prop) => &prop.key,
        }
    }
}
