//! The in-memory schema model.
//!
//! A [`Package`] is what a schema parser produces and what the backend
//! consumes: an ordered list of struct definitions, each an ordered list
//! of tagged fields. [`Package::validate`] enforces the model invariants
//! before any code is rendered.

use std::collections::HashSet;
use thiserror::Error;

/// Violations of the schema invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Package, struct and field names must be non-empty ASCII
    /// identifiers.
    #[error("schema: name {0:?} is not an identifier")]
    Name(String),

    /// Struct names share one namespace per package.
    #[error("schema: duplicate struct {0}")]
    DuplicateStruct(String),

    /// Field names share one namespace per struct.
    #[error("schema: duplicate field {0}.{1}")]
    DuplicateField(String, String),

    /// Tag indices stop at 126; 127 is the record terminator.
    #[error("schema: field {0}.{1} tag index {2} exceeds 126")]
    IndexRange(String, String, u8),

    /// Tag indices ascend in declaration order, which is what makes the
    /// decoder's forward-only field walk complete.
    #[error("schema: field {0}.{1} tag index {2} does not ascend")]
    IndexOrder(String, String, u8),

    /// Lists hold floating points, text, binaries or struct references.
    #[error("schema: field {0}.{1} kind does not support lists")]
    ListKind(String, String),

    /// Reference targets resolve within the package.
    #[error("schema: field {0}.{1} references unknown struct {2}")]
    UnknownRef(String, String, String),

    /// Reference cycles may pass only through optional references; a
    /// list edge would make the value graph unbounded.
    #[error("schema: list field {0}.{1} closes a reference cycle")]
    ListCycle(String, String),
}

/// A field's declared type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int32,
    Int64,
    Float32,
    Float64,
    Timestamp,
    Text,
    Binary,
    /// A reference to another struct in the package, by schema name.
    Ref(String),
}

impl Kind {
    /// Whether a list may hold elements of this kind.
    fn listable(&self) -> bool {
        matches!(
            self,
            Kind::Float32 | Kind::Float64 | Kind::Text | Kind::Binary | Kind::Ref(_)
        )
    }
}

/// One tagged field.
#[derive(Clone, Debug)]
pub struct Field {
    /// Schema name; rendered snake_case.
    pub name: String,
    /// Documentation lines carried into the generated type.
    pub docs: Vec<String>,
    /// Tag index on the wire, in `[0, 126]`.
    pub index: u8,
    pub kind: Kind,
    /// Whether the field holds a sequence of `kind` elements.
    pub list: bool,
}

impl Field {
    pub fn new(index: u8, name: &str, kind: Kind) -> Self {
        Self {
            name: name.to_owned(),
            docs: Vec::new(),
            index,
            kind,
            list: false,
        }
    }

    pub fn list(index: u8, name: &str, kind: Kind) -> Self {
        Self {
            list: true,
            ..Self::new(index, name, kind)
        }
    }

    pub fn doc(mut self, line: &str) -> Self {
        self.docs.push(line.to_owned());
        self
    }
}

/// One record definition.
#[derive(Clone, Debug)]
pub struct Struct {
    /// Schema name; rendered UpperCamelCase.
    pub name: String,
    pub docs: Vec<String>,
    pub fields: Vec<Field>,
}

impl Struct {
    pub fn new(name: &str, fields: Vec<Field>) -> Self {
        Self {
            name: name.to_owned(),
            docs: Vec::new(),
            fields,
        }
    }

    pub fn doc(mut self, line: &str) -> Self {
        self.docs.push(line.to_owned());
        self
    }
}

/// An ordered set of struct definitions sharing a namespace.
#[derive(Clone, Debug)]
pub struct Package {
    pub name: String,
    pub structs: Vec<Struct>,
}

impl Package {
    pub fn new(name: &str, structs: Vec<Struct>) -> Self {
        Self {
            name: name.to_owned(),
            structs,
        }
    }

    /// Checks the model invariants. The backend runs this before
    /// rendering anything.
    pub fn validate(&self) -> Result<(), SchemaError> {
        ident(&self.name)?;
        let mut structs = HashSet::new();
        for s in &self.structs {
            ident(&s.name)?;
            if !structs.insert(s.name.as_str()) {
                return Err(SchemaError::DuplicateStruct(s.name.clone()));
            }
            let mut fields = HashSet::new();
            let mut previous = None;
            for f in &s.fields {
                ident(&f.name)?;
                if !fields.insert(f.name.as_str()) {
                    return Err(SchemaError::DuplicateField(s.name.clone(), f.name.clone()));
                }
                if f.index > 126 {
                    return Err(SchemaError::IndexRange(
                        s.name.clone(),
                        f.name.clone(),
                        f.index,
                    ));
                }
                if previous.is_some_and(|p| f.index <= p) {
                    return Err(SchemaError::IndexOrder(
                        s.name.clone(),
                        f.name.clone(),
                        f.index,
                    ));
                }
                previous = Some(f.index);
                if f.list && !f.kind.listable() {
                    return Err(SchemaError::ListKind(s.name.clone(), f.name.clone()));
                }
                if let Kind::Ref(target) = &f.kind {
                    if !self.structs.iter().any(|c| &c.name == target) {
                        return Err(SchemaError::UnknownRef(
                            s.name.clone(),
                            f.name.clone(),
                            target.clone(),
                        ));
                    }
                }
            }
        }
        self.check_list_cycles()
    }

    fn check_list_cycles(&self) -> Result<(), SchemaError> {
        for s in &self.structs {
            for f in &s.fields {
                let Kind::Ref(target) = &f.kind else {
                    continue;
                };
                if f.list && (target == &s.name || self.reaches(target, &s.name)) {
                    return Err(SchemaError::ListCycle(s.name.clone(), f.name.clone()));
                }
            }
        }
        Ok(())
    }

    /// Whether `from` reaches `to` over reference fields of any shape.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            let Some(s) = self.structs.iter().find(|s| s.name == name) else {
                continue;
            };
            for f in &s.fields {
                if let Kind::Ref(target) = &f.kind {
                    if target == to {
                        return true;
                    }
                    stack.push(target);
                }
            }
        }
        false
    }
}

fn ident(name: &str) -> Result<(), SchemaError> {
    let mut chars = name.chars();
    let head = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(SchemaError::Name(name.to_owned()))
    }
}
