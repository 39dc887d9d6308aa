//! Typed resource graph
//!
//! [`FhirNode`] exposes a typed model as a list of named children so that it
//! can be walked generically, without knowing the concrete struct.

use super::primitive::Primitive;
use std::fmt;

/// A node in a typed FHIR instance graph
pub trait FhirNode: fmt::Debug + Send + Sync {
    /// Runtime FHIR type of the node (e.g. `Patient`, `HumanName`, `Age`).
    ///
    /// Backbone components report `BackboneElement` or `Element`.
    fn type_name(&self) -> &str;

    /// Children in FHIR element order. Absent and empty fields are skipped;
    /// repeated fields produce one entry per item.
    fn children(&self) -> Vec<NamedChild<'_>>;
}

/// Payload of a child element
#[derive(Debug, Clone)]
pub enum ChildValue<'a> {
    /// Complex child with its own children
    Node(&'a dyn FhirNode),
    /// Primitive leaf
    Primitive(Primitive),
    /// Attribute-like leaf carried as a plain string (`Extension.url`,
    /// `Element.id`, `Narrative.div`)
    Attribute(&'a str),
}

/// One child of a [`FhirNode`]
#[derive(Debug, Clone)]
pub struct NamedChild<'a> {
    /// Element name as it appears in JSON
    pub name: &'a str,
    pub value: ChildValue<'a>,
    /// Whether the element is declared with max cardinality > 1
    pub is_collection: bool,
}

impl<'a> NamedChild<'a> {
    pub fn node(name: &'a str, node: &'a dyn FhirNode) -> Self {
        Self {
            name,
            value: ChildValue::Node(node),
            is_collection: false,
        }
    }

    pub fn primitive(name: &'a str, value: Primitive) -> Self {
        Self {
            name,
            value: ChildValue::Primitive(value),
            is_collection: false,
        }
    }

    pub fn attribute(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            value: ChildValue::Attribute(value),
            is_collection: false,
        }
    }

    /// Mark the child as an item of a repeating element
    pub fn repeated(mut self) -> Self {
        self.is_collection = true;
        self
    }

    pub fn as_node(&self) -> Option<&'a dyn FhirNode> {
        match self.value {
            ChildValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match &self.value {
            ChildValue::Primitive(p) => Some(p),
            _ => None,
        }
    }
}

/// Accumulates children of a node, skipping absent values
#[derive(Debug, Default)]
pub struct ChildList<'a> {
    children: Vec<NamedChild<'a>>,
}

impl<'a> ChildList<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: &'a str, value: Option<&'a str>) -> Self {
        if let Some(value) = value {
            self.children.push(NamedChild::attribute(name, value));
        }
        self
    }

    /// String-like primitive (string, code, uri, canonical ...)
    pub fn text(mut self, name: &'a str, type_name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.children.push(NamedChild::primitive(
                name,
                Primitive::Other {
                    type_name: type_name.to_string(),
                    lexical: value.to_string(),
                },
            ));
        }
        self
    }

    pub fn texts(mut self, name: &'a str, type_name: &str, values: Option<&[String]>) -> Self {
        for value in values.unwrap_or_default() {
            self.children.push(
                NamedChild::primitive(
                    name,
                    Primitive::Other {
                        type_name: type_name.to_string(),
                        lexical: value.clone(),
                    },
                )
                .repeated(),
            );
        }
        self
    }

    pub fn primitive(mut self, name: &'a str, value: Option<Primitive>) -> Self {
        if let Some(value) = value {
            self.children.push(NamedChild::primitive(name, value));
        }
        self
    }

    pub fn node<T: FhirNode>(mut self, name: &'a str, value: Option<&'a T>) -> Self {
        if let Some(value) = value {
            self.children.push(NamedChild::node(name, value));
        }
        self
    }

    pub fn nodes<T: FhirNode>(mut self, name: &'a str, values: Option<&'a [T]>) -> Self {
        for value in values.unwrap_or_default() {
            self.children.push(NamedChild::node(name, value).repeated());
        }
        self
    }

    pub fn push(mut self, child: NamedChild<'a>) -> Self {
        self.children.push(child);
        self
    }

    pub fn build(self) -> Vec<NamedChild<'a>> {
        self.children
    }
}
