//! FHIR complex datatypes
//!
//! A small subset of the general-purpose datatypes, enough to build and walk
//! typed instance graphs. Each type implements [`FhirNode`].

use super::node::{ChildList, FhirNode, NamedChild};
use super::primitive::Primitive;
use serde::{Deserialize, Serialize};

/// An identifier intended for computation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    /// usual | official | temp | secondary | old
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,

    /// The namespace for the identifier value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// The value that is unique
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FhirNode for Identifier {
    fn type_name(&self) -> &str {
        "Identifier"
    }

    fn children(&self) -> Vec<NamedChild<'_>> {
        ChildList::new()
            .text("use", "code", self.use_.as_deref())
            .text("system", "uri", self.system.as_deref())
            .text("value", "string", self.value.as_deref())
            .build()
    }
}

/// Name of a human
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanName {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,

    /// Family name (often called 'Surname')
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// Given names (not always 'first'). Includes middle names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<Vec<String>>,
}

impl FhirNode for HumanName {
    fn type_name(&self) -> &str {
        "HumanName"
    }

    fn children(&self) -> Vec<NamedChild<'_>> {
        ChildList::new()
            .text("use", "code", self.use_.as_deref())
            .text("family", "string", self.family.as_deref())
            .texts("given", "string", self.given.as_deref())
            .build()
    }
}

/// Human-readable summary of a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    /// generated | extensions | additional | empty
    pub status: String,

    /// Limited xhtml content
    pub div: String,
}

impl FhirNode for Narrative {
    fn type_name(&self) -> &str {
        "Narrative"
    }

    fn children(&self) -> Vec<NamedChild<'_>> {
        ChildList::new()
            .text("status", "code", Some(self.status.as_str()))
            .attribute("div", Some(self.div.as_str()))
            .build()
    }
}

/// Metadata about a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    /// When the resource version last changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// Profiles this resource claims to conform to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<String>>,
}

impl FhirNode for Meta {
    fn type_name(&self) -> &str {
        "Meta"
    }

    fn children(&self) -> Vec<NamedChild<'_>> {
        ChildList::new()
            .text("versionId", "id", self.version_id.as_deref())
            .primitive(
                "lastUpdated",
                self.last_updated.clone().map(Primitive::Instant),
            )
            .texts("profile", "canonical", self.profile.as_deref())
            .build()
    }
}

/// Content in a format defined elsewhere
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Mime type of the content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Data inline, base64ed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Uri where the data can be found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Date attachment was first created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation: Option<String>,
}

impl FhirNode for Attachment {
    fn type_name(&self) -> &str {
        "Attachment"
    }

    fn children(&self) -> Vec<NamedChild<'_>> {
        ChildList::new()
            .text("contentType", "code", self.content_type.as_deref())
            .primitive("data", self.data.clone().map(Primitive::Base64Binary))
            .text("url", "url", self.url.as_deref())
            .primitive("creation", self.creation.clone().map(Primitive::DateTime))
            .build()
    }
}

/// A measured amount
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quantity {
    /// Numerical value, kept as the JSON number to preserve its lexical form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Number>,

    /// < | <= | >= | > - how to understand the value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparator: Option<String>,

    /// Unit representation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// System that defines coded unit form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Coded form of the unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Quantity {
    fn child_list(&self) -> Vec<NamedChild<'_>> {
        let value = self.value.as_ref().and_then(|n| {
            Primitive::from_json("decimal", &serde_json::Value::Number(n.clone())).ok()
        });
        ChildList::new()
            .primitive("value", value)
            .text("comparator", "code", self.comparator.as_deref())
            .text("unit", "string", self.unit.as_deref())
            .text("system", "uri", self.system.as_deref())
            .text("code", "code", self.code.as_deref())
            .build()
    }
}

impl FhirNode for Quantity {
    fn type_name(&self) -> &str {
        "Quantity"
    }

    fn children(&self) -> Vec<NamedChild<'_>> {
        self.child_list()
    }
}

/// Quantity profiles that share the Quantity structure but report their own
/// type name.
macro_rules! profiled_quantity {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub Quantity);

            impl FhirNode for $name {
                fn type_name(&self) -> &str {
                    stringify!($name)
                }

                fn children(&self) -> Vec<NamedChild<'_>> {
                    self.0.child_list()
                }
            }
        )*
    };
}

profiled_quantity!(Age, Distance, Duration, Count);

/// Additional content defined by implementations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Identifies the meaning of the extension
    pub url: String,

    /// Nested extensions (complex extension)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Value of extension
    #[serde(flatten)]
    pub value: Option<ExtensionValue>,
}

/// Choice of types for `Extension.value[x]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtensionValue {
    #[serde(rename = "valueString")]
    String(String),
    #[serde(rename = "valueCode")]
    Code(String),
    #[serde(rename = "valueUri")]
    Uri(String),
    #[serde(rename = "valueBoolean")]
    Boolean(bool),
    #[serde(rename = "valueInteger")]
    Integer(i32),
    #[serde(rename = "valueDate")]
    Date(String),
    #[serde(rename = "valueDateTime")]
    DateTime(String),
    #[serde(rename = "valueBase64Binary")]
    Base64Binary(String),
    #[serde(rename = "valueIdentifier")]
    Identifier(Identifier),
    #[serde(rename = "valueQuantity")]
    Quantity(Quantity),
    #[serde(rename = "valueAge")]
    Age(Age),
    #[serde(rename = "valueDistance")]
    Distance(Distance),
    #[serde(rename = "valueDuration")]
    Duration(Duration),
    #[serde(rename = "valueCount")]
    Count(Count),
}

impl ExtensionValue {
    /// JSON element name of the chosen type (e.g. `valueString`)
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::String(_) => "valueString",
            Self::Code(_) => "valueCode",
            Self::Uri(_) => "valueUri",
            Self::Boolean(_) => "valueBoolean",
            Self::Integer(_) => "valueInteger",
            Self::Date(_) => "valueDate",
            Self::DateTime(_) => "valueDateTime",
            Self::Base64Binary(_) => "valueBase64Binary",
            Self::Identifier(_) => "valueIdentifier",
            Self::Quantity(_) => "valueQuantity",
            Self::Age(_) => "valueAge",
            Self::Distance(_) => "valueDistance",
            Self::Duration(_) => "valueDuration",
            Self::Count(_) => "valueCount",
        }
    }

    fn to_child(&self) -> NamedChild<'_> {
        let name = self.element_name();
        let text = |type_name: &str, s: &String| {
            NamedChild::primitive(
                name,
                Primitive::Other {
                    type_name: type_name.to_string(),
                    lexical: s.clone(),
                },
            )
        };
        match self {
            Self::String(s) => text("string", s),
            Self::Code(s) => text("code", s),
            Self::Uri(s) => text("uri", s),
            Self::Boolean(b) => NamedChild::primitive(name, Primitive::Boolean(*b)),
            Self::Integer(i) => NamedChild::primitive(name, Primitive::Integer(*i)),
            Self::Date(s) => NamedChild::primitive(name, Primitive::Date(s.clone())),
            Self::DateTime(s) => NamedChild::primitive(name, Primitive::DateTime(s.clone())),
            Self::Base64Binary(s) => {
                NamedChild::primitive(name, Primitive::Base64Binary(s.clone()))
            }
            Self::Identifier(v) => NamedChild::node(name, v),
            Self::Quantity(v) => NamedChild::node(name, v),
            Self::Age(v) => NamedChild::node(name, v),
            Self::Distance(v) => NamedChild::node(name, v),
            Self::Duration(v) => NamedChild::node(name, v),
            Self::Count(v) => NamedChild::node(name, v),
        }
    }
}

impl Extension {
    pub fn new(url: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            url: url.into(),
            extension: None,
            value: Some(value),
        }
    }

    /// Complex extension made of nested extensions
    pub fn complex(url: impl Into<String>, extension: Vec<Extension>) -> Self {
        Self {
            url: url.into(),
            extension: Some(extension),
            value: None,
        }
    }
}

impl FhirNode for Extension {
    fn type_name(&self) -> &str {
        "Extension"
    }

    fn children(&self) -> Vec<NamedChild<'_>> {
        let mut children = ChildList::new()
            .nodes("extension", self.extension.as_deref())
            .attribute("url", Some(self.url.as_str()));
        if let Some(value) = &self.value {
            children = children.push(value.to_child());
        }
        children.build()
    }
}
