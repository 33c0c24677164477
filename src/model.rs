//! Output data model: the value objects handed to downstream rendering
//! pipelines. Field names and shapes are a compatibility contract, so every
//! serde rename here is load-bearing.

use serde::Serialize;

/// Class-level description split into a one-line summary and a long text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDescription {
    /// Single line, whitespace runs collapsed to one space.
    pub short: String,
    /// Full description, may be empty or multi-line.
    pub long: String,
}

/// How a method is invoked on its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Binding {
    #[serde(rename = "::")]
    Static,
    #[serde(rename = "->")]
    Instance,
}

impl Binding {
    pub fn from_static(is_static: bool) -> Self {
        if is_static {
            Binding::Static
        } else {
            Binding::Instance
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Binding::Static => "::",
            Binding::Instance => "->",
        }
    }
}

/// One `@param` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDoc {
    /// Variable name including the leading `$` sigil.
    pub name: String,
    pub desc: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// One `@return` or `@throws` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDoc {
    pub desc: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Documentation for one method.
///
/// Exactly one of the two shapes is produced per method: `Documented` when
/// the method's own docblock has a usable summary, `Fallback` when it does
/// not and the description comes from an external reference index. The
/// untagged serialization keeps only the populated shape's fields visible
/// to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MethodDoc {
    Documented(DocumentedMethod),
    Fallback(FallbackMethod),
}

impl MethodDoc {
    /// Summary text, regardless of shape.
    pub fn short_description(&self) -> &str {
        match self {
            MethodDoc::Documented(m) => &m.short_description,
            MethodDoc::Fallback(m) => &m.short_description,
        }
    }

    /// Invocation binding, regardless of shape.
    pub fn binding(&self) -> Binding {
        match self {
            MethodDoc::Documented(m) => m.binding,
            MethodDoc::Fallback(m) => m.binding,
        }
    }
}

/// Method shape backed by a parsed docblock.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentedMethod {
    pub short_description: String,
    pub long_description: String,
    /// One `"<type> $<variable>"` string per `@param`, in tag order.
    pub arguments_list: Vec<String>,
    pub arguments_description: Vec<ParamDoc>,
    pub return_value: Vec<TagDoc>,
    pub throws_exceptions: Vec<TagDoc>,
    /// Space-joined modifiers in fixed order: `final? public static?`.
    pub visibility: String,
    #[serde(rename = "type")]
    pub binding: Binding,
}

/// Method shape sourced from the external reference index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackMethod {
    pub short_description: String,
    pub doclink: String,
    #[serde(rename = "type")]
    pub binding: Binding,
}

/// Documentation for one class constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantDoc {
    pub short: String,
    pub long: String,
    /// JSON literal for scalar values, otherwise the value's type name.
    pub value: String,
}
