//! Class documentation assembly.
//!
//! Combines the registry view, the docblock parser, and the reference index
//! into the merged model: class description, own vs inherited methods, own
//! vs inherited constants. Own members keep declaration order; inherited
//! members are listed lexicographically so their ordering is stable no
//! matter how the parent chain was recorded.

use indexmap::IndexMap;
use serde_json::Value;

use crate::atlas::DocIndex;
use crate::docblock::{to_single_line, DocBlock, Tag};
use crate::model::{
    Binding, ClassDescription, ConstantDoc, DocumentedMethod, FallbackMethod, MethodDoc, ParamDoc,
    TagDoc,
};
use crate::registry::{ClassHandle, ConstantHandle, MethodHandle};

/// Assembles the documentation model for one class.
///
/// Each query recomputes its result from the immutable class handle, so an
/// assembler can be shared freely and queries may run in any order.
pub struct ClassDocAssembler<'a> {
    class: ClassHandle<'a>,
    index: &'a dyn DocIndex,
}

impl<'a> ClassDocAssembler<'a> {
    pub fn new(class: ClassHandle<'a>, index: &'a dyn DocIndex) -> Self {
        Self { class, index }
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub fn class_description(&self) -> ClassDescription {
        let block = DocBlock::parse(self.class.raw_doc());
        ClassDescription {
            short: to_single_line(&block.summary),
            long: block.description,
        }
    }

    pub fn parent_class_name(&self) -> Option<String> {
        self.class.parent_class_name().map(str::to_string)
    }

    pub fn interfaces(&self) -> Vec<String> {
        self.class.interface_names()
    }

    /// Methods declared by the class itself, in declaration order. A name
    /// visible only through inheritance is left to [`inherited_methods`];
    /// a local declaration is always kept, including overrides.
    ///
    /// [`inherited_methods`]: Self::inherited_methods
    pub fn methods_details(&self) -> IndexMap<String, MethodDoc> {
        let inherited = self.inherited_methods();
        let mut methods = IndexMap::new();
        for method in self.class.public_methods() {
            if inherited.contains_key(method.name())
                && method.declaring_class() != self.class.name()
            {
                continue;
            }
            methods.insert(method.name().to_string(), self.method_doc(&method));
        }
        methods
    }

    /// The parent's public methods (including what the parent itself
    /// inherited), keyed by name in lexicographic order. Empty when the
    /// class has no registered parent.
    pub fn inherited_methods(&self) -> IndexMap<String, MethodDoc> {
        let mut methods = IndexMap::new();
        if let Some(parent) = self.class.parent() {
            let mut handles = parent.public_methods();
            handles.sort_by(|a, b| a.name().cmp(b.name()));
            for method in handles {
                methods.insert(method.name().to_string(), self.method_doc(&method));
            }
        }
        methods
    }

    /// Constants declared by the class itself, in declaration order.
    pub fn constants_details(&self) -> IndexMap<String, ConstantDoc> {
        let inherited = self.inherited_constants();
        let mut constants = IndexMap::new();
        for constant in self.class.public_constants() {
            if inherited.contains_key(constant.name())
                && constant.declaring_class() != self.class.name()
            {
                continue;
            }
            constants.insert(constant.name().to_string(), constant_doc(&constant));
        }
        constants
    }

    /// The parent's constants, lexicographic. Empty without a registered
    /// parent.
    pub fn inherited_constants(&self) -> IndexMap<String, ConstantDoc> {
        let mut constants = IndexMap::new();
        if let Some(parent) = self.class.parent() {
            let mut handles = parent.public_constants();
            handles.sort_by(|a, b| a.name().cmp(b.name()));
            for constant in handles {
                constants.insert(constant.name().to_string(), constant_doc(&constant));
            }
        }
        constants
    }

    /// Build the MethodDoc for one method. A usable summary selects the
    /// documented shape; otherwise the reference index is consulted with
    /// the method's declaring-class identity. Both paths always succeed.
    fn method_doc(&self, method: &MethodHandle) -> MethodDoc {
        let block = DocBlock::parse(method.raw_doc());
        let binding = Binding::from_static(method.is_static());

        if block.has_summary() {
            let params = block.tags_by_name("param");
            MethodDoc::Documented(DocumentedMethod {
                short_description: to_single_line(&block.summary),
                long_description: block.description.clone(),
                arguments_list: params.iter().map(|p| argument_signature(p)).collect(),
                arguments_description: params
                    .iter()
                    .map(|p| ParamDoc {
                        name: format!("${}", p.variable.as_deref().unwrap_or_default()),
                        desc: to_single_line(&p.description),
                        type_name: p.type_name.clone(),
                    })
                    .collect(),
                return_value: tag_docs(&block.tags_by_name("return")),
                throws_exceptions: tag_docs(&block.tags_by_name("throws")),
                visibility: visibility_string(method),
                binding,
            })
        } else {
            let entry = self.index.lookup(&method.qualified_name()).unwrap_or_default();
            MethodDoc::Fallback(FallbackMethod {
                short_description: to_single_line(&entry.short),
                doclink: entry.link,
                binding,
            })
        }
    }
}

/// `"<type> $<variable>"`, matching the signature format consumers expect
/// even when the type is absent.
fn argument_signature(tag: &Tag) -> String {
    format!(
        "{} ${}",
        tag.type_name,
        tag.variable.as_deref().unwrap_or_default()
    )
}

fn tag_docs(tags: &[&Tag]) -> Vec<TagDoc> {
    tags.iter()
        .map(|t| TagDoc {
            desc: to_single_line(&t.description),
            type_name: t.type_name.clone(),
        })
        .collect()
}

/// Space-joined modifiers in fixed order: `final? public static?`.
fn visibility_string(method: &MethodHandle) -> String {
    let mut parts = Vec::with_capacity(3);
    if method.is_final() {
        parts.push("final");
    }
    parts.push("public");
    if method.is_static() {
        parts.push("static");
    }
    parts.join(" ")
}

/// Constants never take the fallback path: an undocumented constant keeps
/// empty description fields.
fn constant_doc(constant: &ConstantHandle) -> ConstantDoc {
    let block = DocBlock::parse(constant.raw_doc());
    ConstantDoc {
        short: to_single_line(&block.summary),
        long: block.description,
        value: constant_value_string(constant.value()),
    }
}

/// JSON literal for scalar values (string, number, boolean, null); the
/// runtime type name for anything else.
fn constant_value_string(value: &Value) -> String {
    match value {
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
        scalar => serde_json::to_string(scalar).unwrap_or_default(),
    }
}
