//! Qualified identities of program entities.
//!
//! Signatures are plain values: two signatures are equal iff every component
//! is equal (parameters compare in order). They are used as map keys by the
//! [`Scene`](crate::model::Scene), so the identifying parts (names, owners)
//! never change after construction. The inferred parts (field type, return
//! and parameter types, static flag) are the only ones the inference passes
//! rewrite, and only from unclear to resolved.

use std::fmt;

use arkinfer_common::names;

use crate::types::Type;

// =============================================================================
// File / Namespace / Class
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileSignature {
    pub project_name: String,
    /// Project-relative path, `/`-separated (`entry/src/main/ets/pages/Index.ets`).
    pub file_name: String,
}

impl FileSignature {
    pub fn new(project_name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            file_name: file_name.into(),
        }
    }

    /// The placeholder file used by signatures whose owner is not bound yet.
    pub fn unknown() -> Self {
        Self::new(names::UNKNOWN_PROJECT_NAME, names::UNKNOWN_FILE_NAME)
    }

    pub fn is_unknown(&self) -> bool {
        self.file_name == names::UNKNOWN_FILE_NAME
    }
}

impl fmt::Display for FileSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}/{}: ", self.project_name, self.file_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NamespaceSignature {
    pub name: String,
    pub file: FileSignature,
    pub parent: Option<Box<NamespaceSignature>>,
}

impl NamespaceSignature {
    pub fn new(name: impl Into<String>, file: FileSignature, parent: Option<NamespaceSignature>) -> Self {
        Self {
            name: name.into(),
            file,
            parent: parent.map(Box::new),
        }
    }

    /// The pseudo-namespace standing for a whole module, produced by
    /// `import * as m from "..."` and `import("...")`.
    pub fn module(file: FileSignature) -> Self {
        Self {
            name: String::new(),
            file,
            parent: None,
        }
    }

    pub fn is_module(&self) -> bool {
        self.name.is_empty()
    }

    /// Dotted path from the outermost namespace (`outer.inner`).
    pub fn qualified_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}.{}", parent.qualified_name(), self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for NamespaceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file, self.qualified_name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassSignature {
    pub name: String,
    pub file: FileSignature,
    pub namespace: Option<NamespaceSignature>,
}

impl ClassSignature {
    pub fn new(name: impl Into<String>, file: FileSignature, namespace: Option<NamespaceSignature>) -> Self {
        Self {
            name: name.into(),
            file,
            namespace,
        }
    }

    /// A class known only by name; its file is the unknown placeholder.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::new(name, FileSignature::unknown(), None)
    }

    pub fn is_default(&self) -> bool {
        self.name == names::DEFAULT_ARK_CLASS_NAME
    }

    pub fn is_anonymous(&self) -> bool {
        names::is_anonymous_class_name(&self.name)
    }

    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns.qualified_name(), self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for ClassSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file, self.qualified_name())
    }
}

/// Owner of a field: a class, or a namespace for exported namespace members.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseSignature {
    Class(ClassSignature),
    Namespace(NamespaceSignature),
}

impl BaseSignature {
    pub fn name(&self) -> &str {
        match self {
            Self::Class(sig) => &sig.name,
            Self::Namespace(sig) => &sig.name,
        }
    }
}

impl fmt::Display for BaseSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(sig) => write!(f, "{sig}"),
            Self::Namespace(sig) => write!(f, "{sig}"),
        }
    }
}

// =============================================================================
// Field
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldSignature {
    pub name: String,
    pub declaring: BaseSignature,
    pub ty: Type,
    pub is_static: bool,
}

impl FieldSignature {
    pub fn new(name: impl Into<String>, declaring: BaseSignature, ty: Type, is_static: bool) -> Self {
        Self {
            name: name.into(),
            declaring,
            ty,
            is_static,
        }
    }

    /// A field reference whose owner has not been resolved.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::new(
            name,
            BaseSignature::Class(ClassSignature::unknown(names::UNKNOWN_CLASS_NAME)),
            Type::Unknown,
            false,
        )
    }
}

impl fmt::Display for FieldSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}.{}>", self.declaring, self.name)
    }
}

// =============================================================================
// Method
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodParameter {
    pub name: String,
    pub ty: Type,
    pub optional: bool,
    pub rest: bool,
}

impl MethodParameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            rest: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }

    /// Synthetic leading parameter carrying a closure's captured variables.
    pub fn is_lexical_env(&self) -> bool {
        self.name.starts_with(names::LEXICAL_ENV_NAME_PREFIX)
    }
}

impl fmt::Display for MethodParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rest {
            f.write_str("...")?;
        }
        f.write_str(&self.name)?;
        if self.optional {
            f.write_str("?")?;
        }
        write!(f, ": {}", self.ty)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSubSignature {
    pub name: String,
    pub parameters: Vec<MethodParameter>,
    pub return_type: Type,
    pub is_static: bool,
}

impl MethodSubSignature {
    pub fn new(name: impl Into<String>, parameters: Vec<MethodParameter>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type,
            is_static: false,
        }
    }

    /// Parameters that belong to the call site (lexical environment
    /// parameters excluded).
    pub fn call_parameters(&self) -> impl Iterator<Item = &MethodParameter> {
        self.parameters.iter().filter(|p| !p.is_lexical_env())
    }

    /// Minimum number of arguments a call must supply.
    pub fn min_arity(&self) -> usize {
        self.call_parameters()
            .filter(|p| !p.optional && !p.rest)
            .count()
    }

    /// Maximum number of arguments, `None` when a rest parameter is present.
    pub fn max_arity(&self) -> Option<usize> {
        if self.call_parameters().any(|p| p.rest) {
            None
        } else {
            Some(self.call_parameters().count())
        }
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.min_arity() && self.max_arity().is_none_or(|max| count <= max)
    }
}

impl fmt::Display for MethodSubSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, "): {}", self.return_type)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub declaring_class: ClassSignature,
    pub sub: MethodSubSignature,
}

impl MethodSignature {
    pub fn new(declaring_class: ClassSignature, sub: MethodSubSignature) -> Self {
        Self { declaring_class, sub }
    }

    /// A call target known only by name.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::new(
            ClassSignature::unknown(names::UNKNOWN_CLASS_NAME),
            MethodSubSignature::new(name, Vec::new(), Type::Unknown),
        )
    }

    pub fn name(&self) -> &str {
        &self.sub.name
    }

    pub fn return_type(&self) -> &Type {
        &self.sub.return_type
    }

    /// Returns `true` while the declaring class is still the placeholder.
    pub fn has_unknown_owner(&self) -> bool {
        self.declaring_class.name == names::UNKNOWN_CLASS_NAME
            && self.declaring_class.file.is_unknown()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_class, self.sub)
    }
}

// =============================================================================
// Local / Alias
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalSignature {
    pub name: String,
    pub declaring_method: MethodSignature,
}

impl fmt::Display for LocalSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.declaring_method, self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AliasTypeSignature {
    pub name: String,
    pub declaring_method: MethodSignature,
}

impl fmt::Display for AliasTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.declaring_method, self.name)
    }
}
