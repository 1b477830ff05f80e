//! Data models for public API snapshots.
//!
//! These types represent the declared surface of one module version as
//! produced by an external parser: exports, their members, parameters and
//! type parameters, each carrying a normalized signature and modifiers.
//! Snapshots are built once and treated as immutable by the differ.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{DeltaError, Result};

/// Kind of a declared construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Interface,
    Class,
    Function,
    TypeAlias,
    Enum,
    Variable,
    Namespace,
    Property,
    Method,
    Parameter,
    TypeParameter,
    EnumMember,
    IndexSignature,
    CallSignature,
    ConstructSignature,
    Constructor,
    GetAccessor,
    SetAccessor,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Interface => "interface",
            NodeKind::Class => "class",
            NodeKind::Function => "function",
            NodeKind::TypeAlias => "type-alias",
            NodeKind::Enum => "enum",
            NodeKind::Variable => "variable",
            NodeKind::Namespace => "namespace",
            NodeKind::Property => "property",
            NodeKind::Method => "method",
            NodeKind::Parameter => "parameter",
            NodeKind::TypeParameter => "type-parameter",
            NodeKind::EnumMember => "enum-member",
            NodeKind::IndexSignature => "index-signature",
            NodeKind::CallSignature => "call-signature",
            NodeKind::ConstructSignature => "construct-signature",
            NodeKind::Constructor => "constructor",
            NodeKind::GetAccessor => "get-accessor",
            NodeKind::SetAccessor => "set-accessor",
        }
    }

    /// Whether the construct has a parameter list that callers depend on.
    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            NodeKind::Function
                | NodeKind::Method
                | NodeKind::Constructor
                | NodeKind::CallSignature
                | NodeKind::ConstructSignature
        )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Modifier {
    Exported,
    DefaultExport,
    Declare,
    Const,
    Abstract,
    Readonly,
    Optional,
    Static,
    Public,
    Protected,
    Private,
    Async,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Exported => "exported",
            Modifier::DefaultExport => "default-export",
            Modifier::Declare => "declare",
            Modifier::Const => "const",
            Modifier::Abstract => "abstract",
            Modifier::Readonly => "readonly",
            Modifier::Optional => "optional",
            Modifier::Static => "static",
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Async => "async",
        }
    }

    pub fn is_visibility(&self) -> bool {
        matches!(self, Modifier::Public | Modifier::Protected | Modifier::Private)
    }
}

/// A line/column/offset location in interface source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: u32,
}

/// Start and end of a declaration in interface source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: Position,
    pub end: Position,
}

impl SourceRange {
    pub fn lines(start_line: u32, end_line: u32) -> Self {
        Self {
            start: Position {
                line: start_line,
                ..Default::default()
            },
            end: Position {
                line: end_line,
                ..Default::default()
            },
        }
    }
}

/// A parameter in a call or construct signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_text: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub rest: bool,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl ParameterInfo {
    pub fn new(name: &str, type_text: &str) -> Self {
        Self {
            name: name.to_string(),
            type_text: type_text.to_string(),
            ..Default::default()
        }
    }
}

/// A generic type parameter with optional constraint and default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParameterInfo {
    pub name: String,
    #[serde(default)]
    pub constraint: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
}

impl TypeParameterInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            constraint: None,
            default: None,
        }
    }

    pub fn with_constraint(mut self, constraint: &str) -> Self {
        self.constraint = Some(constraint.to_string());
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }
}

/// One call or construct signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterInfo>,
}

/// A property facet of an object-like type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_text: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub readonly: bool,
}

/// Normalized type information for a declaration.
///
/// `signature` is always present; the structured facets are filled in by
/// parsers that can provide them and are empty otherwise.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub signature: String,
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterInfo>,
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
    #[serde(default)]
    pub call_signatures: Vec<SignatureInfo>,
    #[serde(default)]
    pub construct_signatures: Vec<SignatureInfo>,
    #[serde(default)]
    pub string_index_type: Option<String>,
    #[serde(default)]
    pub number_index_type: Option<String>,
}

impl TypeInfo {
    pub fn from_signature(signature: &str) -> Self {
        Self {
            signature: signature.to_string(),
            ..Default::default()
        }
    }

    /// Parameters of the first call or construct signature.
    ///
    /// Falls back to the flat `parameters` facet when no signature lists were
    /// recorded.
    pub fn primary_parameters(&self) -> Option<&[ParameterInfo]> {
        if let Some(sig) = self.call_signatures.first() {
            return Some(&sig.parameters);
        }
        if let Some(sig) = self.construct_signatures.first() {
            return Some(&sig.parameters);
        }
        if self.parameters.is_empty() {
            None
        } else {
            Some(&self.parameters)
        }
    }

    /// Type parameters of the first call or construct signature.
    pub fn signature_type_parameters(&self) -> &[TypeParameterInfo] {
        self.call_signatures
            .first()
            .or_else(|| self.construct_signatures.first())
            .map(|sig| sig.type_parameters.as_slice())
            .unwrap_or(&[])
    }
}

/// Documentation-level metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub deprecation_message: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
}

/// One declared construct in an API snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeclarationNode {
    /// Dotted identifier chain, unique within a snapshot.
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub source_range: SourceRange,
    /// Path of the owning node. Lookup key only, see [`ApiSnapshot::parent_of`].
    #[serde(default)]
    pub parent_path: Option<String>,
    #[serde(default)]
    pub type_info: TypeInfo,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub metadata: Option<NodeMetadata>,
    /// Members in declaration order; names are unique among siblings.
    #[serde(default)]
    pub children: Vec<DeclarationNode>,
}

impl DeclarationNode {
    /// Create a top-level node whose path is its name.
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            path: name.to_string(),
            name: name.to_string(),
            kind,
            source_range: SourceRange::default(),
            parent_path: None,
            type_info: TypeInfo::default(),
            modifiers: BTreeSet::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            metadata: None,
            children: Vec::new(),
        }
    }

    /// Attach a member, rewriting its path (and its descendants') under this node.
    pub fn with_child(mut self, mut child: DeclarationNode) -> Self {
        child.reparent(&self.path);
        self.children.push(child);
        self
    }

    pub fn with_signature(mut self, signature: &str) -> Self {
        self.type_info.signature = signature.to_string();
        self
    }

    pub fn with_type_info(mut self, type_info: TypeInfo) -> Self {
        self.type_info = type_info;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterInfo>) -> Self {
        self.type_info.parameters = parameters;
        self
    }

    pub fn with_type_parameter(mut self, type_parameter: TypeParameterInfo) -> Self {
        self.type_info.type_parameters.push(type_parameter);
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_extends(mut self, name: &str) -> Self {
        self.extends.push(name.to_string());
        self
    }

    pub fn with_implements(mut self, name: &str) -> Self {
        self.implements.push(name.to_string());
        self
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.source_range = range;
        self
    }

    pub fn deprecated(mut self, message: Option<&str>) -> Self {
        let metadata = self.metadata.get_or_insert_with(NodeMetadata::default);
        metadata.deprecated = true;
        metadata.deprecation_message = message.map(|m| m.to_string());
        self
    }

    pub fn with_default_value(mut self, value: &str) -> Self {
        let metadata = self.metadata.get_or_insert_with(NodeMetadata::default);
        metadata.default_value = Some(value.to_string());
        self
    }

    fn reparent(&mut self, parent_path: &str) {
        self.path = format!("{}.{}", parent_path, self.name);
        self.parent_path = Some(parent_path.to_string());
        let path = self.path.clone();
        for child in &mut self.children {
            child.reparent(&path);
        }
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Explicit visibility modifier, if any.
    pub fn visibility(&self) -> Option<Modifier> {
        self.modifiers.iter().copied().find(|m| m.is_visibility())
    }

    pub fn is_deprecated(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| m.deprecated)
    }

    pub fn default_value(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.default_value.as_deref())
    }

    /// Rest parameters are printed with a leading spread.
    pub fn is_rest_parameter(&self) -> bool {
        self.kind == NodeKind::Parameter
            && (self.name.starts_with("...") || self.type_info.signature.starts_with("..."))
    }

    pub fn child(&self, name: &str) -> Option<&DeclarationNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Number of nodes in this subtree, including self.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }
}

/// One version's full tree of exported declarations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiSnapshot {
    #[serde(default)]
    pub exports: Vec<DeclarationNode>,
}

impl ApiSnapshot {
    pub fn new(exports: Vec<DeclarationNode>) -> Self {
        Self { exports }
    }

    pub fn with_export(mut self, export: DeclarationNode) -> Self {
        self.exports.push(export);
        self
    }

    /// Decode parser output and check the path invariants.
    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: ApiSnapshot = serde_json::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Verify that paths are unique and that every child path extends its
    /// parent's path by its own name.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for export in &self.exports {
            if export.parent_path.is_some() {
                return Err(DeltaError::InvalidTree {
                    message: format!("top-level export '{}' has a parent path", export.path),
                });
            }
            if export.path != export.name {
                return Err(DeltaError::InconsistentPath {
                    path: export.path.clone(),
                    expected: export.name.clone(),
                });
            }
            validate_subtree(export, &mut seen)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&DeclarationNode> {
        self.exports.iter().find(|e| e.name == name)
    }

    /// Resolve a dotted path by walking the tree one segment at a time.
    ///
    /// Rest-parameter names carry a leading spread, so segments are matched
    /// by path prefix rather than by splitting on dots.
    pub fn find(&self, path: &str) -> Option<&DeclarationNode> {
        let mut nodes = &self.exports;
        loop {
            let next = nodes.iter().find(|n| is_path_prefix(&n.path, path))?;
            if next.path == path {
                return Some(next);
            }
            nodes = &next.children;
        }
    }

    pub fn parent_of(&self, node: &DeclarationNode) -> Option<&DeclarationNode> {
        node.parent_path.as_deref().and_then(|p| self.find(p))
    }

    /// Build a path index over the whole snapshot.
    pub fn index(&self) -> HashMap<&str, &DeclarationNode> {
        let mut index = HashMap::new();
        let mut stack: Vec<&DeclarationNode> = self.exports.iter().rev().collect();
        while let Some(node) = stack.pop() {
            index.insert(node.path.as_str(), node);
            stack.extend(node.children.iter().rev());
        }
        index
    }

    pub fn node_count(&self) -> usize {
        self.exports.iter().map(|e| e.subtree_len()).sum()
    }
}

fn is_path_prefix(prefix: &str, path: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}

fn validate_subtree<'a>(node: &'a DeclarationNode, seen: &mut BTreeSet<&'a str>) -> Result<()> {
    if !seen.insert(node.path.as_str()) {
        return Err(DeltaError::DuplicatePath {
            path: node.path.clone(),
        });
    }
    for child in &node.children {
        let expected = format!("{}.{}", node.path, child.name);
        if child.path != expected {
            return Err(DeltaError::InconsistentPath {
                path: child.path.clone(),
                expected,
            });
        }
        if child.parent_path.as_deref() != Some(node.path.as_str()) {
            return Err(DeltaError::InvalidTree {
                message: format!(
                    "'{}' does not point back to its parent '{}'",
                    child.path, node.path
                ),
            });
        }
        validate_subtree(child, seen)?;
    }
    Ok(())
}
