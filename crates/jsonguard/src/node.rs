//! Compiled schema representation: an arena of nodes addressed by [`NodeId`].
use ahash::AHashMap;

use crate::{
    paths::Location,
    regex::Pattern,
    types::JsonTypeSet,
    value::{JsonValue, Number},
};

/// Index of a node inside [`CompiledSchema`].
///
/// References between nodes are indices, which is how `$ref` cycles are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> NodeId {
        NodeId(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub(crate) struct SchemaNode {
    /// Location of the subschema inside its document.
    pub(crate) location: Location,
    pub(crate) kind: NodeKind,
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    /// `true` and `{}`.
    AlwaysValid,
    /// `false`.
    AlwaysInvalid,
    Constraints(Box<[Constraint]>),
}

/// One keyword (or group of interacting keywords) of a schema object.
#[derive(Debug)]
pub(crate) struct Constraint {
    /// Keyword location reported as the schema path of errors.
    pub(crate) location: Location,
    pub(crate) kind: ConstraintKind,
}

#[derive(Debug)]
pub(crate) enum ConstraintKind {
    Type(JsonTypeSet),
    Enum(Box<[JsonValue]>),
    Const(JsonValue),
    Minimum { limit: Number, exclusive: bool },
    Maximum { limit: Number, exclusive: bool },
    MultipleOf(Number),
    MinLength(u64),
    MaxLength(u64),
    Pattern(Pattern),
    MinItems(u64),
    MaxItems(u64),
    UniqueItems,
    Items(Items),
    Contains(NodeId),
    Required(Box<[String]>),
    Properties(Properties),
    PropertyNames(NodeId),
    MinProperties(u64),
    MaxProperties(u64),
    Dependencies(Box<[(String, Dependency)]>),
    AllOf(Box<[NodeId]>),
    AnyOf(Box<[NodeId]>),
    OneOf(Box<[NodeId]>),
    Not { node: NodeId, schema: JsonValue },
    Conditional {
        condition: NodeId,
        then: Option<NodeId>,
        otherwise: Option<NodeId>,
    },
    Reference(NodeId),
}

#[derive(Debug)]
pub(crate) enum Items {
    /// `items` as a single schema applied to every element.
    Single(NodeId),
    /// `items` as an array, positionally applied.
    Tuple {
        nodes: Box<[NodeId]>,
        additional: AdditionalItems,
    },
}

/// `additionalItems` next to tuple `items`.
#[derive(Debug)]
pub(crate) enum AdditionalItems {
    Allowed,
    Forbidden(Location),
    Schema(NodeId),
}

/// `properties`, `patternProperties` and `additionalProperties` of one schema object.
#[derive(Debug)]
pub(crate) struct Properties {
    pub(crate) properties: AHashMap<String, NodeId>,
    pub(crate) patterns: Box<[(Pattern, NodeId)]>,
    pub(crate) additional: AdditionalProperties,
}

#[derive(Debug)]
pub(crate) enum AdditionalProperties {
    Allowed,
    Forbidden(Location),
    Schema(NodeId),
}

#[derive(Debug)]
pub(crate) enum Dependency {
    Properties { names: Box<[String]>, location: Location },
    Schema(NodeId),
}

/// A compiled schema: an immutable arena of nodes plus the entry point.
#[derive(Debug)]
pub(crate) struct CompiledSchema {
    nodes: Box<[SchemaNode]>,
    root: NodeId,
}

impl CompiledSchema {
    pub(crate) fn new(nodes: Vec<SchemaNode>, root: NodeId) -> CompiledSchema {
        CompiledSchema {
            nodes: nodes.into_boxed_slice(),
            root,
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.index()]
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}
