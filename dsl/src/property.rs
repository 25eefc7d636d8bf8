//! Alarm properties and the tree that groups them by dotted key.
//!
//! A property key such as `Behavior.HistoryReport.Update` addresses a
//! nested element in the alarm configuration. The [`PropertyTree`] holds one
//! node per key segment so that the configuration writer can emit the
//! nesting directly.
use std::collections::HashMap;

use serde::Serialize;

/// The configuration element name used for a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum XmlTag {
    Property,
    Selector,
    Group,
}

impl XmlTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            XmlTag::Property => "Property",
            XmlTag::Selector => "Selector",
            XmlTag::Group => "Group",
        }
    }
}

/// The values a property accepts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValidityRule {
    /// Integer in the inclusive range.
    IntegerRange { low: i64, high: i64 },
    /// Floating point value in the inclusive range.
    RealRange { low: f64, high: f64 },
    /// Exactly one of the listed values.
    OneOf(&'static [&'static str]),
    /// `TRUE` or `FALSE` in any letter case.
    Boolean,
    /// Any value. Structural groups use this rule.
    Unconstrained,
}

/// An entry in the property schema.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchemaEntry {
    pub tag: XmlTag,
    pub id: &'static str,
    pub rule: ValidityRule,
}

/// A key/value pair from an alarm annotation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Property {
    pub key: String,
    pub value: String,
    pub valid: bool,
    /// None when the key is not in the schema.
    pub tag: Option<XmlTag>,
    pub id: Option<&'static str>,
}

pub type NodeId = usize;

/// What a node in the property tree holds.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    Root,
    /// An intermediate node for a key prefix that is in the schema.
    Schema(SchemaEntry),
    /// An intermediate node for a key prefix that is not in the schema.
    Unknown,
    /// A node for a property given in the annotation.
    Property(Property),
}

#[derive(Clone, Debug)]
pub struct PropertyNode {
    /// The key segment for the node.
    pub segment: String,
    pub data: NodeData,
    children: Vec<NodeId>,
}

/// An arena of nodes with a lookup from (parent, segment) to the child.
#[derive(Clone, Debug)]
pub struct PropertyTree {
    nodes: Vec<PropertyNode>,
    lookup: HashMap<(NodeId, String), NodeId>,
}

impl Default for PropertyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyTree {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![PropertyNode {
                segment: String::new(),
                data: NodeData::Root,
                children: vec![],
            }],
            lookup: HashMap::new(),
        }
    }

    pub fn node(&self, id: NodeId) -> &PropertyNode {
        &self.nodes[id]
    }

    /// Returns the children of the node in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn child(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        self.lookup.get(&(parent, segment.to_string())).copied()
    }

    /// Adds a child to the parent. If the parent already has a child with
    /// the segment, the existing child is returned and is not modified.
    pub fn add_child(&mut self, parent: NodeId, segment: &str, data: NodeData) -> NodeId {
        if let Some(existing) = self.child(parent, segment) {
            return existing;
        }
        let id = self.nodes.len();
        self.nodes.push(PropertyNode {
            segment: segment.to_string(),
            data,
            children: vec![],
        });
        self.nodes[parent].children.push(id);
        self.lookup.insert((parent, segment.to_string()), id);
        id
    }

    pub fn set_data(&mut self, id: NodeId, data: NodeData) {
        self.nodes[id].data = data;
    }

    /// Detaches the child (and so its subtree) from the parent.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].children.retain(|id| *id != child);
        let segment = self.nodes[child].segment.clone();
        self.lookup.remove(&(parent, segment));
    }

    /// Number of nodes reachable from the root, not counting the root.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![Self::ROOT];
        while let Some(id) = pending.pop() {
            count += self.nodes[id].children.len();
            pending.extend(self.nodes[id].children.iter().copied());
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[Self::ROOT].children.is_empty()
    }
}
