//! Groups the properties of an alarm by the segments of their keys.
//!
//! The key `Behavior.HistoryReport.Update` creates the nodes `Behavior`,
//! `HistoryReport` and `Update`. Intermediate nodes hold the schema entry
//! of the key prefix they stand for.
use alarmgen_dsl::property::{NodeData, NodeId, Property, PropertyTree, ValidityRule};
use log::trace;

use crate::schema::lookup;

pub fn create_tree_from_properties(properties: &[Property]) -> PropertyTree {
    let mut tree = PropertyTree::new();

    for property in properties {
        let segments: Vec<&str> = property.key.split('.').collect();
        let Some((leaf, groups)) = segments.split_last() else {
            continue;
        };

        let mut parent = PropertyTree::ROOT;
        let mut prefix = String::new();
        for segment in groups {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);

            parent = match tree.child(parent, segment) {
                Some(existing) => existing,
                None => {
                    let data = match lookup(&prefix) {
                        Some(entry) => NodeData::Schema(*entry),
                        None => NodeData::Unknown,
                    };
                    tree.add_child(parent, segment, data)
                }
            };
        }

        match tree.child(parent, leaf) {
            Some(existing) => tree.set_data(existing, NodeData::Property(property.clone())),
            None => {
                tree.add_child(parent, leaf, NodeData::Property(property.clone()));
            }
        }
    }

    tree
}

/// Removes every node that does not hold a valid property or a group.
/// Removing a node removes everything below it.
pub fn remove_invalid_properties(tree: &mut PropertyTree) {
    prune(tree, PropertyTree::ROOT);
}

fn prune(tree: &mut PropertyTree, node: NodeId) {
    let children = tree.children(node).to_vec();
    for child in children {
        let keep = match &tree.node(child).data {
            NodeData::Property(property) => property.valid,
            NodeData::Schema(entry) => entry.rule == ValidityRule::Unconstrained,
            NodeData::Root | NodeData::Unknown => false,
        };
        if keep {
            prune(tree, child);
        } else {
            trace!("Removing property node {}", tree.node(child).segment);
            tree.remove_child(node, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use alarmgen_dsl::model::{Alarm, AlarmPath, Severity};
    use alarmgen_dsl::property::{NodeData, Property, PropertyTree, XmlTag};

    use super::{create_tree_from_properties, remove_invalid_properties};
    use crate::xform_properties::parse_properties;

    fn tree(annotation: &str) -> PropertyTree {
        let alarm = Alarm {
            variable_name: String::from("Overload"),
            bounds: None,
            path: AlarmPath::default(),
            severity: Severity::Error,
            annotation: annotation.to_string(),
            properties: vec![],
        };
        create_tree_from_properties(&parse_properties(&alarm))
    }

    #[test]
    fn create_tree_when_dotted_keys_then_shared_groups() {
        let tree =
            tree("Behavior.HistoryReport.Update=TRUE Behavior.HistoryReport.InactiveToActive=TRUE");

        let behavior = tree.child(PropertyTree::ROOT, "Behavior").unwrap();
        let history = tree.child(behavior, "HistoryReport").unwrap();
        assert_eq!(2, tree.children(history).len());
        let history_data = &tree.node(history).data;
        assert!(matches!(history_data, NodeData::Schema(entry) if entry.id == "Recording"));
        // Behavior is a property (the default) rather than a group
        assert!(matches!(tree.node(behavior).data, NodeData::Property(_)));
    }

    #[test]
    fn create_tree_when_leaf_after_group_then_leaf_replaces_data() {
        let retain = Property {
            key: String::from("Behavior.Retain"),
            value: String::from("TRUE"),
            valid: true,
            tag: Some(XmlTag::Property),
            id: Some("Retain"),
        };
        let behavior = Property {
            key: String::from("Behavior"),
            value: String::from("PersistentAlarm"),
            valid: true,
            tag: Some(XmlTag::Selector),
            id: Some("Behavior"),
        };

        let tree = create_tree_from_properties(&[retain, behavior]);

        let node = tree.child(PropertyTree::ROOT, "Behavior").unwrap();
        match &tree.node(node).data {
            NodeData::Property(property) => assert_eq!("PersistentAlarm", property.value),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(1, tree.children(node).len());
    }

    #[test]
    fn remove_invalid_properties_when_invalid_value_then_only_that_node_removed() {
        let mut tree = tree("Code=1 Behavior.Retain=maybe Behavior.AutoReset=TRUE");

        remove_invalid_properties(&mut tree);

        let behavior = tree.child(PropertyTree::ROOT, "Behavior").unwrap();
        assert!(tree.child(behavior, "Retain").is_none());
        assert!(tree.child(behavior, "AutoReset").is_some());
        assert!(tree.child(PropertyTree::ROOT, "Code").is_some());
    }

    #[test]
    fn remove_invalid_properties_when_unknown_group_then_subtree_removed() {
        let mut tree = tree("Colour.Red=TRUE Code=1");

        remove_invalid_properties(&mut tree);

        assert!(tree.child(PropertyTree::ROOT, "Colour").is_none());
        assert_eq!(2, tree.len());
    }

    #[test]
    fn remove_invalid_properties_when_invalid_behavior_then_children_removed() {
        let mut tree = tree("Behavior=Sometimes Behavior.Retain=TRUE");

        remove_invalid_properties(&mut tree);

        assert!(tree.is_empty());
    }
}
