use crate::types::{EntryKind, Record};
use std::collections::HashMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("missing parent: {0}")]
    MissingParent(String),
    #[error("duplicate directory key: {0}")]
    DuplicateDir(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Dir {
        name: String,
        timestamp: i64,
        children: Vec<Node>,
    },
    File {
        name: String,
        timestamp: i64,
        size: u64,
    },
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Dir { name, .. } | Node::File { name, .. } => name,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            Node::Dir { timestamp, .. } | Node::File { timestamp, .. } => *timestamp,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Dir { children, .. } => children,
            Node::File { .. } => &[],
        }
    }

    /// first name match wins at each level
    pub fn find_dir<S: AsRef<str>>(&self, path: &[S]) -> Option<&Node> {
        let mut current = self;
        for seg in path {
            current = current
                .children()
                .iter()
                .find(|n| matches!(n, Node::Dir { .. }) && n.name() == seg.as_ref())?;
        }
        Some(current)
    }

    /// (files, dirs, bytes) below this node, the node itself excluded.
    pub fn totals(&self) -> (u64, u64, u64) {
        let mut acc = (0, 0, 0);
        for child in self.children() {
            match child {
                Node::File { size, .. } => {
                    acc.0 += 1;
                    acc.2 += size;
                }
                Node::Dir { .. } => {
                    let (f, d, b) = child.totals();
                    acc.0 += f;
                    acc.1 += d + 1;
                    acc.2 += b;
                }
            }
        }
        acc
    }
}

struct Slot {
    node: Node,
    children: Vec<usize>,
}

/// Children keep record order. A parent must be listed before its children.
pub fn build_hierarchy(records: &[Record], root_marker: &str) -> Result<Node, HierarchyError> {
    let mut slots: Vec<Slot> = Vec::with_capacity(records.len() + 1);
    slots.push(Slot {
        node: Node::Dir {
            name: root_marker.to_string(),
            timestamp: 0,
            children: Vec::new(),
        },
        children: Vec::new(),
    });

    let mut by_key: HashMap<String, usize> = HashMap::new();
    by_key.insert(root_marker.to_string(), 0);

    // a parent must be recorded before its children, so one pass links everything
    for rec in records {
        let parent = *by_key
            .get(&rec.parent_ref)
            .ok_or_else(|| HierarchyError::MissingParent(rec.parent_ref.clone()))?;

        let idx = slots.len();
        let node = match rec.kind {
            EntryKind::Dir { .. } => Node::Dir {
                name: rec.name.clone(),
                timestamp: rec.timestamp,
                children: Vec::new(),
            },
            EntryKind::File { size } => Node::File {
                name: rec.name.clone(),
                timestamp: rec.timestamp,
                size,
            },
        };
        slots.push(Slot {
            node,
            children: Vec::new(),
        });
        slots[parent].children.push(idx);

        if let Some(key) = rec.child_ref() {
            if by_key.insert(key.clone(), idx).is_some() {
                return Err(HierarchyError::DuplicateDir(key));
            }
        }
    }

    Ok(assemble(&mut slots, 0))
}

fn assemble(slots: &mut [Slot], idx: usize) -> Node {
    let child_ids = std::mem::take(&mut slots[idx].children);
    let built: Vec<Node> = child_ids.into_iter().map(|c| assemble(slots, c)).collect();

    let mut node = std::mem::replace(
        &mut slots[idx].node,
        Node::File {
            name: String::new(),
            timestamp: 0,
            size: 0,
        },
    );
    if let Node::Dir { children, .. } = &mut node {
        *children = built;
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(parent: &str, n: i64, name: &str) -> Record {
        Record::from_wire(parent.into(), 100, n, name.into())
    }

    #[test]
    fn empty_records_give_bare_root() {
        let root = build_hierarchy(&[], "root").unwrap();
        assert_eq!(root.name(), "root");
        assert!(root.children().is_empty());
        assert_eq!(root.totals(), (0, 0, 0));
    }

    #[test]
    fn links_children_to_the_right_instance() {
        let records = vec![
            rec("root", 10, "a.txt"),
            rec("root", -1, "src"),
            rec("src#-1", -1, "logs"),
            rec("logs#-1", 7, "x.log"),
            rec("root", -2, "src"),
            rec("src#-2", 3, "y.rs"),
        ];
        let root = build_hierarchy(&records, "root").unwrap();
        assert_eq!(root.children().len(), 3);

        let first_src = &root.children()[1];
        assert_eq!(first_src.children()[0].name(), "logs");
        let second_src = &root.children()[2];
        assert_eq!(second_src.children()[0].name(), "y.rs");

        let logs = root.find_dir(&["src", "logs"]).unwrap();
        assert_eq!(logs.children()[0].name(), "x.log");
        assert!(root.find_dir(&["src", "nope"]).is_none());
        assert!(root.find_dir(&["a.txt"]).is_none());

        assert_eq!(root.totals(), (3, 3, 20));
    }

    #[test]
    fn missing_parent_is_reported() {
        let records = vec![rec("ghost#-4", 1, "f")];
        assert_eq!(
            build_hierarchy(&records, "root"),
            Err(HierarchyError::MissingParent("ghost#-4".into()))
        );
    }

    #[test]
    fn parent_listed_after_child_is_missing() {
        let records = vec![rec("late#-1", 1, "f"), rec("root", -1, "late")];
        assert_eq!(
            build_hierarchy(&records, "root"),
            Err(HierarchyError::MissingParent("late#-1".into()))
        );
    }

    #[test]
    fn duplicate_dir_key_is_reported() {
        let records = vec![rec("root", -1, "a"), rec("root", -1, "a")];
        assert_eq!(
            build_hierarchy(&records, "root"),
            Err(HierarchyError::DuplicateDir("a#-1".into()))
        );
    }
}
