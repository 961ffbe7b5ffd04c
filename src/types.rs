/// Parent reference used for entries directly inside the scan root.
pub const ROOT_MARKER: &str = "root";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EntryKind {
    File { size: u64 },
    /// Synthetic id, always negative.
    Dir { id: i64 },
}

/// One flat entry of a snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    pub parent_ref: String,

    /// mtime, whole seconds since epoch
    pub timestamp: i64,

    pub kind: EntryKind,
    pub name: String,
}

impl Record {
    /// negative third field = directory
    pub fn from_wire(parent_ref: String, timestamp: i64, size_or_id: i64, name: String) -> Self {
        let kind = if size_or_id < 0 {
            EntryKind::Dir { id: size_or_id }
        } else {
            EntryKind::File {
                size: size_or_id as u64,
            }
        };
        Record {
            parent_ref,
            timestamp,
            kind,
            name,
        }
    }

    /// third column on the wire
    pub fn size_or_id(&self) -> i64 {
        match self.kind {
            // file lengths never exceed i64::MAX on any real filesystem (off_t is signed)
            EntryKind::File { size } => i64::try_from(size).unwrap_or(i64::MAX),
            EntryKind::Dir { id } => id,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Dir { .. })
    }

    /// `name#id`, the parent reference carried by this directory's children.
    pub fn child_ref(&self) -> Option<String> {
        match self.kind {
            EntryKind::Dir { id } => Some(dir_ref(&self.name, id)),
            EntryKind::File { .. } => None,
        }
    }
}

pub fn dir_ref(name: &str, id: i64) -> String {
    format!("{}#{}", name, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_sign_selects_kind() {
        let d = Record::from_wire("root".into(), 5, -3, "src".into());
        assert!(d.is_dir());
        assert_eq!(d.child_ref().as_deref(), Some("src#-3"));
        assert_eq!(d.size_or_id(), -3);

        let f = Record::from_wire("src#-3".into(), 5, 0, "empty.txt".into());
        assert_eq!(f.kind, EntryKind::File { size: 0 });
        assert_eq!(f.child_ref(), None);
    }
}
