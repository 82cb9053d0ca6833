use crate::mix_id::format_id;
use crate::{ArchiveError, EntryRef, IdScheme, MixArchive};
use log::debug;
use rustc_hash::FxHashMap;
use std::ops::Range;

type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    range: Range<usize>,
    children: FxHashMap<u32, NodeId>,
}

/// Owns the outermost archive's bytes and every archive opened inside it.
/// Nodes only point down to their children, so nothing borrows from a
/// sibling or a parent.
#[derive(Debug, Clone)]
pub struct MixTree {
    data: Vec<u8>,
    scheme: IdScheme,
    nodes: Vec<Node>,
}

impl MixTree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(data: Vec<u8>) -> Result<Self> {
        MixTree::with_scheme(data, IdScheme::default())
    }

    pub fn with_scheme(data: Vec<u8>, scheme: IdScheme) -> Result<Self> {
        MixArchive::with_scheme(&data, scheme)?;
        let root = Node {
            range: 0..data.len(),
            children: FxHashMap::default(),
        };
        Ok(MixTree {
            data,
            scheme,
            nodes: vec![root],
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bytes(&self, node: NodeId) -> &[u8] {
        &self.data[self.nodes[node.0].range.clone()]
    }

    pub fn archive(&self, node: NodeId) -> Result<MixArchive<'_>> {
        MixArchive::with_scheme(self.bytes(node), self.scheme)
    }

    /// Opens the entry `entry` of `parent` as an archive. Already opened
    /// children are returned without parsing again.
    pub fn open_child(&mut self, parent: NodeId, entry: &EntryRef) -> Result<NodeId> {
        let (id, range) = {
            let archive = self.archive(parent)?;
            let id = archive
                .resolve(entry)
                .ok_or_else(|| ArchiveError::NotFound(entry.to_string()))?;
            (id, archive.entry_range(id)?)
        };
        if let Some(child) = self.nodes[parent.0].children.get(&id) {
            return Ok(*child);
        }
        let start = self.nodes[parent.0].range.start;
        let range = start + range.start..start + range.end;
        match MixArchive::with_scheme(&self.data[range.clone()], self.scheme) {
            Ok(_) => {}
            Err(ArchiveError::Encrypted) => return Err(ArchiveError::Encrypted),
            Err(_) => return Err(ArchiveError::NotAContainer(entry.to_string())),
        }
        let child = NodeId(self.nodes.len());
        debug!("Opened nested MIX {} as node {}", format_id(id), child.0);
        self.nodes.push(Node {
            range,
            children: FxHashMap::default(),
        });
        self.nodes[parent.0].children.insert(id, child);
        Ok(child)
    }

    /// Opens every segment of `path` as an archive, starting from the root.
    pub fn open_path(&mut self, path: &[EntryRef]) -> Result<NodeId> {
        let mut node = MixTree::ROOT;
        for segment in path {
            node = self.open_child(node, segment)?;
        }
        Ok(node)
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        self.nodes[node.0].children.iter().map(|(id, child)| (*id, *child))
    }
}
