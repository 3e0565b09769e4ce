//! Reuse of vertex buffers between builds.

use crate::pipeline::MeshId;
use crate::tessellation::{VertexBuffer, VertexLayout};

use std::collections::HashMap;

/// An arena of vertex buffers keyed by mesh id.
///
/// Rebuilding a mesh usually produces about as many vertices as the previous
/// build of the same mesh, so a buffer handed back with
/// [`recycle`](#method.recycle) is preferably given back to the same id.
/// Buffers of ids that disappeared are reused for any other id.
#[derive(Clone, Debug, Default)]
pub struct MeshCache {
    buffers: HashMap<MeshId, VertexBuffer>,
    spare: Vec<VertexBuffer>,
}

impl MeshCache {
    pub fn new() -> Self {
        MeshCache {
            buffers: HashMap::new(),
            spare: Vec::new(),
        }
    }

    /// Returns an empty buffer with the requested layout.
    pub fn take(&mut self, id: MeshId, layout: VertexLayout) -> VertexBuffer {
        let mut buffer = self
            .buffers
            .remove(&id)
            .or_else(|| self.spare.pop())
            .unwrap_or_default();
        buffer.reset(layout);

        buffer
    }

    /// Hands a buffer back to the cache.
    pub fn recycle(&mut self, id: MeshId, buffer: VertexBuffer) {
        if let Some(previous) = self.buffers.insert(id, buffer) {
            self.spare.push(previous);
        }
    }

    /// Number of buffers held by the cache.
    pub fn len(&self) -> usize {
        self.buffers.len() + self.spare.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all cached buffers and their allocations.
    pub fn clear(&mut self) {
        self.buffers.clear();
        self.spare.clear();
    }
}

#[cfg(test)]
use crate::pipeline::{MeshKind, MeshSource};

#[cfg(test)]
fn id(style: u32) -> MeshId {
    MeshId {
        source: MeshSource::Shape,
        kind: MeshKind::Fill,
        table: 0,
        style,
        run: 0,
    }
}

#[test]
fn buffers_go_back_to_their_id() {
    let mut cache = MeshCache::new();

    let mut a = cache.take(id(1), VertexLayout::Position);
    a.vertices.extend_from_slice(&[0.0; 600]);
    let capacity = a.vertices.capacity();
    cache.recycle(id(1), a);
    cache.recycle(id(2), VertexBuffer::new(VertexLayout::Position));
    assert_eq!(cache.len(), 2);

    let a = cache.take(id(1), VertexLayout::PositionAndKind);
    assert!(a.is_empty());
    assert_eq!(a.layout(), VertexLayout::PositionAndKind);
    assert_eq!(a.vertices.capacity(), capacity);
    assert_eq!(cache.len(), 1);
}

#[test]
fn unknown_ids_reuse_spare_buffers() {
    let mut cache = MeshCache::new();
    cache.recycle(id(1), VertexBuffer::with_capacity(VertexLayout::Position, 100));
    cache.recycle(id(1), VertexBuffer::with_capacity(VertexLayout::Position, 50));
    assert_eq!(cache.len(), 2);

    // The first buffer was moved to the spare list by the second one.
    let buffer = cache.take(id(7), VertexLayout::Position);
    assert!(buffer.vertices.capacity() >= 200);
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}
