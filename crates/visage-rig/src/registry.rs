//! Channel registry - the indexed blend channels of one rig
//!
//! Built once when the rig loads, mutated every frame, dropped with the rig.
//! Writes to a channel a mesh does not expose are silent no-ops: rigs differ
//! in which channels they ship and absence is expected.

use std::collections::HashMap;

use visage_core::{ease, BoneId, MeshId};

use crate::{SceneGraph, SceneNode};

/// Blend channels of one mesh
#[derive(Debug, Clone)]
pub struct MeshChannels {
    id: MeshId,
    name: String,
    /// Channel names in slot order
    names: Vec<String>,
    /// Name to slot
    slots: HashMap<String, usize>,
    /// Weight per slot, always in [0, 1]
    weights: Vec<f32>,
}

impl MeshChannels {
    fn from_node(id: MeshId, node: &SceneNode) -> Option<Self> {
        let morphs = node.morph_targets()?;
        let names: Vec<String> = morphs.names().to_vec();
        let mut slots = HashMap::with_capacity(names.len());
        for (slot, name) in names.iter().enumerate() {
            slots.entry(name.clone()).or_insert(slot);
        }
        let weights = morphs
            .influences()
            .iter()
            .map(|w| sanitize(*w))
            .collect();

        Some(Self {
            id,
            name: node.name.clone(),
            names,
            slots,
            weights,
        })
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.slots.contains_key(channel)
    }

    /// Current weight of a channel
    pub fn get(&self, channel: &str) -> Option<f32> {
        self.slots.get(channel).map(|&slot| self.weights[slot])
    }

    /// Assign a weight. Returns false if the mesh lacks the channel.
    pub fn set(&mut self, channel: &str, value: f32) -> bool {
        match self.slots.get(channel) {
            Some(&slot) => {
                self.weights[slot] = sanitize(value);
                true
            }
            None => false,
        }
    }

    /// One easing step toward `target`. Returns the new weight.
    pub fn ease(&mut self, channel: &str, target: f32, rate: f32) -> Option<f32> {
        let slot = *self.slots.get(channel)?;
        let next = sanitize(ease(self.weights[slot], target, rate));
        self.weights[slot] = next;
        Some(next)
    }

    /// Channel names and weights in slot order
    pub fn channels(&self) -> impl Iterator<Item = (&str, f32)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

/// Reference to the head (or neck) bone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadRef {
    pub bone: BoneId,
    pub name: String,
}

/// Registry of every channel-bearing mesh on the rig
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    meshes: Vec<MeshChannels>,
    head: Option<HeadRef>,
}

impl ChannelRegistry {
    /// Index a rig in one traversal
    pub fn index(graph: &SceneGraph) -> Self {
        let mut meshes = Vec::new();
        let mut head = None;
        let mut bone_count: u32 = 0;

        graph.root().walk(&mut |node| {
            if node.is_bone() {
                let id = BoneId::new(bone_count);
                bone_count += 1;
                if head.is_none() && is_head_bone(&node.name) {
                    tracing::debug!(bone = %node.name, "found head bone");
                    head = Some(HeadRef {
                        bone: id,
                        name: node.name.clone(),
                    });
                }
            }

            let id = MeshId::new(meshes.len() as u32);
            if let Some(mesh) = MeshChannels::from_node(id, node) {
                tracing::debug!(
                    mesh = %mesh.name,
                    channels = mesh.names.len(),
                    "found mesh with blend channels"
                );
                meshes.push(mesh);
            }
        });

        tracing::info!(
            meshes = meshes.len(),
            bones = bone_count,
            head = head.as_ref().map(|h| h.name.as_str()).unwrap_or("none"),
            "indexed rig"
        );

        Self { meshes, head }
    }

    /// Assign a weight on one mesh. No-op if the mesh or channel is absent.
    pub fn set_channel(&mut self, mesh: MeshId, channel: &str, value: f32) {
        if let Some(m) = self.meshes.get_mut(mesh.index()) {
            m.set(channel, value);
        }
    }

    /// Current weight of a channel on one mesh
    pub fn channel(&self, mesh: MeshId, channel: &str) -> Option<f32> {
        self.meshes.get(mesh.index())?.get(channel)
    }

    /// One easing step on one mesh
    pub fn ease_channel(&mut self, mesh: MeshId, channel: &str, target: f32, rate: f32) {
        if let Some(m) = self.meshes.get_mut(mesh.index()) {
            m.ease(channel, target, rate);
        }
    }

    /// Assign a weight on every mesh exposing the channel
    pub fn set_everywhere(&mut self, channel: &str, value: f32) {
        for mesh in &mut self.meshes {
            mesh.set(channel, value);
        }
    }

    /// One easing step on every mesh exposing the channel
    pub fn ease_everywhere(&mut self, channel: &str, target: f32, rate: f32) {
        for mesh in &mut self.meshes {
            mesh.ease(channel, target, rate);
        }
    }

    /// Does any mesh expose the channel?
    pub fn exposes(&self, channel: &str) -> bool {
        self.meshes.iter().any(|m| m.contains(channel))
    }

    /// Weights of a channel across every mesh exposing it
    pub fn values(&self, channel: &str) -> Vec<f32> {
        self.meshes.iter().filter_map(|m| m.get(channel)).collect()
    }

    pub fn mesh(&self, mesh: MeshId) -> Option<&MeshChannels> {
        self.meshes.get(mesh.index())
    }

    pub fn meshes(&self) -> &[MeshChannels] {
        &self.meshes
    }

    pub fn head(&self) -> Option<&HeadRef> {
        self.head.as_ref()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Copy weights back onto the scene graph's influence arrays.
    /// Meshes are matched in the same traversal order `index` used.
    pub fn write_back(&self, graph: &mut SceneGraph) {
        let mut next = 0usize;
        graph.root_mut().walk_mut(&mut |node| {
            if let Some(morphs) = node.morph_targets_mut() {
                if let Some(mesh) = self.meshes.get(next) {
                    for (dst, src) in morphs.influences_mut().iter_mut().zip(&mesh.weights) {
                        *dst = *src;
                    }
                }
                next += 1;
            }
        });
    }
}

fn is_head_bone(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("head") || lower.contains("neck")
}

/// Clamp a weight into [0, 1]; NaN becomes 0
fn sanitize(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
