//! Scene graph - the rig as handed over by the asset loader
//!
//! This is NOT a renderer scene. It carries only what the animation engine
//! reads and writes: node names, bone markers, and per-mesh morph targets.

/// Morph targets of one mesh: ordered names and their current influences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphTargets {
    /// Target names, in influence order
    dictionary: Vec<String>,
    /// Influence per target, same length as `dictionary`
    influences: Vec<f32>,
}

impl MorphTargets {
    /// Morph targets with every influence at zero
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dictionary: Vec<String> = names.into_iter().map(Into::into).collect();
        let influences = vec![0.0; dictionary.len()];
        Self {
            dictionary,
            influences,
        }
    }

    /// Morph targets with explicit starting weights
    pub fn with_weights<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let (dictionary, influences) = pairs
            .into_iter()
            .map(|(name, weight)| (name.into(), weight))
            .unzip();
        Self {
            dictionary,
            influences,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.dictionary
    }

    pub fn influences(&self) -> &[f32] {
        &self.influences
    }

    pub fn influences_mut(&mut self) -> &mut [f32] {
        &mut self.influences
    }

    /// Slot of a target name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.dictionary.iter().position(|n| n == name)
    }

    /// Current influence of a target
    pub fn get(&self, name: &str) -> Option<f32> {
        self.index_of(name).and_then(|i| self.influences.get(i).copied())
    }

    pub fn len(&self) -> usize {
        self.dictionary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.is_empty()
    }
}

/// What a scene node is
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Plain transform node
    Group,
    /// Renderable mesh, possibly with morph targets
    Mesh(MorphTargets),
    /// Skeleton joint
    Bone,
}

/// One node of the rig
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, morphs: MorphTargets) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Mesh(morphs),
            children: Vec::new(),
        }
    }

    pub fn bone(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Bone,
            children: Vec::new(),
        }
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn is_bone(&self) -> bool {
        matches!(self.kind, NodeKind::Bone)
    }

    /// Morph targets if this node is a mesh that exposes any
    pub fn morph_targets(&self) -> Option<&MorphTargets> {
        match &self.kind {
            NodeKind::Mesh(morphs) if !morphs.is_empty() => Some(morphs),
            _ => None,
        }
    }

    pub fn morph_targets_mut(&mut self) -> Option<&mut MorphTargets> {
        match &mut self.kind {
            NodeKind::Mesh(morphs) if !morphs.is_empty() => Some(morphs),
            _ => None,
        }
    }

    /// Depth-first pre-order visit
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SceneNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Depth-first pre-order visit with mutable access
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut SceneNode)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }
}

/// The loaded rig
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    root: SceneNode,
}

impl SceneGraph {
    pub fn new(root: SceneNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut SceneNode {
        &mut self.root
    }

    /// First node with the given name, in traversal order
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        let mut found = None;
        self.root.walk(&mut |node| {
            if found.is_none() && node.name == name {
                found = Some(node);
            }
        });
        found
    }

    /// Number of nodes in the graph
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.root.walk(&mut |_| count += 1);
        count
    }
}
