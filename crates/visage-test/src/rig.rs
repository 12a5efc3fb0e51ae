//! Rig builders - scene graphs shaped like the avatars we ship against

use visage_core::{ALL_CHANNELS, EYE_BLINK_LEFT, MOUTH_OPEN};
use visage_rig::{ChannelRegistry, MorphTargets, SceneGraph, SceneNode};

/// Name of the main face mesh in the builders below
pub const HEAD_MESH: &str = "Wolf3D_Head";

/// Full half-body avatar: skeleton down to a neck and head bone, a face mesh
/// with every channel, teeth that only open, and channel-less body parts
pub fn full_face() -> SceneGraph {
    let skeleton = SceneNode::bone("Hips").with_child(
        SceneNode::bone("Spine").with_child(
            SceneNode::bone("Neck")
                .with_child(SceneNode::bone("Head").with_child(SceneNode::bone("HeadTop_End"))),
        ),
    );

    SceneGraph::new(
        SceneNode::group("Armature")
            .with_child(skeleton)
            .with_child(SceneNode::mesh(HEAD_MESH, MorphTargets::new(ALL_CHANNELS)))
            .with_child(SceneNode::mesh("Wolf3D_Teeth", MorphTargets::new([MOUTH_OPEN])))
            .with_child(SceneNode::mesh("Wolf3D_Body", MorphTargets::default()))
            .with_child(SceneNode::mesh("EyeLeft", MorphTargets::default())),
    )
}

/// One mesh with a mouth and a single eyelid
pub fn minimal_face() -> SceneGraph {
    rig_with_channels(&[MOUTH_OPEN, EYE_BLINK_LEFT])
}

/// One mesh carrying exactly `channels`
pub fn rig_with_channels(channels: &[&str]) -> SceneGraph {
    SceneGraph::new(
        SceneNode::group("Scene").with_child(SceneNode::mesh(
            HEAD_MESH,
            MorphTargets::new(channels.iter().copied()),
        )),
    )
}

/// Skeleton without any blend channels
pub fn bare_rig() -> SceneGraph {
    SceneGraph::new(SceneNode::group("Scene").with_child(SceneNode::bone("Root")))
}

/// Index a graph
pub fn registry(graph: &SceneGraph) -> ChannelRegistry {
    ChannelRegistry::index(graph)
}
