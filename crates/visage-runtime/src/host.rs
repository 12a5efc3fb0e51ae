//! Avatar host - mounts a rig and runs its refresh loops
//!
//! Two independent loops share the registry:
//! - render: runs for the whole mount, animates the face and copies the
//!   weights back onto the scene graph
//! - lip sync: runs only while a driver session is live
//!
//! Unmounting stops both loops and cancels their outstanding refresh
//! requests, so the scheduler holds nothing for a dead avatar.

use tracing::info;
use visage_core::{RootTransform, VisageResult};
use visage_rig::{ChannelRegistry, SceneGraph};
use visage_time::{FrameRequest, ManualScheduler, RefreshScheduler, TickLoop};
use visage_voice::{DriverStatus, LipSyncKind, SpectrumSource};

use crate::{AvatarConfig, FrameCompositor, SpeechEvent};

/// What ran during one refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub rendered: bool,
    /// Driver status if the lip-sync loop ran
    pub lipsync: Option<DriverStatus>,
}

/// A mounted avatar
#[derive(Debug)]
pub struct AvatarHost<S: RefreshScheduler> {
    scheduler: S,
    graph: SceneGraph,
    registry: ChannelRegistry,
    compositor: FrameCompositor,
    render: TickLoop,
    lipsync: TickLoop,
    mounted: bool,
}

impl<S: RefreshScheduler> AvatarHost<S> {
    /// Index the rig and start the render loop
    pub fn mount(graph: SceneGraph, config: AvatarConfig, mut scheduler: S) -> VisageResult<Self> {
        let compositor = FrameCompositor::new(config)?;
        let registry = ChannelRegistry::index(&graph);

        let mut render = TickLoop::new("render");
        render.start(&mut scheduler);
        info!(meshes = registry.len(), "avatar mounted");

        Ok(Self {
            scheduler,
            graph,
            registry,
            compositor,
            render,
            lipsync: TickLoop::new("lipsync"),
            mounted: true,
        })
    }

    /// Run the loops whose requests are among `fired`
    pub fn on_refresh(&mut self, fired: &[FrameRequest], dt: f32) -> RefreshReport {
        let mut report = RefreshReport::default();

        if self.render.take_fired(fired) {
            self.compositor.animate(&mut self.registry, dt);
            self.render.rearm(&mut self.scheduler);
            report.rendered = true;
        }

        if self.lipsync.take_fired(fired) {
            let status = self.compositor.drive_lipsync(&mut self.registry, dt);
            // lost audio mid-speech hands over to procedural speech
            if self.compositor.lipsync_kind() == LipSyncKind::Idle {
                self.lipsync.stop(&mut self.scheduler);
            } else {
                self.lipsync.rearm(&mut self.scheduler);
            }
            report.lipsync = Some(status);
        }

        if report.rendered || report.lipsync.is_some() {
            self.registry.write_back(&mut self.graph);
        }
        report
    }

    /// Speech start/end/error from the page
    pub fn speech_event(&mut self, event: SpeechEvent) {
        if !self.mounted {
            return;
        }
        self.compositor.handle(&mut self.registry, event);
        self.sync_lipsync_loop();
    }

    pub fn attach_analyser(&mut self, source: Box<dyn SpectrumSource + Send>) {
        if !self.mounted {
            return;
        }
        self.compositor.attach_analyser(&mut self.registry, source);
        self.sync_lipsync_loop();
    }

    pub fn detach_analyser(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        let detached = self.compositor.detach_analyser(&mut self.registry);
        self.sync_lipsync_loop();
        detached
    }

    /// Stop both loops and close the mouth. Idempotent.
    pub fn unmount(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        self.render.stop(&mut self.scheduler);
        self.lipsync.stop(&mut self.scheduler);
        self.compositor.shutdown(&mut self.registry);
        self.registry.write_back(&mut self.graph);
        self.mounted = false;
        info!(
            ticks = self.render.ticks(),
            lipsync_ticks = self.lipsync.ticks(),
            "avatar unmounted"
        );
        true
    }

    /// Keep the lip-sync loop running exactly while a driver is live.
    /// A stopped procedural session has already zeroed the mouth.
    fn sync_lipsync_loop(&mut self) {
        if self.compositor.lipsync_kind() == LipSyncKind::Idle {
            self.lipsync.stop(&mut self.scheduler);
        } else {
            self.lipsync.start(&mut self.scheduler);
        }
        self.registry.write_back(&mut self.graph);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    pub fn root(&self) -> &RootTransform {
        self.compositor.root()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn render_loop(&self) -> &TickLoop {
        &self.render
    }

    pub fn lipsync_loop(&self) -> &TickLoop {
        &self.lipsync
    }
}

impl AvatarHost<ManualScheduler> {
    /// Fire one display refresh and run whatever it woke
    pub fn step(&mut self, dt: f32) -> RefreshReport {
        let fired = self.scheduler.fire();
        self.on_refresh(&fired, dt)
    }
}
