//! Dashboard session: one controller, one preview manager, many renderers.
//!
//! Runs on the UI thread only. Renderers register as [`TriageObserver`]s and
//! receive a fresh [`DashboardFrame`] after every visible change; they never
//! hold state of their own.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use tracing::{info, warn};

use super::controller::{AnalysisController, AnalysisState, Resolution};
use super::inference::InferenceService;
use super::presenter::{present, DisplayModel};
use super::preview::{PreviewAllocator, PreviewManager};
use super::upload::{self, RawFile};
use crate::error::UploadError;

/// Everything a renderer needs to draw the upload and result panels.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFrame {
    pub view: DisplayModel,
    pub preview_url: Option<String>,
    pub file_name: Option<String>,
    pub can_analyze: bool,
    pub can_clear: bool,
    /// Upload rejection text, if the last submission was refused
    pub notice: Option<&'static str>,
}

impl Default for DashboardFrame {
    fn default() -> Self {
        Self {
            view: present(&AnalysisState::Idle),
            preview_url: None,
            file_name: None,
            can_analyze: false,
            can_clear: false,
            notice: None,
        }
    }
}

/// A renderer bound to a session.
pub trait TriageObserver {
    fn render(&self, frame: &DashboardFrame);
}

/// Completion of one analysis request. Must be driven to completion by the
/// caller (usually `spawn_local`).
pub type PendingAnalysis = Pin<Box<dyn Future<Output = Resolution>>>;

/// Drives a [`PendingAnalysis`] to completion off the caller's stack.
pub type Spawner = Rc<dyn Fn(PendingAnalysis)>;

fn spawn_on_event_loop(pending: PendingAnalysis) {
    wasm_bindgen_futures::spawn_local(async move {
        pending.await;
    });
}

struct Core {
    controller: AnalysisController,
    previews: PreviewManager<Box<dyn PreviewAllocator>>,
    notice: Option<&'static str>,
}

impl Core {
    fn frame(&self) -> DashboardFrame {
        let state = self.controller.state();
        DashboardFrame {
            view: present(state),
            preview_url: self.previews.current().map(str::to_string),
            file_name: self.controller.armed().map(|image| image.name().to_string()),
            can_analyze: self.controller.can_analyze(),
            can_clear: *state != AnalysisState::Idle,
            notice: self.notice,
        }
    }
}

#[derive(Clone)]
pub struct TriageSession {
    core: Rc<RefCell<Core>>,
    service: Rc<dyn InferenceService>,
    observers: Rc<RefCell<Vec<Rc<dyn TriageObserver>>>>,
    spawner: Spawner,
    auto_analyze: bool,
}

impl TriageSession {
    pub fn new<S, A>(service: S, allocator: A) -> Self
    where
        S: InferenceService + 'static,
        A: PreviewAllocator + 'static,
    {
        info!("Triage session using {} inference", service.name());
        Self {
            core: Rc::new(RefCell::new(Core {
                controller: AnalysisController::new(),
                previews: PreviewManager::new(Box::new(allocator)),
                notice: None,
            })),
            service: Rc::new(service),
            observers: Rc::new(RefCell::new(Vec::new())),
            spawner: Rc::new(spawn_on_event_loop),
            auto_analyze: false,
        }
    }

    /// Start analysing as soon as an upload is accepted.
    pub fn with_auto_analyze(mut self, enabled: bool) -> Self {
        self.auto_analyze = enabled;
        self
    }

    /// Replace how triggered analyses are run. Defaults to `spawn_local`.
    pub fn with_spawner(mut self, spawner: impl Fn(PendingAnalysis) + 'static) -> Self {
        self.spawner = Rc::new(spawner);
        self
    }

    pub fn auto_analyze(&self) -> bool {
        self.auto_analyze
    }

    /// Register a renderer and draw the current frame into it.
    pub fn subscribe(&self, observer: Rc<dyn TriageObserver>) {
        observer.render(&self.frame());
        self.observers.borrow_mut().push(observer);
    }

    pub fn frame(&self) -> DashboardFrame {
        self.core.borrow().frame()
    }

    pub fn state(&self) -> AnalysisState {
        self.core.borrow().controller.state().clone()
    }

    /// Accept a picked file. A rejected file leaves the armed image and the
    /// analysis state untouched and only raises a notice. With auto-analyze
    /// on, an accepted file goes straight to `Analyzing`.
    pub fn submit(&self, raw: RawFile) -> Result<(), UploadError> {
        let outcome = upload::submit(raw);
        {
            let mut core = self.core.borrow_mut();
            match &outcome {
                Ok(image) => {
                    core.notice = None;
                    core.previews.set_source(image);
                    core.controller.arm(image.clone());
                }
                Err(err) => {
                    warn!("Upload rejected: {}", err);
                    core.notice = Some(err.user_message());
                }
            }
        }
        self.notify();

        if outcome.is_ok() && self.auto_analyze {
            self.trigger_analysis();
        }
        outcome.map(|_| ())
    }

    /// Accept a drop. Only the first file is used; an empty drop does nothing.
    pub fn submit_drop(&self, files: Vec<RawFile>) -> Result<(), UploadError> {
        match upload::first_dropped(files) {
            Some(raw) => self.submit(raw),
            None => Ok(()),
        }
    }

    /// Issue a classification request for the armed image.
    ///
    /// Returns `None` when nothing is armed. The returned future applies the
    /// response only if no newer request, upload or clear happened meanwhile.
    pub fn analyze(&self) -> Option<PendingAnalysis> {
        let request = self.core.borrow_mut().controller.begin()?;
        self.notify();

        let reply = self.service.classify(request.image());
        let session = self.clone();
        Some(Box::pin(async move {
            let outcome = reply.await;
            let resolution = session
                .core
                .borrow_mut()
                .controller
                .resolve(request.sequence(), outcome);
            if resolution == Resolution::Applied {
                session.notify();
            }
            resolution
        }))
    }

    /// Start an analysis and hand it to the spawner.
    pub fn trigger_analysis(&self) {
        if let Some(pending) = self.analyze() {
            (self.spawner)(pending);
        }
    }

    /// Return to `Idle`, releasing the preview. No-op when already idle.
    pub fn clear(&self) -> bool {
        let changed = {
            let mut core = self.core.borrow_mut();
            let had_notice = core.notice.take().is_some();
            let released = core.previews.clear();
            let cleared = core.controller.clear();
            cleared || released || had_notice
        };
        if changed {
            self.notify();
        }
        changed
    }

    fn notify(&self) {
        let frame = self.frame();
        let observers: Vec<Rc<dyn TriageObserver>> = self.observers.borrow().clone();
        for observer in observers {
            observer.render(&frame);
        }
    }
}
