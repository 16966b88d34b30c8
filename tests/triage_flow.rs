//! Upload → analyze → result flows through a whole session, with the
//! inference service and preview URLs replaced by in-memory fakes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use futures::executor::block_on;

use xray_triage::config::TriageConfig;
use xray_triage::error::{FailureReason, InferenceError, UploadError};
use xray_triage::triage::inference::ClassifyFuture;
use xray_triage::triage::presenter::Phase;
use xray_triage::triage::{
    AnalysisState, Confidence, DashboardFrame, DiagnosisResult, DiseaseDetail, ImageHandle,
    InferenceService, PendingAnalysis, PreviewAllocator, RawFile, Resolution,
    SimulatedInference, Status, TriageObserver, TriageSession,
};

type Reply = Result<DiagnosisResult, InferenceError>;

/// Hands out one channel per request so tests decide when and in which
/// order replies arrive.
#[derive(Default)]
struct QueuedInference {
    senders: RefCell<Vec<Option<oneshot::Sender<Reply>>>>,
    names: RefCell<Vec<String>>,
}

impl QueuedInference {
    fn reply(&self, index: usize, reply: Reply) {
        let sender = self.senders.borrow_mut()[index]
            .take()
            .expect("request already answered");
        sender.send(reply).expect("receiver dropped");
    }

    fn issued(&self) -> usize {
        self.senders.borrow().len()
    }
}

impl InferenceService for QueuedInference {
    fn name(&self) -> &'static str {
        "queued"
    }

    fn classify(&self, image: &ImageHandle) -> ClassifyFuture {
        let (tx, rx) = oneshot::channel();
        self.senders.borrow_mut().push(Some(tx));
        self.names.borrow_mut().push(image.name().to_string());
        Box::pin(async move {
            rx.await
                .unwrap_or_else(|_| Err(InferenceError::Network("request dropped".into())))
        })
    }
}

#[derive(Default)]
struct CountingAllocator {
    next: Cell<u32>,
    released: RefCell<Vec<String>>,
}

impl CountingAllocator {
    fn allocated(&self) -> u32 {
        self.next.get()
    }
}

impl PreviewAllocator for CountingAllocator {
    fn allocate(&self, _image: &ImageHandle) -> Option<String> {
        let n = self.next.get() + 1;
        self.next.set(n);
        Some(format!("blob:preview-{}", n))
    }

    fn release(&self, uri: &str) {
        self.released.borrow_mut().push(uri.to_string());
    }
}

#[derive(Default)]
struct RecordingObserver {
    frames: RefCell<Vec<DashboardFrame>>,
}

impl TriageObserver for RecordingObserver {
    fn render(&self, frame: &DashboardFrame) {
        self.frames.borrow_mut().push(frame.clone());
    }
}

fn png(name: &str) -> RawFile {
    RawFile::from_bytes(name, "image/png", &[0x89, b'P', b'N', b'G', 0x0d, 0x0a])
}

fn normal(percent: f64) -> DiagnosisResult {
    DiagnosisResult::normal(Confidence::from_percent(percent).unwrap())
}

fn pneumonia(percent: f64) -> DiagnosisResult {
    let detail = DiseaseDetail::new(
        "Bacterial Pneumonia",
        vec!["Bacteria (Streptococcus pneumoniae)".into()],
        vec!["Lobar consolidation".into()],
        vec!["Amoxicillin".into()],
    )
    .unwrap();
    DiagnosisResult::diseased(Confidence::from_percent(percent).unwrap(), detail)
}

fn queued_session() -> (TriageSession, Rc<QueuedInference>, Rc<CountingAllocator>) {
    let service = Rc::new(QueuedInference::default());
    let previews = Rc::new(CountingAllocator::default());
    let session = TriageSession::new(service.clone(), previews.clone());
    (session, service, previews)
}

#[test]
fn test_png_upload_to_normal_result() {
    let healthy = SimulatedInference::new(Duration::ZERO, 0.6).with_roll(|| 0.1);
    let previews = Rc::new(CountingAllocator::default());
    let session = TriageSession::new(healthy, previews.clone());

    session.submit(png("chest.png")).unwrap();
    assert_eq!(session.state(), AnalysisState::Ready);
    assert_eq!(session.frame().preview_url.as_deref(), Some("blob:preview-1"));

    let pending = session.analyze().expect("image is armed");
    assert_eq!(session.state(), AnalysisState::Analyzing);
    assert!(!session.frame().can_analyze);

    assert_eq!(block_on(pending), Resolution::Applied);
    match session.state() {
        AnalysisState::Succeeded(result) => {
            assert_eq!(result.status(), Status::Normal);
            assert_eq!(result.confidence.percent(), 98.4);
            assert!(result.detail().is_none());
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(session.frame().view.phase(), Phase::Result);
}

#[test]
fn test_pdf_is_rejected_without_state_change() {
    let (session, _service, previews) = queued_session();

    let err = session
        .submit(RawFile::from_bytes("report.pdf", "application/pdf", b"%PDF-1.7"))
        .unwrap_err();

    assert_eq!(err, UploadError::InvalidMediaType("application/pdf".into()));
    assert_eq!(session.state(), AnalysisState::Idle);
    assert_eq!(previews.allocated(), 0);

    let frame = session.frame();
    assert_eq!(frame.notice, Some("Please upload an image file (JPG, PNG)."));
    assert!(frame.preview_url.is_none());
    assert!(session.analyze().is_none());
}

#[test]
fn test_rejection_keeps_armed_image() {
    let (session, _service, previews) = queued_session();
    session.submit(png("chest.png")).unwrap();

    assert!(session
        .submit(RawFile::from_bytes("notes.txt", "text/plain", b"hello"))
        .is_err());

    assert_eq!(session.state(), AnalysisState::Ready);
    assert_eq!(session.frame().file_name.as_deref(), Some("chest.png"));
    assert_eq!(previews.allocated(), 1);
    assert!(previews.released.borrow().is_empty());
}

#[test]
fn test_stale_response_is_discarded() {
    let (session, service, _previews) = queued_session();
    session.submit(png("chest.png")).unwrap();

    let first = session.analyze().unwrap();
    let second = session.analyze().unwrap();
    assert_eq!(service.issued(), 2);

    service.reply(1, Ok(normal(97.0)));
    assert_eq!(block_on(second), Resolution::Applied);

    service.reply(0, Ok(pneumonia(88.0)));
    assert_eq!(block_on(first), Resolution::Stale);

    assert_eq!(session.state(), AnalysisState::Succeeded(normal(97.0)));
}

#[test]
fn test_earlier_request_arriving_first_is_still_discarded() {
    let (session, service, _previews) = queued_session();
    session.submit(png("chest.png")).unwrap();

    let first = session.analyze().unwrap();
    let second = session.analyze().unwrap();

    service.reply(0, Ok(pneumonia(88.0)));
    assert_eq!(block_on(first), Resolution::Stale);
    assert_eq!(session.state(), AnalysisState::Analyzing);

    service.reply(1, Ok(normal(97.0)));
    assert_eq!(block_on(second), Resolution::Applied);
    assert_eq!(session.state(), AnalysisState::Succeeded(normal(97.0)));
}

#[test]
fn test_new_upload_while_analyzing_supersedes_request() {
    let (session, service, previews) = queued_session();
    session.submit(png("first.png")).unwrap();
    let pending = session.analyze().unwrap();

    session.submit(png("second.png")).unwrap();
    assert_eq!(session.state(), AnalysisState::Ready);
    assert_eq!(*previews.released.borrow(), vec!["blob:preview-1".to_string()]);

    service.reply(0, Ok(pneumonia(90.0)));
    assert_eq!(block_on(pending), Resolution::Stale);
    assert_eq!(session.state(), AnalysisState::Ready);
    assert_eq!(session.frame().file_name.as_deref(), Some("second.png"));
}

#[test]
fn test_clear_while_analyzing_releases_preview_once() {
    let (session, service, previews) = queued_session();
    session.submit(png("chest.png")).unwrap();
    let pending = session.analyze().unwrap();

    assert!(session.clear());
    assert_eq!(session.state(), AnalysisState::Idle);
    assert_eq!(previews.released.borrow().len(), 1);

    service.reply(0, Ok(normal(99.0)));
    assert_eq!(block_on(pending), Resolution::Stale);
    assert_eq!(session.state(), AnalysisState::Idle);

    // Second clear is a no-op and must not revoke again.
    assert!(!session.clear());
    assert_eq!(previews.released.borrow().len(), 1);
}

#[test]
fn test_clear_then_upload_matches_direct_upload() {
    let (detour, _s1, _p1) = queued_session();
    detour.submit(png("old.png")).unwrap();
    detour.clear();
    detour.submit(png("new.png")).unwrap();

    let (direct, _s2, _p2) = queued_session();
    direct.submit(png("new.png")).unwrap();

    let (a, b) = (detour.frame(), direct.frame());
    assert_eq!(detour.state(), direct.state());
    assert_eq!(a.view, b.view);
    assert_eq!(a.file_name, b.file_name);
    assert_eq!(a.can_analyze, b.can_analyze);
    assert!(a.preview_url.is_some() && b.preview_url.is_some());
}

#[test]
fn test_failure_then_retry() {
    let (session, service, _previews) = queued_session();
    session.submit(png("chest.png")).unwrap();

    let pending = session.analyze().unwrap();
    service.reply(0, Err(InferenceError::Collaborator("model not loaded".into())));
    block_on(pending);
    assert_eq!(
        session.state(),
        AnalysisState::Failed(FailureReason::CollaboratorError)
    );
    assert!(session.frame().can_analyze);

    let retry = session.analyze().expect("retry allowed after failure");
    assert_eq!(session.state(), AnalysisState::Analyzing);
    service.reply(1, Ok(pneumonia(92.8)));
    assert_eq!(block_on(retry), Resolution::Applied);
    assert_eq!(
        session.state().clone(),
        AnalysisState::Succeeded(pneumonia(92.8))
    );
    assert_eq!(*service.names.borrow(), vec!["chest.png", "chest.png"]);
}

#[test]
fn test_observers_follow_every_transition() {
    let (session, service, _previews) = queued_session();
    let observer = Rc::new(RecordingObserver::default());
    session.subscribe(observer.clone());

    session.submit(png("chest.png")).unwrap();
    let pending = session.analyze().unwrap();
    service.reply(0, Ok(normal(98.4)));
    block_on(pending);

    let phases: Vec<Phase> = observer
        .frames
        .borrow()
        .iter()
        .map(|f| f.view.phase())
        .collect();
    assert_eq!(
        phases,
        vec![Phase::Empty, Phase::Ready, Phase::Progress, Phase::Result]
    );
}

#[test]
fn test_empty_drop_is_ignored() {
    let (session, _service, previews) = queued_session();
    assert!(session.submit_drop(Vec::new()).is_ok());
    assert_eq!(session.state(), AnalysisState::Idle);
    assert_eq!(previews.allocated(), 0);

    session
        .submit_drop(vec![png("a.png"), png("b.png")])
        .unwrap();
    assert_eq!(session.frame().file_name.as_deref(), Some("a.png"));
}

#[test]
fn test_simulated_upload_starts_analysis_by_itself() {
    let config = TriageConfig::from_json(r#"{"inference": {"mode": "simulated"}}"#).unwrap();
    let spawned: Rc<RefCell<Vec<PendingAnalysis>>> = Rc::default();
    let queue = spawned.clone();

    let session = TriageSession::new(
        SimulatedInference::new(Duration::ZERO, config.simulated.healthy_probability)
            .with_roll(|| 0.1),
        Rc::new(CountingAllocator::default()),
    )
    .with_auto_analyze(config.auto_analyze())
    .with_spawner(move |pending| queue.borrow_mut().push(pending));
    assert!(session.auto_analyze());

    session.submit(png("chest.png")).unwrap();
    assert_eq!(session.state(), AnalysisState::Analyzing);
    assert_eq!(spawned.borrow().len(), 1);

    let pending = spawned.borrow_mut().remove(0);
    assert_eq!(block_on(pending), Resolution::Applied);
    assert_eq!(session.state(), AnalysisState::Succeeded(normal(98.4)));
}

#[test]
fn test_rejected_upload_does_not_start_analysis() {
    let spawned: Rc<RefCell<Vec<PendingAnalysis>>> = Rc::default();
    let queue = spawned.clone();
    let (session, service, _previews) = queued_session();
    let session = session
        .with_auto_analyze(true)
        .with_spawner(move |pending| queue.borrow_mut().push(pending));

    assert!(session
        .submit(RawFile::from_bytes("scan.pdf", "application/pdf", b"%PDF"))
        .is_err());
    assert_eq!(session.state(), AnalysisState::Idle);
    assert!(spawned.borrow().is_empty());
    assert_eq!(service.issued(), 0);
}

#[test]
fn test_live_session_waits_for_explicit_trigger() {
    let (session, service, _previews) = queued_session();
    assert!(!session.auto_analyze());

    session.submit(png("chest.png")).unwrap();
    assert_eq!(session.state(), AnalysisState::Ready);
    assert_eq!(service.issued(), 0);
}
