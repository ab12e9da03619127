//! Runs backend calls off the UI thread and hands back tagged results.
//!
//! Requests go to a worker thread hosting a single-threaded tokio runtime.
//! Each request becomes its own blocking task, so slow calls do not queue
//! behind each other. Results come back over a std channel the UI polls on
//! every tick.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, mpsc};
use std::thread;

use thiserror::Error;
use tokio::sync::mpsc as tokio_mpsc;
use zeroize::Zeroize;

use crate::backend::{BackendError, VaultBackend};
use crate::model::{Folder, ListFilter, Session, VaultEntry};

/// Identifies a dispatched request and the screen epoch it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    pub epoch: u64,
}

pub enum Request {
    Unlock { password: String },
    ListEntries { session: Session, filter: ListFilter },
    FetchEntry { session: Session, id: String },
    Sync { session: Session },
    CreateEntry { session: Session, draft: VaultEntry },
}

impl Request {
    /// Prefix for the failure message shown to the user.
    fn failure_context(&self) -> &'static str {
        match self {
            Self::Unlock { .. } => "Unlock failed",
            Self::ListEntries { .. } => "Could not list entries",
            Self::FetchEntry { .. } => "Could not open entry",
            Self::Sync { .. } => "Sync failed",
            Self::CreateEntry { .. } => "Could not create entry",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unlock { .. } => "unlock",
            Self::ListEntries { .. } => "list",
            Self::FetchEntry { .. } => "fetch",
            Self::Sync { .. } => "sync",
            Self::CreateEntry { .. } => "create",
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlock { .. } => f.write_str("Unlock { .. }"),
            Self::ListEntries { filter, .. } => {
                f.debug_struct("ListEntries").field("filter", filter).finish()
            }
            Self::FetchEntry { id, .. } => f.debug_struct("FetchEntry").field("id", id).finish(),
            Self::Sync { .. } => f.write_str("Sync"),
            Self::CreateEntry { draft, .. } => f
                .debug_struct("CreateEntry")
                .field("name", &draft.name)
                .finish(),
        }
    }
}

#[derive(Debug)]
pub enum Completion {
    Unlocked(Session),
    Listed {
        entries: Vec<VaultEntry>,
        folders: Vec<Folder>,
    },
    Fetched(VaultEntry),
    Synced,
    Created { name: String },
}

/// A failed operation, already phrased for the status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Failure {
    pub message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn from_backend(context: &str, err: &BackendError) -> Self {
        Self::new(format!("{context}: {err}"))
    }
}

#[derive(Debug)]
pub struct Response {
    pub ticket: Ticket,
    pub outcome: Result<Completion, Failure>,
}

/// Seam between the controller and whatever runs the requests.
pub trait Dispatch {
    fn dispatch(&mut self, ticket: Ticket, request: Request);

    /// Next finished response, if any. Never blocks.
    fn poll(&mut self) -> Option<Response>;
}

/// Runs one request to completion on the calling thread.
pub fn execute(backend: &dyn VaultBackend, request: Request) -> Result<Completion, Failure> {
    let context = request.failure_context();
    let result = match request {
        Request::Unlock { mut password } => {
            let result = backend.unlock(&password).map(Completion::Unlocked);
            password.zeroize();
            result
        }
        Request::ListEntries { session, filter } => {
            backend.list_entries(&session, &filter).map(|entries| {
                let folders = backend.list_folders(&session).unwrap_or_else(|err| {
                    tracing::warn!("Folder lookup failed, showing entries without folders: {err}");
                    Vec::new()
                });
                Completion::Listed { entries, folders }
            })
        }
        Request::FetchEntry { session, id } => {
            backend.fetch_entry(&session, &id).map(Completion::Fetched)
        }
        Request::Sync { session } => backend.sync(&session).map(|()| Completion::Synced),
        Request::CreateEntry { session, draft } => backend
            .create_entry(&session, &draft)
            .map(|()| Completion::Created { name: draft.name }),
    };
    result.map_err(|err| {
        tracing::warn!("{context}: {err}");
        Failure::from_backend(context, &err)
    })
}

/// [`execute`], turning a panicking backend into a failure so every request
/// still gets exactly one response.
fn execute_guarded(backend: &dyn VaultBackend, request: Request) -> Result<Completion, Failure> {
    let context = request.failure_context();
    panic::catch_unwind(AssertUnwindSafe(|| execute(backend, request))).unwrap_or_else(|_| {
        tracing::error!("{context}: backend panicked");
        Err(Failure::new(format!("{context}: internal error")))
    })
}

type Job = (Ticket, Request);

/// Background executor for backend requests.
pub struct Dispatcher {
    sender: tokio_mpsc::UnboundedSender<Job>,
    receiver: mpsc::Receiver<Response>,
    /// Failures answered locally because the worker is gone.
    undelivered: VecDeque<Response>,
}

impl Dispatcher {
    /// Spawn the worker thread with its tokio runtime.
    pub fn spawn(backend: Arc<dyn VaultBackend>) -> std::io::Result<Self> {
        let (job_tx, mut job_rx) = tokio_mpsc::unbounded_channel::<Job>();
        let (result_tx, result_rx) = mpsc::channel::<Response>();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("bwtui-dispatch".into())
            .spawn(move || {
                runtime.block_on(async move {
                    while let Some((ticket, request)) = job_rx.recv().await {
                        let backend = Arc::clone(&backend);
                        let result_tx = result_tx.clone();
                        tokio::task::spawn_blocking(move || {
                            let outcome = execute_guarded(backend.as_ref(), request);
                            // The UI dropped the receiver; nobody is listening.
                            let _ = result_tx.send(Response { ticket, outcome });
                        });
                    }
                });
            })?;

        Ok(Self {
            sender: job_tx,
            receiver: result_rx,
            undelivered: VecDeque::new(),
        })
    }
}

impl Dispatch for Dispatcher {
    fn dispatch(&mut self, ticket: Ticket, request: Request) {
        tracing::debug!(ticket = ticket.id, epoch = ticket.epoch, ?request, "Dispatching");
        if let Err(tokio_mpsc::error::SendError((ticket, request))) =
            self.sender.send((ticket, request))
        {
            tracing::warn!("Dispatch worker stopped, failing {} request", request.kind());
            let failure = Failure::new(format!(
                "{}: background worker stopped",
                request.failure_context()
            ));
            self.undelivered.push_back(Response {
                ticket,
                outcome: Err(failure),
            });
        }
    }

    fn poll(&mut self) -> Option<Response> {
        self.undelivered
            .pop_front()
            .or_else(|| self.receiver.try_recv().ok())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// In-memory backend with a fixed master password.
    #[derive(Default)]
    pub(crate) struct FakeBackend {
        pub entries: Vec<VaultEntry>,
        pub folders_fail: bool,
        pub calls: Mutex<Vec<&'static str>>,
    }

    impl FakeBackend {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl VaultBackend for FakeBackend {
        fn unlock(&self, password: &str) -> Result<Session, BackendError> {
            self.record("unlock");
            if password == "correct horse" {
                Ok(Session::new("session-token").unwrap())
            } else {
                Err(BackendError::Command("Invalid master password.".into()))
            }
        }

        fn list_entries(
            &self,
            _session: &Session,
            _filter: &ListFilter,
        ) -> Result<Vec<VaultEntry>, BackendError> {
            self.record("list");
            Ok(self.entries.clone())
        }

        fn list_folders(&self, _session: &Session) -> Result<Vec<Folder>, BackendError> {
            self.record("folders");
            if self.folders_fail {
                Err(BackendError::Command("folders unavailable".into()))
            } else {
                Ok(vec![Folder {
                    id: Some("f-1".into()),
                    name: "Work".into(),
                }])
            }
        }

        fn fetch_entry(&self, _session: &Session, id: &str) -> Result<VaultEntry, BackendError> {
            self.record("fetch");
            self.entries
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .ok_or_else(|| BackendError::Command(format!("Not found: {id}")))
        }

        fn sync(&self, _session: &Session) -> Result<(), BackendError> {
            self.record("sync");
            Ok(())
        }

        fn create_entry(&self, _session: &Session, _draft: &VaultEntry) -> Result<(), BackendError> {
            self.record("create");
            Ok(())
        }
    }

    fn session() -> Session {
        Session::new("session-token").unwrap()
    }

    /// Backend whose every call panics.
    struct PanickingBackend;

    impl VaultBackend for PanickingBackend {
        fn unlock(&self, _password: &str) -> Result<Session, BackendError> {
            panic!("unlock exploded")
        }

        fn list_entries(
            &self,
            _session: &Session,
            _filter: &ListFilter,
        ) -> Result<Vec<VaultEntry>, BackendError> {
            panic!("list exploded")
        }

        fn list_folders(&self, _session: &Session) -> Result<Vec<Folder>, BackendError> {
            panic!("folders exploded")
        }

        fn fetch_entry(&self, _session: &Session, _id: &str) -> Result<VaultEntry, BackendError> {
            panic!("fetch exploded")
        }

        fn sync(&self, _session: &Session) -> Result<(), BackendError> {
            panic!("sync exploded")
        }

        fn create_entry(&self, _session: &Session, _draft: &VaultEntry) -> Result<(), BackendError> {
            panic!("create exploded")
        }
    }

    fn wait_for(dispatcher: &mut Dispatcher, count: usize) -> Vec<Response> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut responses = Vec::new();
        while responses.len() < count && Instant::now() < deadline {
            match dispatcher.poll() {
                Some(response) => responses.push(response),
                None => thread::sleep(Duration::from_millis(5)),
            }
        }
        responses.sort_by_key(|r| r.ticket.id);
        responses
    }

    #[test]
    fn test_wrong_password_becomes_failure() {
        let backend = FakeBackend::default();
        let err = execute(
            &backend,
            Request::Unlock {
                password: "nope".into(),
            },
        )
        .unwrap_err();
        assert_eq!(err.message, "Unlock failed: Invalid master password.");
    }

    #[test]
    fn test_folder_failure_degrades_to_no_folders() {
        let backend = FakeBackend {
            entries: vec![VaultEntry::new_login("a")],
            folders_fail: true,
            ..FakeBackend::default()
        };
        let completion = execute(
            &backend,
            Request::ListEntries {
                session: session(),
                filter: ListFilter::default(),
            },
        )
        .unwrap();
        match completion {
            Completion::Listed { entries, folders } => {
                assert_eq!(entries.len(), 1);
                assert!(folders.is_empty());
            }
            other => panic!("unexpected completion: {other:?}"),
        }
        assert_eq!(*backend.calls.lock().unwrap(), vec!["list", "folders"]);
    }

    #[test]
    fn test_create_reports_name() {
        let backend = FakeBackend::default();
        let completion = execute(
            &backend,
            Request::CreateEntry {
                session: session(),
                draft: VaultEntry::new_login("Forum"),
            },
        )
        .unwrap();
        assert!(matches!(completion, Completion::Created { ref name } if name == "Forum"));
    }

    #[test]
    fn test_request_debug_hides_password() {
        let request = Request::Unlock {
            password: "hunter2".into(),
        };
        assert!(!format!("{request:?}").contains("hunter2"));
    }

    #[test]
    fn test_dispatcher_answers_every_request() {
        let backend = Arc::new(FakeBackend {
            entries: vec![VaultEntry::new_login("a")],
            ..FakeBackend::default()
        });
        let mut dispatcher = Dispatcher::spawn(backend).unwrap();
        dispatcher.dispatch(
            Ticket { id: 1, epoch: 0 },
            Request::Unlock {
                password: "correct horse".into(),
            },
        );
        dispatcher.dispatch(Ticket { id: 2, epoch: 0 }, Request::Sync { session: session() });

        let responses = wait_for(&mut dispatcher, 2);
        assert_eq!(responses.len(), 2);
        assert!(matches!(responses[0].outcome, Ok(Completion::Unlocked(_))));
        assert!(matches!(responses[1].outcome, Ok(Completion::Synced)));
    }

    #[test]
    fn test_backend_panic_still_answers() {
        let mut dispatcher = Dispatcher::spawn(Arc::new(PanickingBackend)).unwrap();
        dispatcher.dispatch(Ticket { id: 1, epoch: 3 }, Request::Sync { session: session() });
        dispatcher.dispatch(
            Ticket { id: 2, epoch: 3 },
            Request::FetchEntry {
                session: session(),
                id: "x".into(),
            },
        );

        let responses = wait_for(&mut dispatcher, 2);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].ticket, Ticket { id: 1, epoch: 3 });
        assert_eq!(
            responses[0].outcome.as_ref().unwrap_err().message,
            "Sync failed: internal error"
        );
        assert_eq!(
            responses[1].outcome.as_ref().unwrap_err().message,
            "Could not open entry: internal error"
        );
    }
}
