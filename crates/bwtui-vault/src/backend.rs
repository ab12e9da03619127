//! Vault backend: runs the `bw` CLI as a subprocess and decodes its JSON.
//!
//! Calls are blocking; the dispatcher moves them off the UI thread.

use std::ffi::OsStr;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use zeroize::Zeroize;

use crate::model::{Folder, ItemJson, ListFilter, Session, VaultEntry};

/// Child-only environment variable carrying the master password to `bw unlock`.
const PASSWORD_ENV: &str = "BWTUI_MASTER_PASSWORD";
const SESSION_ENV: &str = "BW_SESSION";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// Non-zero exit. Carries the CLI's own message.
    #[error("{0}")]
    Command(String),
    #[error("unexpected output from vault CLI: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("vault CLI returned an empty session key")]
    EmptySession,
    #[error("entry {0} is not a login")]
    NotLogin(String),
}

/// Operations the screens need from the vault. Implementations must be safe
/// to call from several worker threads at once.
pub trait VaultBackend: Send + Sync {
    fn unlock(&self, password: &str) -> Result<Session, BackendError>;

    /// Login entries only, in backend order.
    fn list_entries(
        &self,
        session: &Session,
        filter: &ListFilter,
    ) -> Result<Vec<VaultEntry>, BackendError>;

    fn list_folders(&self, session: &Session) -> Result<Vec<Folder>, BackendError>;

    fn fetch_entry(&self, session: &Session, id: &str) -> Result<VaultEntry, BackendError>;

    fn sync(&self, session: &Session) -> Result<(), BackendError>;

    fn create_entry(&self, session: &Session, draft: &VaultEntry) -> Result<(), BackendError>;
}

/// [`VaultBackend`] backed by the Bitwarden CLI.
#[derive(Debug, Clone)]
pub struct BwCli {
    program: PathBuf,
}

impl BwCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command<I, S>(&self, args: I, session: Option<&Session>) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .arg("--nointeraction")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(session) = session {
            cmd.env(SESSION_ENV, session.token());
        }
        cmd
    }

    /// Run to completion and return stdout, or the CLI's error message.
    fn run(&self, mut cmd: Command) -> Result<Vec<u8>, BackendError> {
        let output = cmd.output().map_err(|source| BackendError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;
        check_output(output)
    }
}

fn check_output(output: Output) -> Result<Vec<u8>, BackendError> {
    if output.status.success() {
        return Ok(output.stdout);
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let message = if stderr.is_empty() {
        format!("vault CLI exited with {}", output.status)
    } else {
        stderr
    };
    Err(BackendError::Command(message))
}

/// Decode `bw list items` output, dropping everything that is not a login.
pub(crate) fn decode_entries(stdout: &[u8]) -> Result<Vec<VaultEntry>, BackendError> {
    let items: Vec<ItemJson> = serde_json::from_slice(stdout)?;
    Ok(items.into_iter().filter_map(ItemJson::into_entry).collect())
}

pub(crate) fn decode_entry(stdout: &[u8], id: &str) -> Result<VaultEntry, BackendError> {
    let item: ItemJson = serde_json::from_slice(stdout)?;
    item.into_entry()
        .ok_or_else(|| BackendError::NotLogin(id.to_string()))
}

/// `bw create item` takes the item JSON base64-encoded.
pub(crate) fn encode_draft(draft: &VaultEntry) -> Result<String, BackendError> {
    let json = serde_json::to_vec(&ItemJson::from_draft(draft))?;
    Ok(STANDARD.encode(json))
}

impl VaultBackend for BwCli {
    fn unlock(&self, password: &str) -> Result<Session, BackendError> {
        let mut cmd = self.command(["unlock", "--raw", "--passwordenv", PASSWORD_ENV], None);
        cmd.env(PASSWORD_ENV, password);
        let mut stdout = self.run(cmd)?;
        let token = String::from_utf8_lossy(&stdout).into_owned();
        stdout.zeroize();
        Session::new(token).ok_or(BackendError::EmptySession)
    }

    fn list_entries(
        &self,
        session: &Session,
        filter: &ListFilter,
    ) -> Result<Vec<VaultEntry>, BackendError> {
        let mut args = vec!["list", "items"];
        if !filter.search.is_empty() {
            args.extend(["--search", filter.search.as_str()]);
        }
        if !filter.url.is_empty() {
            args.extend(["--url", filter.url.as_str()]);
        }
        let stdout = self.run(self.command(args, Some(session)))?;
        let entries = decode_entries(&stdout)?;
        tracing::debug!(count = entries.len(), "Listed vault entries");
        Ok(entries)
    }

    fn list_folders(&self, session: &Session) -> Result<Vec<Folder>, BackendError> {
        let stdout = self.run(self.command(["list", "folders"], Some(session)))?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    fn fetch_entry(&self, session: &Session, id: &str) -> Result<VaultEntry, BackendError> {
        let stdout = self.run(self.command(["get", "item", id], Some(session)))?;
        decode_entry(&stdout, id)
    }

    fn sync(&self, session: &Session) -> Result<(), BackendError> {
        self.run(self.command(["sync"], Some(session)))?;
        Ok(())
    }

    fn create_entry(&self, session: &Session, draft: &VaultEntry) -> Result<(), BackendError> {
        let encoded = encode_draft(draft)?;
        self.run(self.command(["create", "item", encoded.as_str()], Some(session)))?;
        tracing::info!(name = %draft.name, "Created vault entry");
        Ok(())
    }
}
