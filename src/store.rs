use std::sync::Arc;

use crate::{errors::NoteError, models::note::Note};

pub mod backend;
pub mod credential;
pub mod identity;

use backend::Backend;
use credential::{CredentialError, CredentialGuard};
use identity::IdGenerator;

/// How many id candidates `create` tries before giving up.
pub const MAX_ID_ATTEMPTS: u32 = 50;

/// Creates, reads, unlocks and deletes notes. Holds no state of its own, all
/// notes live in the injected backend.
#[derive(Clone)]
pub struct NoteStore {
    backend: Arc<dyn Backend>,
    guard: CredentialGuard,
    ids: IdGenerator,
    max_attempts: u32,
}

impl NoteStore {
    pub fn new(backend: Arc<dyn Backend>, guard: CredentialGuard) -> Self {
        NoteStore {
            backend,
            guard,
            ids: IdGenerator::default(),
            max_attempts: MAX_ID_ATTEMPTS,
        }
    }

    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    /// Stores a new note under a freshly claimed id. An empty `password` is
    /// treated as no password.
    pub fn create(
        &self,
        content: &str,
        password: Option<&str>,
        allow_deletion: bool,
    ) -> Result<Note, NoteError> {
        if content.is_empty() {
            return Err(NoteError::Validation("Note content cannot be empty."));
        }

        let password = match password.filter(|p| !p.is_empty()) {
            Some(plaintext) => Some(
                self.guard
                    .hash(plaintext)
                    .map_err(NoteError::CreationFailed)?,
            ),
            None => None,
        };

        let mut note = Note {
            id: String::new(),
            content: content.to_owned(),
            can_delete: allow_deletion,
            password,
        };

        for attempt in 1..=self.max_attempts {
            note.id = self.ids.generate();
            let bytes = note.to_record().map_err(|e| {
                log::error!("failed to encode note {}: {e}", note.id);
                NoteError::PersistenceFailure
            })?;

            if self.backend.put_if_absent(&note.id, &bytes)? {
                log::info!(
                    "created note {} (protected: {}, deletable: {})",
                    note.id,
                    note.is_protected(),
                    note.can_delete
                );
                return Ok(note);
            }
            log::debug!("note id {} is taken, attempt {attempt}", note.id);
        }

        log::error!(
            "gave up finding a free note id after {} attempts",
            self.max_attempts
        );
        Err(NoteError::IdentifierSpaceExhausted)
    }

    /// Returns the note and whether it is locked. A locked note comes back
    /// with its content blanked out.
    pub fn fetch(&self, note_id: &str) -> Result<(Note, bool), NoteError> {
        let mut note = self.load(note_id)?;
        let locked = note.is_protected();
        if locked {
            note.content = String::new();
        }
        Ok((note, locked))
    }

    /// Returns the full note when `password` matches. Unprotected notes are
    /// returned as they are.
    pub fn unlock(&self, note_id: &str, password: &str) -> Result<Note, NoteError> {
        let note = self.load(note_id)?;

        if let Some(credential) = &note.password {
            if !self.password_matches(&note.id, credential, password) {
                return Err(NoteError::Unauthorized);
            }
        }
        Ok(note)
    }

    /// `confirmation` is the password for protected notes and the note id
    /// itself for unprotected ones.
    pub fn delete(&self, note_id: &str, confirmation: &str) -> Result<(), NoteError> {
        let note = self.load(note_id)?;

        match &note.password {
            Some(credential) => {
                if !self.password_matches(&note.id, credential, confirmation) {
                    return Err(NoteError::Unauthorized);
                }
            }
            None => {
                if confirmation != note.id {
                    return Err(NoteError::ConfirmationMismatch {
                        expected: note.id,
                        actual: confirmation.to_owned(),
                    });
                }
            }
        }

        if !note.can_delete {
            return Err(NoteError::DeletionForbidden);
        }

        self.backend.delete(&note.id)?;
        log::info!("deleted note {}", note.id);
        Ok(())
    }

    fn load(&self, note_id: &str) -> Result<Note, NoteError> {
        let bytes = self
            .backend
            .get(note_id)?
            .ok_or_else(|| NoteError::NotFound(note_id.to_owned()))?;

        let note = Note::from_record(&bytes).map_err(|e| {
            log::error!("note {note_id} could not be decoded: {e}");
            NoteError::CorruptRecord(note_id.to_owned())
        })?;

        if note.id != note_id {
            log::error!("note stored under {note_id} claims id {}", note.id);
            return Err(NoteError::CorruptRecord(note_id.to_owned()));
        }
        Ok(note)
    }

    fn password_matches(&self, note_id: &str, credential: &[u8], attempt: &str) -> bool {
        match self.guard.verify(credential, attempt) {
            Ok(true) => true,
            Ok(false) => {
                log::warn!("password does not match the password of note {note_id}");
                false
            }
            Err(CredentialError::MalformedCredential) => {
                log::warn!("note {note_id} has a malformed credential");
                false
            }
            Err(e) => {
                log::error!("could not verify password of note {note_id}: {e}");
                false
            }
        }
    }
}
