use serde_derive::{Deserialize, Serialize};

/// Upper bound for the content of a note in bytes, enforced by the http
/// layer before the store ever sees it.
pub const MAX_NOTE_SIZE: usize = 5_242_880;

/// A persisted note. `password` holds the credential bytes produced by the
/// credential guard, never a plaintext password.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub content: String,
    #[serde(rename = "canDelete")]
    pub can_delete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
    pub password: Option<Vec<u8>>,
}

/// Credential bytes are stored as a standard base64 string.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|text| STANDARD.decode(text).map_err(D::Error::custom))
            .transpose()
    }
}

impl Note {
    pub fn is_protected(&self) -> bool {
        self.password.is_some()
    }

    pub fn to_record(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_record(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let mut note: Note = serde_json::from_slice(bytes)?;
        // an empty credential protects nothing
        if note.password.as_ref().map_or(false, |p| p.is_empty()) {
            note.password = None;
        }
        Ok(note)
    }
}

/// What a requester gets to see of a note. `content` is only present when the
/// note is unprotected or was unlocked for this request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NoteView {
    pub id: String,
    pub can_delete: bool,
    pub password_protected: bool,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NoteView {
    pub fn locked(note: Note) -> Self {
        NoteView {
            id: note.id,
            can_delete: note.can_delete,
            password_protected: true,
            locked: true,
            content: None,
        }
    }

    pub fn unlocked(note: Note) -> Self {
        NoteView {
            password_protected: note.is_protected(),
            id: note.id,
            can_delete: note.can_delete,
            locked: false,
            content: Some(note.content),
        }
    }
}
