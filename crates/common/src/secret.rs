use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix that turns a note key into the key of its attachment.
pub const FILE_KEY_PREFIX: &str = "file_";

const UNNAMED_FILE: &str = "unnamed";

/// Opaque identifier a secret is shared by.
///
/// Backed by a random (v4) UUID, rendered hyphenated, so it is unguessable
///  and can be dropped into a URL path segment as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretId(Uuid);

impl SecretId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Store key of the note body
    pub fn note_key(&self) -> String {
        self.to_string()
    }

    /// Store key of the attachment that belongs to this note
    pub fn file_key(&self) -> String {
        format!("{}{}", FILE_KEY_PREFIX, self)
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for SecretId {
    type Err = SecretIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SecretIdError::Malformed(s.to_string()))
    }
}

impl From<Uuid> for SecretId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SecretIdError {
    #[error("malformed secret id: {0}")]
    Malformed(String),
}

/// Discriminant of a [`Secret`], used to check what a key holds
///  before acting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    Note,
    File,
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretKind::Note => write!(f, "note"),
            SecretKind::File => write!(f, "file"),
        }
    }
}

/// The text body of a shared secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub text: Vec<u8>,
    /// Whether a [`File`] was stored alongside under the attachment key
    pub has_attachment: bool,
    pub destructive: bool,
}

impl Note {
    pub fn new(text: impl Into<Vec<u8>>, has_attachment: bool, destructive: bool) -> Self {
        Self {
            text: text.into(),
            has_attachment,
            destructive,
        }
    }

    /// Text for display. Invalid UTF-8 is replaced rather than rejected.
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }
}

/// The single attachment a note may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub content: Vec<u8>,
    pub filename: String,
    pub destructive: bool,
}

impl File {
    /// Build an attachment, reducing `filename` to something safe to
    ///  hand back in a `Content-Disposition` header.
    pub fn new(content: impl Into<Vec<u8>>, filename: &str, destructive: bool) -> Self {
        Self {
            content: content.into(),
            filename: sanitize_filename(filename),
            destructive,
        }
    }
}

/// Everything that can sit under a key in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Secret {
    Note(Note),
    File(File),
}

impl Secret {
    /// A destructive secret may be read at most once.
    pub fn is_destructive(&self) -> bool {
        match self {
            Secret::Note(note) => note.destructive,
            Secret::File(file) => file.destructive,
        }
    }

    pub fn kind(&self) -> SecretKind {
        match self {
            Secret::Note(_) => SecretKind::Note,
            Secret::File(_) => SecretKind::File,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SecretCodecError> {
        bincode::serialize(self).map_err(|e| SecretCodecError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SecretCodecError> {
        bincode::deserialize(bytes).map_err(|e| SecretCodecError::Decode(e.to_string()))
    }

    pub fn into_note(self) -> Option<Note> {
        match self {
            Secret::Note(note) => Some(note),
            Secret::File(_) => None,
        }
    }

    pub fn into_file(self) -> Option<File> {
        match self {
            Secret::File(file) => Some(file),
            Secret::Note(_) => None,
        }
    }
}

impl From<Note> for Secret {
    fn from(note: Note) -> Self {
        Secret::Note(note)
    }
}

impl From<File> for Secret {
    fn from(file: File) -> Self {
        Secret::File(file)
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SecretCodecError {
    #[error("failed to encode secret: {0}")]
    Encode(String),
    #[error("failed to decode secret: {0}")]
    Decode(String),
}

fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    let cleaned = cleaned.trim();

    match cleaned {
        "" | "." | ".." => UNNAMED_FILE.to_string(),
        name => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_secret_id_parse_display() {
        let id = SecretId::generate();
        let parsed: SecretId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_eq!(id.note_key(), id.to_string());
        assert_eq!(id.file_key(), format!("file_{}", id));
    }

    #[test]
    fn test_secret_id_is_url_safe() {
        let id = SecretId::generate().to_string();
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn test_secret_id_rejects_garbage() {
        assert!("not-a-key".parse::<SecretId>().is_err());
        assert!(format!("file_{}", SecretId::generate())
            .parse::<SecretId>()
            .is_err());
    }

    #[test]
    fn test_secret_ids_do_not_collide() {
        let ids: HashSet<SecretId> = (0..100_000).map(|_| SecretId::generate()).collect();
        assert_eq!(ids.len(), 100_000);
    }

    #[test]
    fn test_destructive_flag() {
        assert!(Secret::from(Note::new("x", false, true)).is_destructive());
        assert!(!Secret::from(Note::new("x", false, false)).is_destructive());
        assert!(Secret::from(File::new(vec![1], "a.bin", true)).is_destructive());
        assert!(!Secret::from(File::new(vec![1], "a.bin", false)).is_destructive());
    }

    #[test]
    fn test_codec_keeps_empty_payloads() {
        let note = Secret::from(Note::new(Vec::new(), false, false));
        assert_eq!(Secret::decode(&note.encode().unwrap()).unwrap(), note);

        let file = Secret::from(File::new(Vec::new(), "empty.txt", true));
        let decoded = Secret::decode(&file.encode().unwrap()).unwrap();
        assert_eq!(decoded.kind(), SecretKind::File);
        assert_eq!(decoded, file);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(Secret::decode(&[0xff, 0xff, 0xff, 0xff, 0x01]).is_err());
        assert!(Secret::decode(&[]).is_err());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\notes.txt"), "notes.txt");
        assert_eq!(sanitize_filename("evil\"\r\nname.txt"), "evilname.txt");
        assert_eq!(sanitize_filename(""), "unnamed");
        assert_eq!(sanitize_filename("dir/"), "unnamed");
        assert_eq!(sanitize_filename(".."), "unnamed");
    }

    #[test]
    fn test_text_lossy() {
        let note = Note::new(vec![b'h', b'i', 0xff], false, false);
        assert_eq!(note.text_lossy(), "hi\u{fffd}");
    }
}
