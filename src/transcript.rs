//! The shared conversation history: tagged text lines and image artifacts.

/// One transcript entry. Text entries carry their origin tag inline
/// (`USER: ...` / `SYSTEM: ...`); image entries are JPEG bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Text(String),
    Image(Vec<u8>),
}

impl Entry {
    /// Whether this is a user-tagged text line.
    pub fn is_user(&self) -> bool {
        matches!(self, Entry::Text(text) if text.starts_with("USER:"))
    }
}

/// Append-only within a run, owned and mutated exclusively by the
/// conversation loop. Never persisted.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: &str) {
        self.entries.push(Entry::Text(format!("USER: {text}")));
    }

    pub fn push_system(&mut self, text: &str) {
        self.entries.push(Entry::Text(format!("SYSTEM: {text}")));
    }

    pub fn push_image(&mut self, jpeg: Vec<u8>) {
        self.entries.push(Entry::Image(jpeg));
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
