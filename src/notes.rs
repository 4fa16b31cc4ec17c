//! Persistence for the one note the user is currently working on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// Average reading speed used for the "min read" estimate.
pub const READ_WORDS_PER_MINUTE: usize = 200;

pub trait NoteStore {
    /// The saved note; an empty string when nothing was saved yet.
    fn load(&self) -> io::Result<String>;
    /// Persist `text` with surrounding whitespace trimmed.
    fn save(&self, text: &str) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileNoteStore {
    path: PathBuf,
}

impl FileNoteStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::note_path().unwrap_or_else(|| PathBuf::from("typenotes_note.txt")),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteStore for FileNoteStore {
    fn load(&self) -> io::Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    fn save(&self, text: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteStats {
    pub words: usize,
    pub read_minutes: usize,
}

pub fn note_stats(text: &str) -> NoteStats {
    let words = text.split_whitespace().count();
    NoteStats {
        words,
        read_minutes: words.div_ceil(READ_WORDS_PER_MINUTE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_note_loads_empty() {
        let dir = tempdir().unwrap();
        let store = FileNoteStore::with_path(dir.path().join("note.txt"));
        assert_eq!(store.load().unwrap(), "");
    }

    #[test]
    fn save_trims_and_roundtrips() {
        let dir = tempdir().unwrap();
        let store = FileNoteStore::with_path(dir.path().join("sub").join("note.txt"));
        store.save("  first line\nsecond line \n\n").unwrap();
        assert_eq!(store.load().unwrap(), "first line\nsecond line");
    }

    #[test]
    fn save_overwrites_previous_note() {
        let dir = tempdir().unwrap();
        let store = FileNoteStore::with_path(dir.path().join("note.txt"));
        store.save("old").unwrap();
        store.save("new").unwrap();
        assert_eq!(store.load().unwrap(), "new");
    }

    #[test]
    fn stats_count_words_and_read_time() {
        assert_eq!(
            note_stats(""),
            NoteStats {
                words: 0,
                read_minutes: 0
            }
        );
        assert_eq!(note_stats("one  two\nthree\t four").words, 4);
        assert_eq!(note_stats("one two").read_minutes, 1);
        assert_eq!(note_stats(&"word ".repeat(200)).read_minutes, 1);
        assert_eq!(note_stats(&"word ".repeat(201)).read_minutes, 2);
    }
}
