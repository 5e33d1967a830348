//! Dialogue sequences loaded from TOML.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use phasewalk_core::{DialogueId, DialogueLine, DialogueStore};
use serde::Deserialize;

/// In-memory [`DialogueStore`] keyed by sequence id.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct DialogueBook {
    sequences: HashMap<DialogueId, Vec<DialogueLine>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BookFile {
    #[serde(default, rename = "sequence")]
    sequences: Vec<SequenceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SequenceEntry {
    id: DialogueId,
    lines: Vec<DialogueLine>,
}

impl DialogueBook {
    /// Reads and parses the dialogue book at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read dialogues at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse dialogues at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let file: BookFile = toml::from_str(contents).context("invalid dialogue toml")?;
        let mut sequences = HashMap::new();
        for SequenceEntry { id, lines } in file.sequences {
            if lines.is_empty() {
                bail!("dialogue {} has no lines", id.get());
            }
            if sequences.insert(id, lines).is_some() {
                bail!("dialogue {} is defined twice", id.get());
            }
        }
        Ok(Self { sequences })
    }

    /// Number of sequences in the book.
    pub(crate) fn len(&self) -> usize {
        self.sequences.len()
    }
}

impl DialogueStore for DialogueBook {
    fn sequence(&self, id: DialogueId) -> Option<&[DialogueLine]> {
        self.sequences.get(&id).map(Vec::as_slice)
    }
}
