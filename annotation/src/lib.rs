//! Map protein accessions to human readable annotations
//!
//! # File format
//!
//! Dictionary files are tab delimited with two fields: the accession and the
//! annotation. Each protein appears on its own line and no header should be
//! present. Everything after the first tab belongs to the annotation.
//!
//! ```text
//! $ cat annotations.txt
//! ...
//! SPO0001	hypothetical protein
//! SPO0002	DNA gyrase subunit B	gyrB
//! ...
//! ```
//!
//! A dictionary can also be built from a UniProt FASTA file, see
//! [`fasta`].
//!
//! # Example
//!
//! ```rust,ignore
//! # use annotation::Dictionary;
//! let dict = match Dictionary::load("annotations.txt") {
//!     Ok(dict) => dict,
//!     Err(e) => panic!("Error loading annotation dictionary: {}", e),
//! };
//! assert_eq!(dict.annotate("not-there"), "Unknown");
//! ```

use memchr::{memchr_iter, Memchr};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, prelude::*};
use std::iter::FromIterator;
use std::path::Path;
use std::str;

pub mod fasta;

/// Annotation used for accessions that are not in the dictionary
pub const UNKNOWN: &str = "Unknown";

/// Generalized wrapper around [`Memchr`] iterator for splitting `&[u8]` slices
/// by a byte.
pub struct Pitchfork<'a> {
    pos: usize,
    haystack: &'a [u8],
    inner: Memchr<'a>,
}

impl<'a> Pitchfork<'a> {
    pub fn new(needle: u8, haystack: &'a [u8]) -> Self {
        Self {
            pos: 0,
            haystack,
            inner: memchr_iter(needle, haystack),
        }
    }
}

impl<'a> Iterator for Pitchfork<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let end = match self.inner.next() {
            Some(e) => e,
            None => {
                if self.pos < self.haystack.len() {
                    self.haystack.len()
                } else {
                    return None;
                }
            }
        };
        let slice = &self.haystack[self.pos..end];
        self.pos = end + 1;
        Some(slice)
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
/// Wraps a hashtable of accession -> annotation
pub struct Dictionary {
    inner: HashMap<String, String>,
}

impl Dictionary {
    /// Load a two-column tab file to build a [`Dictionary`]
    ///
    /// Lines without a tab are skipped, and later duplicates overwrite
    /// earlier ones.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Dictionary> {
        let mut buffer = Vec::new();
        File::open(path.as_ref())?.read_to_end(&mut buffer)?;

        let mut inner = HashMap::new();
        for (idx, line) in Pitchfork::new(b'\n', &buffer).enumerate() {
            let line = str::from_utf8(line)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
                .trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once('\t') {
                Some((acc, ann)) => {
                    inner.insert(acc.trim().to_string(), ann.trim().to_string());
                }
                None => {
                    tracing::warn!(
                        "{}:{}: no tab separator, skipping line",
                        path.as_ref().display(),
                        idx + 1
                    );
                }
            }
        }
        Ok(Dictionary { inner })
    }

    /// Build a dictionary from the headers of a UniProt FASTA file
    pub fn from_fasta<P: AsRef<Path>>(path: P) -> io::Result<Dictionary> {
        fasta::headers(path).map(|headers| headers.into_iter().collect())
    }

    /// Search the dictionary by accession
    pub fn lookup<T: AsRef<str>>(&self, acc: T) -> Option<&str> {
        self.inner.get(acc.as_ref()).map(|s| s as &str)
    }

    /// Annotation for `acc`, or [`UNKNOWN`]
    pub fn annotate<T: AsRef<str>>(&self, acc: T) -> &str {
        self.lookup(acc).unwrap_or(UNKNOWN)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<(String, String)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Dictionary {
            inner: iter.into_iter().collect(),
        }
    }
}
