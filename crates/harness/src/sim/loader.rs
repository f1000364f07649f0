//! VMH Image Loader.
//!
//! This module turns VMH memory images into memory-init records. It performs:
//! 1. **Header check:** The first token must be the `@0` address marker; nothing else is parsed otherwise.
//! 2. **Word parsing:** Every following whitespace-separated token is one 32-bit hex word. `//` starts a line comment.
//! 3. **Packing:** Words fill sixteen-slot records in file order; each full record becomes a `Load` at the next record address.
//! 4. **Termination:** A word count that is not a multiple of sixteen is rejected; otherwise a single `Done` closes the sequence.
//!
//! [`encode_vmh`] writes the inverse format, sixteen words per line.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::common::constants::{VMH_COMMENT, VMH_HEADER};
use crate::common::{FormatError, LoadError, WORDS_PER_RECORD};
use crate::soc::messages::{MemInit, WideRecord};

/// Accumulates words into wide records and numbers them.
#[derive(Debug, Default)]
struct RecordPacker {
    buf: WideRecord,
    len: usize,
    address: u32,
    out: Vec<MemInit>,
}

impl RecordPacker {
    fn push(&mut self, word: u32) {
        self.buf[self.len] = word;
        self.len += 1;
        if self.len == WORDS_PER_RECORD {
            self.out.push(MemInit::Load {
                address: self.address,
                data: self.buf,
            });
            self.address += 1;
            self.len = 0;
        }
    }

    fn finish(mut self) -> Result<Vec<MemInit>, FormatError> {
        if self.len != 0 {
            return Err(FormatError::Unaligned { leftover: self.len });
        }
        self.out.push(MemInit::Done);
        Ok(self.out)
    }
}

fn strip_comment(line: &str) -> &str {
    line.split_once(VMH_COMMENT).map_or(line, |(code, _)| code)
}

/// Parses one hex word. Signs and `0x` prefixes are not VMH.
fn parse_word(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(token, 16).ok()
}

/// Parses VMH text into memory-init records.
///
/// On success the result holds one `Load` per sixteen words, with addresses `0, 1, 2, …`,
/// followed by exactly one `Done`.
///
/// # Errors
///
/// * [`FormatError::MissingHeader`] if the first token is not `@0` (checked before any word).
/// * [`FormatError::InvalidWord`] for a token that is not a 32-bit hex word.
/// * [`FormatError::Unaligned`] if 1 to 15 words are left over at the end.
///
/// # Examples
///
/// ```
/// use testdriver_core::sim::loader::parse_vmh;
/// use testdriver_core::soc::MemInit;
///
/// let text = format!("@0\n{}\n", (0..16).map(|i| format!("{i:08x}")).collect::<Vec<_>>().join(" "));
/// let records = parse_vmh(&text).unwrap();
/// assert_eq!(records.len(), 2);
/// assert!(matches!(records[0], MemInit::Load { address: 0, data } if data[15] == 15));
/// assert_eq!(records[1], MemInit::Done);
/// ```
pub fn parse_vmh(text: &str) -> Result<Vec<MemInit>, FormatError> {
    let mut tokens = text.lines().enumerate().flat_map(|(idx, line)| {
        strip_comment(line)
            .split_whitespace()
            .map(move |token| (idx + 1, token))
    });

    match tokens.next() {
        Some((_, VMH_HEADER)) => {}
        _ => return Err(FormatError::MissingHeader),
    }

    let mut packer = RecordPacker::default();
    for (line, token) in tokens {
        let word = parse_word(token).ok_or_else(|| FormatError::InvalidWord {
            line,
            token: token.to_owned(),
        })?;
        packer.push(word);
    }
    packer.finish()
}

/// Reads and parses the VMH image at `path`.
///
/// # Errors
///
/// [`LoadError::Io`] if the file cannot be read, [`LoadError::Format`] if it is not a
/// valid image. No records are returned on either path.
pub fn load_vmh(path: impl AsRef<Path>) -> Result<Vec<MemInit>, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_vmh(&text).map_err(|source| LoadError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        image = %path.display(),
        records = records.len() - 1,
        "parsed VMH image"
    );
    Ok(records)
}

/// Writes `words` as VMH text: the `@0` header, then sixteen 8-digit words per line.
///
/// A word count that is not a multiple of sixteen produces a short last line, which
/// [`parse_vmh`] will reject as unaligned.
pub fn encode_vmh(words: &[u32]) -> String {
    let mut text = String::with_capacity(VMH_HEADER.len() + 1 + words.len() * 9);
    text.push_str(VMH_HEADER);
    text.push('\n');
    for chunk in words.chunks(WORDS_PER_RECORD) {
        let line: Vec<String> = chunk.iter().map(|word| format!("{word:08x}")).collect();
        text.push_str(&line.join(" "));
        text.push('\n');
    }
    text
}

/// Flattens `Load` records back into their words, in address order as given.
pub fn record_words(records: &[MemInit]) -> Vec<u32> {
    records
        .iter()
        .filter_map(|record| match record {
            MemInit::Load { data, .. } => Some(data.iter().copied()),
            MemInit::Done => None,
        })
        .flatten()
        .collect()
}
