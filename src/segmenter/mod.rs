//! Text segmentation for breaking long content into bounded, overlapping chunks.
//!
//! Splits on the highest-priority separator first (paragraph, line, space),
//! falling back to raw character slicing, then merges undersized pieces
//! forward. Each emitted chunk after the first is prefixed with the trailing
//! overlap of the previous chunk, so stripping that prefix and concatenating
//! reconstructs the input exactly.

/// Recursive character segmenter.
#[derive(Debug, Clone)]
pub struct TextSegmenter {
    chunk_size: usize,
    overlap: usize,
    separators: Vec<String>,
}

impl TextSegmenter {
    /// Create a segmenter with the default separator ladder.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap,
            separators: vec!["\n\n".to_string(), "\n".to_string(), " ".to_string()],
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into ordered chunks.
    ///
    /// Sizes are counted in characters. Base pieces never exceed
    /// `chunk_size`; an emitted chunk may exceed it by up to `overlap`
    /// characters of carried prefix.
    pub fn segment(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let seps: Vec<&str> = self.separators.iter().map(|s| s.as_str()).collect();
        let pieces = split_pieces(text, self.chunk_size, &seps);

        let mut chunks: Vec<String> = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match chunks.last() {
                None => chunks.push(piece),
                Some(prev) => {
                    let mut chunk = tail_chars(prev, self.overlap).to_string();
                    chunk.push_str(&piece);
                    chunks.push(chunk);
                }
            }
        }
        chunks
    }

    /// Number of prefix characters carried into a chunk from `previous`.
    pub fn carried_prefix_len(&self, previous: &str) -> usize {
        self.overlap.min(previous.chars().count())
    }
}

/// Split into an exact ordered partition of `text`, each piece at most
/// `chunk_size` characters, preferring the highest-priority separator.
fn split_pieces(text: &str, chunk_size: usize, seps: &[&str]) -> Vec<String> {
    if text.chars().count() <= chunk_size {
        return vec![text.to_string()];
    }

    let Some((sep, rest)) = seps.split_first() else {
        return hard_slice(text, chunk_size);
    };

    let mut pieces = Vec::new();
    for part in text.split_inclusive(sep) {
        if part.chars().count() > chunk_size {
            pieces.extend(split_pieces(part, chunk_size, rest));
        } else {
            pieces.push(part.to_string());
        }
    }
    merge_forward(pieces, chunk_size)
}

/// Merge adjacent undersized pieces until the target size is reached.
fn merge_forward(pieces: Vec<String>, chunk_size: usize) -> Vec<String> {
    let mut merged = Vec::new();
    let mut acc = String::new();
    let mut acc_len = 0usize;

    for piece in pieces {
        let piece_len = piece.chars().count();
        if acc_len > 0 && acc_len + piece_len > chunk_size {
            merged.push(std::mem::take(&mut acc));
            acc_len = 0;
        }
        acc.push_str(&piece);
        acc_len += piece_len;
    }
    if !acc.is_empty() {
        merged.push(acc);
    }
    merged
}

/// Slice into runs of at most `chunk_size` characters, at char boundaries.
fn hard_slice(text: &str, chunk_size: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for ch in text.chars() {
        if count == chunk_size {
            out.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// The last `n` characters of `s` (whole string if shorter).
fn tail_chars(s: &str, n: usize) -> &str {
    let char_count = s.chars().count();
    if char_count <= n {
        return s;
    }
    let skip = char_count - n;
    match s.char_indices().nth(skip) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}
