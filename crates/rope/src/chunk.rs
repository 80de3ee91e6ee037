use arrayvec::ArrayString;

/// Chunks are allowed to grow to twice the target size during construction
/// before the builder forces a split (spec: "no chunk exceeds a target size
/// except briefly during construction").
pub(crate) const MAX_CHUNK_SIZE: usize = crate::TARGET_CHUNK_SIZE * 2;

/// A contiguous, immutable run of text inside a [`crate::Rope`].
///
/// Backed by a fixed-capacity inline string so that chunks never allocate on
/// the heap individually; a rope is just a `Vec` of these.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Chunk {
    text: ArrayString<MAX_CHUNK_SIZE>,
    newlines: usize,
}

impl Chunk {
    pub(crate) fn new(text: &str) -> Self {
        debug_assert!(text.len() <= MAX_CHUNK_SIZE);
        let mut array = ArrayString::new();
        array
            .try_push_str(text)
            .expect("chunk text exceeds MAX_CHUNK_SIZE");
        Chunk {
            newlines: array.bytes().filter(|&b| b == b'\n').count(),
            text: array,
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn len(&self) -> usize {
        self.text.len()
    }

    pub(crate) fn newlines(&self) -> usize {
        self.newlines
    }
}
