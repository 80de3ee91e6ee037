/// One entry in a buffer's append-only edit log.
///
/// All three fields are measured in buffer code units (bytes).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EditEntry {
    pub offset: usize,
    pub deleted_len: usize,
    pub inserted_len: usize,
}

impl EditEntry {
    pub fn new(offset: usize, deleted_len: usize, inserted_len: usize) -> Self {
        EditEntry {
            offset,
            deleted_len,
            inserted_len,
        }
    }

    pub fn deleted_end(&self) -> usize {
        self.offset + self.deleted_len
    }
}
