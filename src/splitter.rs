//! Batch splitter: partitions the ordered input into fixed-size chunks.

use crate::types::InputItem;

/// A contiguous slice of the submission, batched into one service call.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// 0-based chunk position.
    pub number: usize,
    /// Global index of the first item; offset `j` maps to `base_index + j`.
    pub base_index: usize,
    pub items: Vec<InputItem>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Global index of the item at chunk-local `offset`.
    pub fn global_index(&self, offset: usize) -> usize {
        self.base_index + offset
    }
}

/// Split `items` into ordered chunks of at most `chunk_size`.
///
/// Covers the whole list with no gaps or overlaps; empty input yields
/// zero chunks. `chunk_size` must be validated non-zero by the caller
/// (see `PipelineConfig::validate`).
pub fn split_into_chunks(items: Vec<InputItem>, chunk_size: usize) -> Vec<Chunk> {
    debug_assert!(chunk_size > 0);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(chunk_size.max(1)));
    let mut iter = items.into_iter().peekable();
    let mut number = 0;
    let mut base_index = 0;
    while iter.peek().is_some() {
        let batch: Vec<InputItem> = iter.by_ref().take(chunk_size).collect();
        let len = batch.len();
        chunks.push(Chunk {
            number,
            base_index,
            items: batch,
        });
        number += 1;
        base_index += len;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<InputItem> {
        (0..n)
            .map(|i| InputItem::new(format!("payload-{}", i), "image/jpeg", format!("img-{}.jpg", i)))
            .collect()
    }

    #[test]
    fn empty_input_yields_zero_chunks() {
        assert!(split_into_chunks(Vec::new(), 20).is_empty());
    }

    #[test]
    fn chunk_count_is_ceiling_of_division() {
        assert_eq!(split_into_chunks(items(45), 20).len(), 3);
        assert_eq!(split_into_chunks(items(40), 20).len(), 2);
        assert_eq!(split_into_chunks(items(1), 20).len(), 1);
    }

    #[test]
    fn last_chunk_holds_the_remainder() {
        let chunks = split_into_chunks(items(45), 20);
        assert_eq!(chunks[0].len(), 20);
        assert_eq!(chunks[1].len(), 20);
        assert_eq!(chunks[2].len(), 5);

        let exact = split_into_chunks(items(40), 20);
        assert_eq!(exact[1].len(), 20);
    }

    #[test]
    fn base_indices_are_dense_with_no_gaps() {
        let chunks = split_into_chunks(items(45), 20);
        assert_eq!(chunks[0].base_index, 0);
        assert_eq!(chunks[1].base_index, 20);
        assert_eq!(chunks[2].base_index, 40);
        assert_eq!(chunks[2].global_index(4), 44);
    }

    #[test]
    fn concatenation_reproduces_the_original_list() {
        let original = items(33);
        let chunks = split_into_chunks(original.clone(), 7);
        let rebuilt: Vec<InputItem> = chunks.into_iter().flat_map(|c| c.items).collect();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn chunk_numbers_are_sequential() {
        let chunks = split_into_chunks(items(50), 20);
        let numbers: Vec<usize> = chunks.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
    }
}
