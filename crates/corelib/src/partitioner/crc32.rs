//! CRC-32 partitioner.

use crate::partitioner::traits::Partitioner;
use crate::token::Token;

/// CRC-32/IEEE partitioner.
///
/// Linear checksum with adequate spread for small rings. Keeps ring
/// positions compatible with splitters that hash with a plain IEEE checksum.
#[derive(Clone, Debug, Default)]
pub struct Crc32Partitioner;

impl Partitioner for Crc32Partitioner {
    fn position(&self, key: &[u8]) -> Token {
        Token(crc32fast::hash(key))
    }

    fn name(&self) -> &'static str {
        "Crc32Partitioner"
    }
}
