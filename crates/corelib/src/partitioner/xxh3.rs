//! XXH3 partitioner (default).

use crate::partitioner::traits::Partitioner;
use crate::token::Token;
use xxhash_rust::xxh3::xxh3_64;

/// XXH3 partitioner using the low 32 bits of the 64-bit digest.
#[derive(Clone, Debug, Default)]
pub struct Xxh3Partitioner;

impl Partitioner for Xxh3Partitioner {
    fn position(&self, key: &[u8]) -> Token {
        Token(xxh3_64(key) as u32)
    }

    fn name(&self) -> &'static str {
        "Xxh3Partitioner"
    }
}
