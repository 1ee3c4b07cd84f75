use rand_core::{OsRng, RngCore};

/// URL-safe alphabet. 64 symbols, so masking a random byte with `0x3f`
/// selects uniformly.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Minimum length of a public drop id.
pub const MIN_ID_LENGTH: usize = 8;

/// Minimum length of a delete token.
pub const MIN_DELETE_TOKEN_LENGTH: usize = 16;

/// Source of unguessable drop identifiers.
pub trait TokenGenerator: Send + Sync {
    /// Generate a short public id.
    fn new_id(&self) -> String;

    /// Generate a long delete token.
    fn new_delete_token(&self) -> String;
}

/// [`TokenGenerator`] drawing from the operating system CSPRNG.
#[derive(Debug, Clone)]
pub struct RandomTokenGenerator {
    id_length: usize,
    delete_token_length: usize,
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self {
            id_length: MIN_ID_LENGTH,
            delete_token_length: MIN_DELETE_TOKEN_LENGTH,
        }
    }
}

impl RandomTokenGenerator {
    /// Create a generator with the default lengths (8 and 16).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator with custom lengths.
    ///
    /// Lengths below the minimums are raised to the minimums.
    pub fn with_lengths(id_length: usize, delete_token_length: usize) -> Self {
        Self {
            id_length: id_length.max(MIN_ID_LENGTH),
            delete_token_length: delete_token_length.max(MIN_DELETE_TOKEN_LENGTH),
        }
    }

    fn random_string(len: usize) -> String {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        bytes
            .into_iter()
            .map(|b| char::from(ALPHABET[usize::from(b & 0x3f)]))
            .collect()
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn new_id(&self) -> String {
        Self::random_string(self.id_length)
    }

    fn new_delete_token(&self) -> String {
        Self::random_string(self.delete_token_length)
    }
}
