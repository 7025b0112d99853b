use crate::error::{Result, ServiceError};
use rand::distributions::Uniform;
use rand::Rng;

/// Random lowercase identifiers for videos and session tokens.
///
/// Candidates are checked against the caller's key set and regenerated on
/// collision, up to `max_attempts` tries.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    alphabet: Uniform<u8>,
    max_attempts: usize,
}

impl IdGenerator {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            alphabet: Uniform::new_inclusive(b'a', b'z'),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn next_string(&self, length: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| char::from(rng.sample(self.alphabet)))
            .collect()
    }

    /// Generate a string of `length` for which `is_taken` returns false.
    pub fn next_unique<F>(&self, length: usize, is_taken: F) -> Result<String>
    where
        F: Fn(&str) -> bool,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = self.next_string(length);
            if !is_taken(&candidate) {
                return Ok(candidate);
            }
            tracing::debug!(attempt, length, "generated id collided, retrying");
        }

        Err(ServiceError::Internal(format!(
            "no free id of length {} after {} attempts",
            length, self.max_attempts
        )))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(64)
    }
}
