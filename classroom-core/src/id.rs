//! Opaque identifier generation.

use crate::error::IdError;

/// Number of random bytes behind every generated id.
pub const ID_BYTES: usize = 16;

/// Produces statistically-unique opaque identifiers.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> Result<String, IdError>;
}

/// Reads [`ID_BYTES`] from the OS entropy source and hex-encodes them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&self) -> Result<String, IdError> {
        let mut bytes = [0u8; ID_BYTES];
        getrandom::getrandom(&mut bytes).map_err(|e| IdError(e.to_string()))?;
        Ok(hex::encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_lowercase_hex_of_fixed_width() {
        let id = RandomIdSource.next_id().expect("id");
        assert_eq!(id.len(), ID_BYTES * 2);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn ids_do_not_repeat() {
        let ids: HashSet<String> = (0..1_000)
            .map(|_| RandomIdSource.next_id().expect("id"))
            .collect();
        assert_eq!(ids.len(), 1_000);
    }
}
