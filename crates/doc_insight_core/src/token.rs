//! crates/doc_insight_core/src/token.rs
//!
//! Random opaque identifiers for session tokens and order references,
//! plus the retry-until-unique draw loop used when minting them.

use std::future::Future;

use rand::Rng;

use crate::ports::{PortError, PortResult};

/// The 62-symbol alphabet tokens are drawn from.
const TOKEN_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a session token.
pub const SESSION_TOKEN_LEN: usize = 50;

/// Length of a payment order reference.
pub const ORDER_REFERENCE_LEN: usize = 30;

/// Collisions are astronomically unlikely at the lengths above, so hitting
/// this cap means the existence check itself is broken.
const MAX_UNIQUE_ATTEMPTS: usize = 20;

/// Draws a random alphanumeric token of the given length.
pub fn generate_token(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Draws tokens from `generate` until `exists` reports one as unused,
/// giving up after a bounded number of attempts.
///
/// Both the generator and the existence check are injected so the loop can
/// be exercised against a fake store.
pub async fn unique_token<G, E, Fut>(mut generate: G, exists: E) -> PortResult<String>
where
    G: FnMut() -> String,
    E: Fn(String) -> Fut,
    Fut: Future<Output = PortResult<bool>>,
{
    for _ in 0..MAX_UNIQUE_ATTEMPTS {
        let candidate = generate();
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
    }
    Err(PortError::Unexpected(format!(
        "could not find an unused token in {} attempts",
        MAX_UNIQUE_ATTEMPTS
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn generated_tokens_have_requested_length_and_alphabet() {
        for len in [1, 30, 50] {
            let token = generate_token(len);
            assert_eq!(token.len(), len);
            assert!(token.bytes().all(|b| TOKEN_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn generated_tokens_differ() {
        // Not a real uniqueness guarantee, but two identical 50-char draws
        // would indicate a broken generator.
        assert_ne!(generate_token(50), generate_token(50));
    }

    #[tokio::test]
    async fn returns_first_unused_token() {
        let checks = AtomicUsize::new(0);
        let token = unique_token(
            || "abc123".to_string(),
            |_| {
                checks.fetch_add(1, Ordering::SeqCst);
                async { Ok(false) }
            },
        )
        .await
        .unwrap();
        assert_eq!(token, "abc123");
        assert_eq!(checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_an_unused_token_appears() {
        let mut counter = 0;
        let token = unique_token(
            move || {
                counter += 1;
                format!("token-{}", counter)
            },
            |candidate| async move { Ok(candidate != "token-3") },
        )
        .await
        .unwrap();
        assert_eq!(token, "token-3");
    }

    #[tokio::test]
    async fn gives_up_after_the_attempt_cap() {
        let checks = AtomicUsize::new(0);
        let result = unique_token(
            || "collision".to_string(),
            |_| {
                checks.fetch_add(1, Ordering::SeqCst);
                async { Ok(true) }
            },
        )
        .await;
        assert!(matches!(result, Err(PortError::Unexpected(_))));
        assert_eq!(checks.load(Ordering::SeqCst), MAX_UNIQUE_ATTEMPTS);
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let result = unique_token(
            || "abc".to_string(),
            |_| async { Err(PortError::Unexpected("store down".to_string())) },
        )
        .await;
        assert!(matches!(result, Err(PortError::Unexpected(_))));
    }
}
