//! CSRF token minting and tag verification.
//!
//! Tokens are `csrf_<nanoid>.<hmac-tag>`. The tag lets the gate reject forged
//! tokens in constant time before touching the store; single-use semantics
//! live in the store (the token is removed on first successful validation).

use hmac::{Hmac, Mac};
use nanoid::nanoid;
use sha2::Sha256;

pub const CSRF_PREFIX: &str = "csrf_";

pub fn mint_token(secret: &str) -> String {
    let body = format!("{}{}", CSRF_PREFIX, nanoid!(24));
    let tag = sign(secret, &body);
    format!("{}.{}", body, tag)
}

fn sign(secret: &str, body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts any key length");
    mac.update(body.as_bytes());
    format!("{:x}", mac.finalize().into_bytes())
}

/// Check that the token carries a valid tag for this secret. Constant-time
/// comparison on the tag.
pub fn verify_tag(secret: &str, token: &str) -> bool {
    let Some((body, tag)) = token.split_once('.') else {
        return false;
    };
    if !body.starts_with(CSRF_PREFIX) {
        return false;
    }
    let expected = sign(secret, body);
    subtle::ConstantTimeEq::ct_eq(expected.as_bytes(), tag.as_bytes()).into()
}
