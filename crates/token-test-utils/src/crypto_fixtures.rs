//! Deterministic RSA fixtures for testing
//!
//! The `PKCS8_*` and `PKCS1_*` fixtures are one 2048-bit key in five
//! encodings, so all of them must derive [`REFERENCE_N`] and [`REFERENCE_E`].
//! The encrypted ones use [`PASSPHRASE`].
//!
//! Generating RSA keys in tests is slow, so nothing here generates.

use common::jwks::{Jwk, Jwks, KEY_TYPE_RSA, KEY_USE_SIGNATURE};
use common::jwt::JWT_ALGORITHM;

/// Passphrase for every encrypted fixture.
pub const PASSPHRASE: &str = "correct-horse";

/// Reference key, unencrypted PKCS#8 (`PRIVATE KEY`).
pub const PKCS8_PEM: &str = include_str!("../fixtures/rsa_pkcs8.pem");

/// Reference key, unencrypted PKCS#1 (`RSA PRIVATE KEY`).
pub const PKCS1_PEM: &str = include_str!("../fixtures/rsa_pkcs1.pem");

/// Reference key, PBES2 encrypted PKCS#8 (PBKDF2-SHA256, AES-256-CBC).
pub const PKCS8_ENCRYPTED_PEM: &str = include_str!("../fixtures/rsa_pkcs8_encrypted.pem");

/// Reference key, OpenSSL legacy encryption with AES-128-CBC.
pub const PKCS1_ENCRYPTED_AES128_PEM: &str =
    include_str!("../fixtures/rsa_pkcs1_encrypted_aes128.pem");

/// Reference key, OpenSSL legacy encryption with DES-EDE3-CBC.
pub const PKCS1_ENCRYPTED_DES3_PEM: &str =
    include_str!("../fixtures/rsa_pkcs1_encrypted_des3.pem");

/// A second, unrelated RSA key (PKCS#8).
pub const OTHER_PKCS8_PEM: &str = include_str!("../fixtures/rsa_other_pkcs8.pem");

/// A P-256 EC key (PKCS#8). Not usable for RS256.
pub const EC_PKCS8_PEM: &str = include_str!("../fixtures/ec_pkcs8.pem");

/// Modulus of the reference key, base64url without padding.
pub const REFERENCE_N: &str = "uiHDSo2W4Y8UQAMQglYvFynRbT7LLRCfxbqciF_602iqXaePXjWtjMql74-K82FIQPyXpDpdB9EWMQC2WoltM_4uXgqOD7z8bqEYsBO8UFhId3bub2thge-y-R6TYoBOCcbFYhrypnN1qNeSaBqCMQzc_GnIHJ54vSQkue4HGH35_0isQZ5vjnofEFWG9o7X3D-5DNGpT8KCCyA2QytEk2fzx2DioVeJ3VpVwuXWItdkzVM9D8lLIm-WkCm9ndZunZE4DiUSLZZVGD2I9ew_nzD2vtVtEXZm_V8n7P3usf7vXkt9GvCT-pl8YhYickMOUm8UrVbIeth9CpWX5Yu2nw";

/// Public exponent of the reference key (65537).
pub const REFERENCE_E: &str = "AQAB";

/// Modulus of the second key.
pub const OTHER_N: &str = "0nBzhvHqRBxss5ow4ae5pWsBNDXfjLm_gG09zFaQQQfAF14lLr9o3hKSKgwQFVVt9TujArkqTBHQ2VROUYeqXsDYH_zO88J831TNLL95OFlMRuD9EiTVYt--pIb7UcDYTsu1rbvSALrNGoAVvH4SaCh2pIxHn5jb0osRirXQUlzMtqnAnQbDxOZGaJd6w3lLj1tMCWlsBWjulCkBFRCjmcqoCV-NjH83D4-S1b6ZxAuUFK5GsRpxLtEDuXZQUs9fBkqQPGr30ZX-Ds-DVT_55yOQMo158KxnpUpMlqh0wLfEBOb2qiAk5poDC66rLi__T7vD7yU5KkA0KioGtbA6Qw";

/// Public exponent of the second key.
pub const OTHER_E: &str = "AQAB";

/// Absolute path of a file under `fixtures/`.
pub fn fixture_path(name: &str) -> String {
    format!("{}/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// An RS256 signing JWK with the given components.
pub fn rsa_jwk(kid: &str, n: &str, e: &str) -> Jwk {
    Jwk {
        kty: KEY_TYPE_RSA.to_string(),
        kid: kid.to_string(),
        n: Some(n.to_string()),
        e: Some(e.to_string()),
        alg: Some(JWT_ALGORITHM.to_string()),
        key_use: Some(KEY_USE_SIGNATURE.to_string()),
    }
}

/// Key set publishing the reference key under `kid`.
pub fn reference_jwks(kid: &str) -> Jwks {
    Jwks {
        keys: vec![rsa_jwk(kid, REFERENCE_N, REFERENCE_E)],
    }
}
