use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    role: Option<String>,
}

/// Best-effort peek at the role claim embedded in the bearer token.
///
/// The signature is NOT verified and expiry is ignored: this value only
/// seeds the provisional first-paint decision, the server remains the
/// authority. A malformed token reads as no role.
pub fn peek_role(token: &str) -> Option<String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let decoded =
        decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    decoded.claims.role.filter(|role| !role.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        role: String,
        exp: usize,
    }

    fn make_token(role: &str, exp: usize) -> String {
        let claims = TestClaims {
            sub: String::from("user-1"),
            role: String::from(role),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-signing-key"),
        )
        .unwrap()
    }

    #[test]
    fn test_peek_role() {
        let token = make_token("Artist/Manager", 4102444800);
        assert_eq!(peek_role(&token).unwrap(), "Artist/Manager");
    }

    #[test]
    fn test_peek_role_expired_token() {
        // Expiry does not matter for the provisional peek
        let token = make_token("distributor", 1);
        assert_eq!(peek_role(&token).unwrap(), "distributor");
    }

    #[test]
    fn test_peek_role_garbage() {
        assert_eq!(peek_role("not-a-jwt"), None);
        assert_eq!(peek_role(""), None);
    }

    #[test]
    fn test_peek_role_missing_claim() {
        #[derive(Serialize)]
        struct NoRole {
            sub: String,
            exp: usize,
        }
        let token = encode(
            &Header::default(),
            &NoRole {
                sub: String::from("user-1"),
                exp: 4102444800,
            },
            &EncodingKey::from_secret(b"test-signing-key"),
        )
        .unwrap();
        assert_eq!(peek_role(&token), None);
    }
}
