use crate::consts::policy::{TOKEN_ISSUER, TOKEN_TTL_HOURS};
use crate::errors::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use rand::{Rng, distr::Alphanumeric};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: String,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
}

impl Claims {
    /// Fresh claims for a principal, with a random token id for the
    /// revocation list.
    pub fn new(principal_id: String) -> Self {
        let iat = Utc::now();
        let exp = iat + Duration::hours(TOKEN_TTL_HOURS);
        let jti = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect::<String>();
        Self {
            sub: principal_id,
            jti,
            exp: exp.timestamp() as usize,
            iat: iat.timestamp() as usize,
            iss: TOKEN_ISSUER.to_string(),
        }
    }
}

pub fn encode_jwt(claims: &Claims, secret: &str) -> Result<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn decode_jwt(token: &str, secret: &str) -> Result<TokenData<Claims>> {
    let token = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let claims = Claims::new("users:abc".to_string());
        let token = encode_jwt(&claims, "test-secret").expect("Failed to encode token");

        let decoded = decode_jwt(&token, "test-secret").expect("Failed to decode token");
        assert_eq!(decoded.claims.sub, "users:abc");
        assert_eq!(decoded.claims.jti, claims.jti);
        assert_eq!(decoded.claims.iss, TOKEN_ISSUER);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims::new("users:abc".to_string());
        let token = encode_jwt(&claims, "test-secret").expect("Failed to encode token");

        assert!(decode_jwt(&token, "other-secret").is_err());
    }

    #[test]
    fn test_jti_is_unique() {
        let a = Claims::new("users:abc".to_string());
        let b = Claims::new("users:abc".to_string());
        assert_ne!(a.jti, b.jti);
    }
}
