use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::middleware::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenType {
    Login,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub auth: String,
    pub exp: usize,
    pub iat: usize,
    pub r#type: TokenType,
}

pub struct JWT {
    key_enc: EncodingKey,
    key_dec: DecodingKey,
    duration: TimeDelta,
}

impl JWT {
    pub fn new(secret: String, duration: TimeDelta) -> Self {
        Self {
            duration,
            key_enc: EncodingKey::from_secret(secret.as_ref()),
            key_dec: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn create_by_login(&self, user_id: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            auth: user_id.to_string(),
            exp: (now + self.duration).timestamp() as usize,
            iat: now.timestamp() as usize,
            r#type: TokenType::Login,
        };
        Ok(encode(&Header::default(), &claims, &self.key_enc)?)
    }

    pub fn decode_by_type(&self, token: &str, expected: TokenType) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.key_dec, &Validation::new(Algorithm::HS256))?;
        if data.claims.r#type != expected {
            return Err(AppError::AuthFailJwtInvalid {
                source: "unexpected token type".to_string(),
            });
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_token_round_trips() {
        let jwt = JWT::new("secret".to_string(), TimeDelta::days(1));
        let token = jwt.create_by_login("local_user:abc").unwrap();
        let claims = jwt.decode_by_type(&token, TokenType::Login).unwrap();
        assert_eq!(claims.auth, "local_user:abc");
    }

    #[test]
    fn garbage_token_is_rejected() {
        let jwt = JWT::new("secret".to_string(), TimeDelta::days(1));
        assert!(jwt.decode_by_type("not.a.jwt", TokenType::Login).is_err());
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let signer = JWT::new("one".to_string(), TimeDelta::days(1));
        let verifier = JWT::new("two".to_string(), TimeDelta::days(1));
        let token = signer.create_by_login("local_user:abc").unwrap();
        assert!(verifier.decode_by_type(&token, TokenType::Login).is_err());
    }
}
