use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub exp: i64,
}

impl UserClaims {
    pub fn for_user(user_id: uuid::Uuid, ttl: chrono::Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            exp: (chrono::Utc::now() + ttl).timestamp(),
        }
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: UserClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, &claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<UserClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<UserClaims>(token, &key, &validation)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn token_roundtrip_keeps_subject() {
        let id = uuid::Uuid::new_v4();
        let token = generate_token(UserClaims::for_user(id, chrono::Duration::days(1)), "k").unwrap();
        let data = process_token(&token, "k").unwrap();
        assert_eq!(data.claims.sub, id.to_string());
    }

    #[test]
    fn wrong_key_and_expired_tokens_are_rejected() {
        let id = uuid::Uuid::new_v4();
        let token = generate_token(UserClaims::for_user(id, chrono::Duration::days(1)), "k").unwrap();
        assert!(process_token(&token, "other").is_err());

        let stale = generate_token(UserClaims::for_user(id, -chrono::Duration::days(1)), "k").unwrap();
        assert!(process_token(&stale, "k").is_err());
    }
}
