//! JWT token validation and decoding.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use saveserve_core::config::auth::AuthConfig;
use saveserve_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Validates and decodes JWTs issued by [`super::encoder::JwtEncoder`].
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for signature verification.
    decoding_key: DecodingKey,
    /// Validation parameters (algorithm + expiry).
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder").finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate an access token.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode(token)?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::authentication("Expected an access token"));
        }
        Ok(claims)
    }

    /// Decode and validate a refresh token.
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode(token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AppError::authentication("Expected a refresh token"));
        }
        Ok(claims)
    }

    fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::authentication(format!("Invalid token: {e}")))
    }
}
