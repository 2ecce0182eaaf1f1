//! JWT Token Service
//!
//! Stateless HS256 access tokens:
//! - Issued at login, valid for the configured lifetime (24h by default)
//! - Never revoked server-side; validity is signature plus time window
//! - Algorithm pinned to HS256 before any signature work
//!
//! Time checks run against a caller-supplied `now` with zero leeway, so the
//! expiry boundary is exact to the second.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use clinic_types::Role;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::types::{IssuedToken, TokenClaims};

/// The only algorithm accepted by the validator
const PINNED_ALGORITHM: Algorithm = Algorithm::HS256;
const PINNED_ALGORITHM_NAME: &str = "HS256";

/// JWT service for token issuance and validation
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("token_lifetime", &self.config.token_lifetime)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Create a new JWT service. Fails when the signing secret is empty.
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        if config.secret.is_empty() {
            return Err(AuthError::SigningError(
                "signing secret is not configured".to_string(),
            ));
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(PINNED_ALGORITHM);
        // Time window is checked by hand against the caller's clock
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf", "sub", "iss", "aud"]);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Configured token lifetime
    pub fn token_lifetime(&self) -> std::time::Duration {
        self.config.token_lifetime
    }

    /// Issue a token for `username` / `role`, valid from `now` for the
    /// configured lifetime.
    pub fn issue(&self, username: &str, role: Role, now: DateTime<Utc>) -> AuthResult<IssuedToken> {
        let lifetime = Duration::from_std(self.config.token_lifetime)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let exp = now + lifetime;

        let claims = TokenClaims {
            sub: username.to_string(),
            role,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(&Header::new(PINNED_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningError(e.to_string()))?;

        Ok(IssuedToken::new(token, claims.exp))
    }

    /// Issue a token valid from the current wall-clock time
    pub fn issue_now(&self, username: &str, role: Role) -> AuthResult<IssuedToken> {
        self.issue(username, role, Utc::now())
    }

    /// Validate a token at time `now` and return its claims.
    ///
    /// The embedded identity is trusted as-is; the user directory is not
    /// consulted.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> AuthResult<TokenClaims> {
        check_header_algorithm(token)?;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?.claims;

        let now = now.timestamp();
        if now > claims.exp {
            return Err(AuthError::Expired);
        }
        if now < claims.nbf {
            return Err(AuthError::NotYetValid);
        }

        Ok(claims)
    }

    /// Validate a token against the current wall-clock time
    pub fn validate_now(&self, token: &str) -> AuthResult<TokenClaims> {
        self.validate(token, Utc::now())
    }
}

/// Reject anything whose header does not declare exactly HS256.
///
/// Runs before signature verification so `none` and other HMAC widths are
/// reported as signature failures rather than parse errors.
fn check_header_algorithm(token: &str) -> AuthResult<()> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::Malformed);
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|_| AuthError::Malformed)?;
    let header: serde_json::Value =
        serde_json::from_slice(&header_bytes).map_err(|_| AuthError::Malformed)?;

    match header.get("alg").and_then(|alg| alg.as_str()) {
        Some(PINNED_ALGORITHM_NAME) => Ok(()),
        Some(_) => Err(AuthError::InvalidSignature),
        None => Err(AuthError::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-jwt-tokens-min-32-bytes!".to_string(),
            token_lifetime: std::time::Duration::from_secs(24 * 60 * 60),
            issuer: "test-issuer".to_string(),
            audience: "test-audience".to_string(),
        }
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn encode_segment(value: &serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    #[test]
    fn test_empty_secret_is_signing_error() {
        let mut config = test_config();
        config.secret = String::new();
        let err = JwtService::new(config).unwrap_err();
        assert!(matches!(err, AuthError::SigningError(_)));
    }

    #[test]
    fn test_issue_and_validate() {
        let service = JwtService::new(test_config()).unwrap();
        let t = issued_at();

        let issued = service.issue("alice", Role::Doctor, t).unwrap();
        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_at, t.timestamp() + 86_400);

        let claims = service.validate(&issued.token, t).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::Doctor);
        assert_eq!(claims.iat, t.timestamp());
        assert_eq!(claims.nbf, t.timestamp());
        assert_eq!(claims.exp, t.timestamp() + 86_400);
    }

    #[test]
    fn test_expiry_boundary() {
        let service = JwtService::new(test_config()).unwrap();
        let t = issued_at();
        let token = service.issue("alice", Role::Doctor, t).unwrap().token;

        let almost = t + Duration::hours(23) + Duration::minutes(59);
        assert!(service.validate(&token, almost).is_ok());

        let boundary = t + Duration::hours(24);
        assert!(service.validate(&token, boundary).is_ok());

        let after = boundary + Duration::seconds(1);
        assert!(matches!(
            service.validate(&token, after),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_not_yet_valid() {
        let service = JwtService::new(test_config()).unwrap();
        let t = issued_at();
        let token = service.issue("alice", Role::Doctor, t).unwrap().token;

        let before = t - Duration::seconds(1);
        assert!(matches!(
            service.validate(&token, before),
            Err(AuthError::NotYetValid)
        ));
    }

    #[test]
    fn test_wrong_secret_fails_signature() {
        let issuer = JwtService::new(test_config()).unwrap();
        let mut other = test_config();
        other.secret = "a-completely-different-secret".to_string();
        let validator = JwtService::new(other).unwrap();

        let t = issued_at();
        let token = issuer.issue("alice", Role::Doctor, t).unwrap().token;
        assert!(matches!(
            validator.validate(&token, t),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_payload_fails_signature() {
        let service = JwtService::new(test_config()).unwrap();
        let t = issued_at();
        let token = service.issue("alice", Role::Receptionist, t).unwrap().token;
        let parts: Vec<&str> = token.split('.').collect();

        let forged_claims = serde_json::json!({
            "sub": "alice",
            "role": "doctor",
            "iat": t.timestamp(),
            "nbf": t.timestamp(),
            "exp": t.timestamp() + 86_400,
            "iss": "test-issuer",
            "aud": "test-audience",
        });
        let forged = format!("{}.{}.{}", parts[0], encode_segment(&forged_claims), parts[2]);

        assert!(matches!(
            service.validate(&forged, t),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_none_algorithm_rejected() {
        let service = JwtService::new(test_config()).unwrap();
        let t = issued_at();
        let token = service.issue("alice", Role::Doctor, t).unwrap().token;
        let payload = token.split('.').nth(1).unwrap();

        let header = encode_segment(&serde_json::json!({"alg": "none", "typ": "JWT"}));
        let unsigned = format!("{}.{}.", header, payload);

        assert!(matches!(
            service.validate(&unsigned, t),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_other_hmac_width_rejected() {
        let config = test_config();
        let service = JwtService::new(config.clone()).unwrap();
        let t = issued_at();

        let claims = TokenClaims {
            sub: "alice".to_string(),
            role: Role::Doctor,
            iat: t.timestamp(),
            nbf: t.timestamp(),
            exp: t.timestamp() + 60,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate(&token, t),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_malformed_tokens() {
        let service = JwtService::new(test_config()).unwrap();
        let t = issued_at();

        for token in ["", "invalid-token", "a.b", "a.b.c.d", "!!!.e30.sig"] {
            assert!(
                matches!(service.validate(token, t), Err(AuthError::Malformed)),
                "expected Malformed for {:?}",
                token
            );
        }
    }

    #[test]
    fn test_wrong_audience_is_malformed() {
        let issuer = JwtService::new(test_config()).unwrap();
        let mut other = test_config();
        other.audience = "billing-api".to_string();
        let validator = JwtService::new(other).unwrap();

        let t = issued_at();
        let token = issuer.issue("alice", Role::Doctor, t).unwrap().token;
        assert!(matches!(
            validator.validate(&token, t),
            Err(AuthError::Malformed)
        ));
    }

    #[test]
    fn test_validate_now_accepts_fresh_token() {
        let service = JwtService::new(test_config()).unwrap();
        let issued = service.issue_now("bob", Role::Receptionist).unwrap();
        let claims = service.validate_now(&issued.token).unwrap();
        assert_eq!(claims.identity().username, "bob");
    }
}
