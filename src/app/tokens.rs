use anyhow::{anyhow, Result};
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::{local, version4::V4, Local};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

const ISSUER: &str = "acebook";

/// Longest accepted token lifetime: one year.
pub const MAX_TTL_MINUTES: u64 = 60 * 24 * 365;

/// Why a presented token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidToken {
    /// Not a v4.local token, or a required claim is missing or unparseable.
    Malformed,
    /// Decryption or issuer/audience validation failed.
    Rejected,
    Expired,
}

impl fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => f.write_str("malformed token"),
            Self::Rejected => f.write_str("token rejected"),
            Self::Expired => f.write_str("token expired"),
        }
    }
}

impl std::error::Error for InvalidToken {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: Uuid,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Issues and verifies the single bearer credential used by the API.
///
/// Tokens are PASETO v4.local. Timestamps are kept at nanosecond precision so
/// a rotated token can always carry an issued-at strictly after the one it
/// replaces.
#[derive(Clone)]
pub struct TokenCodec {
    key: [u8; 32],
    ttl: Duration,
}

impl TokenCodec {
    /// `ttl_minutes` is capped at [`MAX_TTL_MINUTES`].
    pub fn new(key: [u8; 32], ttl_minutes: u64) -> Self {
        Self {
            key,
            ttl: Duration::minutes(ttl_minutes.min(MAX_TTL_MINUTES) as i64),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: Uuid) -> Result<IssuedToken> {
        self.issue_at(subject, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, subject: Uuid, issued_at: OffsetDateTime) -> Result<IssuedToken> {
        let expires_at = issued_at
            .checked_add(self.ttl)
            .ok_or_else(|| anyhow!("token expiry out of range"))?;
        let issued = issued_at.format(&Rfc3339)?;

        let mut claims = Claims::new()?;
        claims.issuer(ISSUER)?;
        claims.audience(ISSUER)?;
        claims.subject(&subject.to_string())?;
        claims.issued_at(&issued)?;
        claims.not_before(&issued)?;
        claims.expiration(&expires_at.format(&Rfc3339)?)?;

        let key = SymmetricKey::<V4>::from(&self.key)?;
        let token = local::encrypt(&key, &claims, None, None)?;

        Ok(IssuedToken {
            token,
            claims: TokenClaims {
                subject,
                issued_at,
                expires_at,
            },
        })
    }

    /// Re-issues for the same subject with an issued-at later than the
    /// presented one, even if the local clock has not moved past it.
    pub fn rotate(&self, presented: &TokenClaims) -> Result<IssuedToken> {
        let floor = presented
            .issued_at
            .checked_add(Duration::nanoseconds(1))
            .ok_or_else(|| anyhow!("token issued-at out of range"))?;
        let issued_at = OffsetDateTime::now_utc().max(floor);
        self.issue_at(presented.subject, issued_at)
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, InvalidToken> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<TokenClaims, InvalidToken> {
        let key = SymmetricKey::<V4>::from(&self.key).map_err(|_| InvalidToken::Rejected)?;

        // Expiry is checked below against `now` instead of the wall clock.
        let mut rules = ClaimsValidationRules::new();
        rules.validate_issuer_with(ISSUER);
        rules.validate_audience_with(ISSUER);
        rules.disable_valid_at();

        let untrusted =
            UntrustedToken::<Local, V4>::try_from(token).map_err(|_| InvalidToken::Malformed)?;
        let trusted = local::decrypt(&key, &untrusted, &rules, None, None)
            .map_err(|_| InvalidToken::Rejected)?;
        let claims = trusted.payload_claims().ok_or(InvalidToken::Malformed)?;

        let subject = claim_str(claims, "sub")
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or(InvalidToken::Malformed)?;
        let issued_at = claim_time(claims, "iat")?;
        let expires_at = claim_time(claims, "exp")?;

        if expires_at <= now {
            return Err(InvalidToken::Expired);
        }

        Ok(TokenClaims {
            subject,
            issued_at,
            expires_at,
        })
    }
}

fn claim_str<'a>(claims: &'a Claims, name: &str) -> Option<&'a str> {
    claims.get_claim(name).and_then(|value| value.as_str())
}

fn claim_time(claims: &Claims, name: &str) -> Result<OffsetDateTime, InvalidToken> {
    claim_str(claims, name)
        .and_then(|value| OffsetDateTime::parse(value, &Rfc3339).ok())
        .ok_or(InvalidToken::Malformed)
}
