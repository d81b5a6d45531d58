//! Token Codec Tests
//!
//! Covers issue/verify round trips, expiry, tampering, and rotation.

use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

use acebook::app::tokens::{InvalidToken, TokenClaims, TokenCodec, MAX_TTL_MINUTES};

const KEY: [u8; 32] = *b"0123456789abcdef0123456789abcdef";

fn codec() -> TokenCodec {
    TokenCodec::new(KEY, 10)
}

#[test]
fn verify_returns_subject_before_expiry() {
    let codec = codec();
    let subject = Uuid::new_v4();
    let issued_at = OffsetDateTime::now_utc();

    let issued = codec.issue_at(subject, issued_at).unwrap();
    let claims = codec
        .verify_at(&issued.token, issued_at + Duration::minutes(9))
        .unwrap();

    assert_eq!(claims.subject, subject);
    assert_eq!(claims.issued_at, issued_at);
    assert_eq!(claims.expires_at, issued_at + codec.ttl());
    assert_eq!(claims, issued.claims);
}

#[test]
fn verify_fails_after_expiry() {
    let codec = codec();
    let issued_at = OffsetDateTime::now_utc();
    let issued = codec.issue_at(Uuid::new_v4(), issued_at).unwrap();

    let at_expiry = codec.verify_at(&issued.token, issued_at + codec.ttl());
    let after_expiry = codec.verify_at(&issued.token, issued_at + Duration::minutes(11));

    assert_eq!(at_expiry, Err(InvalidToken::Expired));
    assert_eq!(after_expiry, Err(InvalidToken::Expired));
}

#[test]
fn verify_against_wall_clock() {
    let codec = codec();
    let subject = Uuid::new_v4();

    let issued = codec.issue(subject).unwrap();

    assert_eq!(codec.verify(&issued.token).unwrap().subject, subject);
}

#[test]
fn verify_rejects_garbage() {
    let codec = codec();

    assert_eq!(codec.verify("not a token"), Err(InvalidToken::Malformed));
    assert!(codec.verify("").is_err());
}

#[test]
fn verify_rejects_tampered_token() {
    let codec = codec();
    let token = codec.issue(Uuid::new_v4()).unwrap().token;

    // Flip one character in the encrypted payload.
    let mut bytes = token.into_bytes();
    let index = bytes.len() / 2;
    bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap();

    assert!(codec.verify(&tampered).is_err());
}

#[test]
fn verify_rejects_other_key() {
    let other = TokenCodec::new(*b"fedcba9876543210fedcba9876543210", 10);
    let token = other.issue(Uuid::new_v4()).unwrap().token;

    assert_eq!(codec().verify(&token), Err(InvalidToken::Rejected));
}

#[test]
fn rotate_moves_issued_at_forward() {
    let codec = codec();
    let subject = Uuid::new_v4();
    let presented = codec
        .issue_at(subject, OffsetDateTime::now_utc() - Duration::minutes(5))
        .unwrap();

    let rotated = codec.rotate(&presented.claims).unwrap();

    assert_eq!(rotated.claims.subject, subject);
    assert!(rotated.claims.issued_at > presented.claims.issued_at);
    assert!(rotated.claims.expires_at > presented.claims.expires_at);
    assert_eq!(codec.verify(&rotated.token).unwrap(), rotated.claims);
}

#[test]
fn rotate_is_strictly_later_even_for_future_issued_at() {
    let codec = codec();
    let future = OffsetDateTime::now_utc() + Duration::seconds(30);
    let presented = codec.issue_at(Uuid::new_v4(), future).unwrap();

    let rotated = codec.rotate(&presented.claims).unwrap();

    assert_eq!(
        rotated.claims.issued_at,
        presented.claims.issued_at + Duration::nanoseconds(1)
    );
}

#[test]
fn issue_at_end_of_calendar_is_an_error() {
    let codec = codec();
    let last = PrimitiveDateTime::MAX.assume_utc();

    assert!(codec.issue_at(Uuid::new_v4(), last).is_err());
}

#[test]
fn rotate_at_end_of_calendar_is_an_error() {
    let codec = codec();
    let last = PrimitiveDateTime::MAX.assume_utc();
    let presented = TokenClaims {
        subject: Uuid::new_v4(),
        issued_at: last,
        expires_at: last,
    };

    assert!(codec.rotate(&presented).is_err());
}

#[test]
fn ttl_is_capped() {
    let codec = TokenCodec::new(KEY, u64::MAX);

    assert_eq!(codec.ttl(), Duration::minutes(MAX_TTL_MINUTES as i64));
    assert!(codec.issue(Uuid::new_v4()).is_ok());
}
