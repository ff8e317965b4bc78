use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::AuthError;

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPurpose {
    PasswordReset,
    EmailVerification,
}

impl LinkPurpose {
    fn as_str(&self) -> &'static str {
        match self {
            LinkPurpose::PasswordReset => "reset",
            LinkPurpose::EmailVerification => "verify",
        }
    }

    pub fn lifetime(&self) -> Duration {
        match self {
            LinkPurpose::PasswordReset => Duration::hours(1),
            LinkPurpose::EmailVerification => Duration::hours(24),
        }
    }
}

/// What a verified link token vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkClaims {
    pub email: String,
    binding: String,
}

/// Signs the tokens embedded in password-reset and verification emails.
///
/// Token layout: `base64url(purpose:expiry:binding:email) . base64url(hmac)`.
/// `binding` is a keyed fingerprint of account state at issue time; a reset
/// link is bound to the password hash, so it stops verifying once used.
#[derive(Clone)]
pub struct LinkSigner {
    mac: HmacSha1,
}

impl LinkSigner {
    pub fn new(secret: &str) -> anyhow::Result<Self> {
        let mac = HmacSha1::new_from_slice(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid link signing key: {e}"))?;
        Ok(Self { mac })
    }

    pub fn sign(&self, purpose: LinkPurpose, email: &str, account_state: &str) -> String {
        let expires = (Utc::now() + purpose.lifetime()).timestamp();
        self.sign_with_expiry(purpose, email, account_state, expires)
    }

    fn sign_with_expiry(
        &self,
        purpose: LinkPurpose,
        email: &str,
        account_state: &str,
        expires: i64,
    ) -> String {
        let payload = format!(
            "{}:{}:{}:{}",
            purpose.as_str(),
            expires,
            self.fingerprint(account_state),
            email
        );
        let signature = self.mac(payload.as_bytes()).finalize().into_bytes();
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    /// Checks signature, purpose and expiry. Callers that bound the link to
    /// account state must also call [`LinkSigner::ensure_bound`].
    pub fn verify(&self, purpose: LinkPurpose, token: &str) -> Result<LinkClaims, AuthError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(AuthError::InvalidToken)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::InvalidToken)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::InvalidToken)?;

        self.mac(&payload)
            .verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let payload = String::from_utf8(payload).map_err(|_| AuthError::InvalidToken)?;
        let mut parts = payload.splitn(4, ':');
        let (Some(kind), Some(expires), Some(binding), Some(email)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken);
        };

        if kind != purpose.as_str() {
            return Err(AuthError::InvalidToken);
        }
        let expires: i64 = expires.parse().map_err(|_| AuthError::InvalidToken)?;
        if Utc::now().timestamp() > expires {
            return Err(AuthError::TokenExpired);
        }

        Ok(LinkClaims {
            email: email.to_string(),
            binding: binding.to_string(),
        })
    }

    /// Fails with [`AuthError::LinkUsed`] when the account changed since the link was issued.
    pub fn ensure_bound(&self, claims: &LinkClaims, account_state: &str) -> Result<(), AuthError> {
        if claims.binding == self.fingerprint(account_state) {
            Ok(())
        } else {
            Err(AuthError::LinkUsed)
        }
    }

    fn fingerprint(&self, account_state: &str) -> String {
        let mut mac = self.mac(b"binding:");
        mac.update(account_state.as_bytes());
        let digest = mac.finalize().into_bytes();
        URL_SAFE_NO_PAD.encode(&digest[..12])
    }

    fn mac(&self, data: &[u8]) -> HmacSha1 {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "$2b$04$abcdefghijklmnopqrstuu";

    #[test]
    fn test_sign_and_verify() {
        let signer = LinkSigner::new("secret").unwrap();
        let token = signer.sign(LinkPurpose::PasswordReset, "ana@example.com", HASH);
        let claims = signer.verify(LinkPurpose::PasswordReset, &token).unwrap();
        assert_eq!(claims.email, "ana@example.com");
        assert!(signer.ensure_bound(&claims, HASH).is_ok());
    }

    #[test]
    fn test_changed_account_state_rejected() {
        let signer = LinkSigner::new("secret").unwrap();
        let token = signer.sign(LinkPurpose::PasswordReset, "ana@example.com", HASH);
        let claims = signer.verify(LinkPurpose::PasswordReset, &token).unwrap();
        assert!(matches!(
            signer.ensure_bound(&claims, "$2b$04$somethingelseentirely"),
            Err(AuthError::LinkUsed)
        ));
    }

    #[test]
    fn test_email_with_colon_survives() {
        let signer = LinkSigner::new("secret").unwrap();
        let token = signer.sign(LinkPurpose::EmailVerification, "odd:name@example.com", "");
        let claims = signer.verify(LinkPurpose::EmailVerification, &token).unwrap();
        assert_eq!(claims.email, "odd:name@example.com");
    }

    #[test]
    fn test_purpose_is_bound() {
        let signer = LinkSigner::new("secret").unwrap();
        let token = signer.sign(LinkPurpose::EmailVerification, "ana@example.com", "");
        assert!(signer.verify(LinkPurpose::PasswordReset, &token).is_err());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let signer = LinkSigner::new("secret").unwrap();
        let token = signer.sign(LinkPurpose::PasswordReset, "ana@example.com", HASH);
        let (_, sig) = token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode("reset:9999999999:x:mallory@example.com");
        let forged = format!("{forged_payload}.{sig}");
        assert!(matches!(
            signer.verify(LinkPurpose::PasswordReset, &forged),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_other_key_rejected() {
        let token = LinkSigner::new("secret")
            .unwrap()
            .sign(LinkPurpose::PasswordReset, "ana@example.com", HASH);
        assert!(LinkSigner::new("other").unwrap().verify(LinkPurpose::PasswordReset, &token).is_err());
    }

    #[test]
    fn test_expired_link() {
        let signer = LinkSigner::new("secret").unwrap();
        let past = Utc::now().timestamp() - 10;
        let token = signer.sign_with_expiry(LinkPurpose::PasswordReset, "ana@example.com", HASH, past);
        assert!(matches!(
            signer.verify(LinkPurpose::PasswordReset, &token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let signer = LinkSigner::new("secret").unwrap();
        assert!(signer.verify(LinkPurpose::PasswordReset, "no-dot-here").is_err());
        assert!(signer.verify(LinkPurpose::PasswordReset, "!!!.???").is_err());
    }
}
