//! Payment Verification Gate
//!
//! Recomputes the gateway's payment signature server-side and compares it
//! constant-time. The scheme is fixed by the gateway: HMAC-SHA256 over
//! `"{gateway_order_id}|{gateway_payment_id}"` with the shared key secret,
//! hex-encoded. A mismatch means the assertion is forged or corrupted and
//! settlement must not touch any stock.

use ring::hmac;

#[derive(Clone)]
pub struct SignatureVerifier {
    key: hmac::Key,
}

impl SignatureVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
        }
    }

    /// Check a provided signature against the recomputed one.
    ///
    /// `ring::hmac::verify` performs the comparison in constant time.
    pub fn verify(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        provided_signature: &str,
    ) -> bool {
        let payload = Self::payload(gateway_order_id, gateway_payment_id);
        let Ok(provided) = hex::decode(provided_signature) else {
            return false;
        };
        hmac::verify(&self.key, payload.as_bytes(), &provided).is_ok()
    }

    /// Produce the signature the gateway would send (hex, lowercase).
    /// Used by tests and the in-process gateway mock.
    pub fn sign(&self, gateway_order_id: &str, gateway_payment_id: &str) -> String {
        let payload = Self::payload(gateway_order_id, gateway_payment_id);
        let tag = hmac::sign(&self.key, payload.as_bytes());
        hex::encode(tag.as_ref())
    }

    fn payload(gateway_order_id: &str, gateway_payment_id: &str) -> String {
        format!("{gateway_order_id}|{gateway_payment_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_signature_verifies() {
        let verifier = SignatureVerifier::new("test-key-secret");
        let sig = verifier.sign("order_ABC123", "pay_XYZ789");
        assert!(verifier.verify("order_ABC123", "pay_XYZ789", &sig));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let verifier = SignatureVerifier::new("test-key-secret");
        let mut sig = verifier.sign("order_ABC123", "pay_XYZ789");
        // Flip one nibble
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(!verifier.verify("order_ABC123", "pay_XYZ789", &sig));
    }

    #[test]
    fn signature_is_bound_to_both_identifiers() {
        let verifier = SignatureVerifier::new("test-key-secret");
        let sig = verifier.sign("order_ABC123", "pay_XYZ789");
        assert!(!verifier.verify("order_OTHER", "pay_XYZ789", &sig));
        assert!(!verifier.verify("order_ABC123", "pay_OTHER", &sig));
    }

    #[test]
    fn different_secret_means_rejection() {
        let signer = SignatureVerifier::new("real-secret");
        let verifier = SignatureVerifier::new("other-secret");
        let sig = signer.sign("order_ABC123", "pay_XYZ789");
        assert!(!verifier.verify("order_ABC123", "pay_XYZ789", &sig));
    }

    #[test]
    fn malformed_hex_is_rejected_not_panicked() {
        let verifier = SignatureVerifier::new("test-key-secret");
        assert!(!verifier.verify("order_ABC123", "pay_XYZ789", "not-hex-at-all"));
        assert!(!verifier.verify("order_ABC123", "pay_XYZ789", ""));
    }
}
