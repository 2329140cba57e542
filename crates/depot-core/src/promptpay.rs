//! # PromptPay Payload Builder
//!
//! Merchant-presented EMV-style QR payload for Thai PromptPay, built from
//! TLV (tag-length-value) fields with a trailing CRC16-CCITT checksum.
//!
//! ## Payload Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tag  len  value                                                        │
//! │  ───  ───  ─────────────────────────────────────────                    │
//! │  00   02   01            payload format indicator                       │
//! │  01   02   11 | 12       point of initiation (static | dynamic)         │
//! │  29   ..   nested TLV:                                                  │
//! │              00  16  A000000677010111   (PromptPay AID)                 │
//! │              01  13  0066812345678      (normalized phone proxy)        │
//! │  52   04   0000          merchant category code                         │
//! │  53   03   764           currency (THB)                                 │
//! │  54   ..   12.50         amount, 2 decimals (dynamic only)              │
//! │  58   02   TH            country code                                   │
//! │  63   04   XXXX          CRC16-CCITT over every preceding byte,         │
//! │                          including the "6304" tag+length itself         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This sits beside the stock ledger as a sibling wire format; nothing here
//! touches storage.

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;

// Field tags and fixed values, per the merchant-presented EMV layout.
const TAG_PAYLOAD_FORMAT: &str = "00";
const TAG_POI_METHOD: &str = "01";
const TAG_MERCHANT_INFO: &str = "29";
const TAG_MERCHANT_CATEGORY: &str = "52";
const TAG_CURRENCY: &str = "53";
const TAG_AMOUNT: &str = "54";
const TAG_COUNTRY: &str = "58";
const TAG_CRC: &str = "63";

const SUB_TAG_AID: &str = "00";
const SUB_TAG_PHONE: &str = "01";

const PAYLOAD_FORMAT: &str = "01";
const POI_STATIC: &str = "11";
const POI_DYNAMIC: &str = "12";
const PROMPTPAY_AID: &str = "A000000677010111";
const MCC_UNSPECIFIED: &str = "0000";
const CURRENCY_THB: &str = "764";
const COUNTRY_TH: &str = "TH";

// =============================================================================
// TLV Encoding
// =============================================================================

/// Encodes one TLV field: 2-char tag, zero-padded 2-digit length, value.
fn tlv(tag: &str, value: &str) -> String {
    format!("{}{:02}{}", tag, value.len(), value)
}

// =============================================================================
// Phone Normalization
// =============================================================================

/// Normalizes a Thai phone number into the PromptPay proxy form.
///
/// ## Rules
/// - Strip every non-digit first
/// - `0066…`          → kept as-is
/// - `66…`            → prefixed with `00`
/// - single leading `0` (local format) → that `0` replaced with `0066`
/// - anything else    → prefixed with `0066` unconditionally
///
/// ## Example
/// ```rust
/// use depot_core::promptpay::normalize_phone;
///
/// assert_eq!(normalize_phone("081-234-5678"), "0066812345678");
/// assert_eq!(normalize_phone("66812345678"), "0066812345678");
/// ```
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.starts_with("0066") {
        digits
    } else if digits.starts_with("66") {
        format!("00{}", digits)
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("0066{}", rest)
    } else {
        format!("0066{}", digits)
    }
}

// =============================================================================
// CRC16-CCITT
// =============================================================================

/// CRC16-CCITT: polynomial 0x1021, initial value 0xFFFF, no reflection.
///
/// Exposed so consumers can re-verify a payload: recompute over the payload
/// minus its last 4 characters and compare against those characters.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

// =============================================================================
// Payload Builder
// =============================================================================

/// Builds a merchant-presented PromptPay payload for a phone proxy.
///
/// A supplied amount switches the point-of-initiation method from static
/// (`"11"`, reusable QR) to dynamic (`"12"`, single payment).
///
/// ## Errors
/// `ValidationError::Required` when the phone number carries no digits;
/// `ValidationError::MustNotBeNegative` for a negative amount.
///
/// ## Example
/// ```rust
/// use depot_core::promptpay::build_payload;
///
/// let payload = build_payload("0812345678", None).unwrap();
/// assert!(payload.contains("0066812345678"));
/// ```
pub fn build_payload(phone: &str, amount: Option<Money>) -> CoreResult<String> {
    if !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        }
        .into());
    }
    if let Some(amount) = amount {
        if amount.is_negative() {
            return Err(ValidationError::MustNotBeNegative {
                field: "amount".to_string(),
            }
            .into());
        }
    }

    let poi = if amount.is_some() {
        POI_DYNAMIC
    } else {
        POI_STATIC
    };

    let merchant_info = format!(
        "{}{}",
        tlv(SUB_TAG_AID, PROMPTPAY_AID),
        tlv(SUB_TAG_PHONE, &normalize_phone(phone))
    );

    let mut payload = String::new();
    payload.push_str(&tlv(TAG_PAYLOAD_FORMAT, PAYLOAD_FORMAT));
    payload.push_str(&tlv(TAG_POI_METHOD, poi));
    payload.push_str(&tlv(TAG_MERCHANT_INFO, &merchant_info));
    payload.push_str(&tlv(TAG_MERCHANT_CATEGORY, MCC_UNSPECIFIED));
    payload.push_str(&tlv(TAG_CURRENCY, CURRENCY_THB));
    if let Some(amount) = amount {
        payload.push_str(&tlv(TAG_AMOUNT, &amount.to_decimal_string()));
    }
    payload.push_str(&tlv(TAG_COUNTRY, COUNTRY_TH));

    // CRC covers everything before it, including its own tag + length.
    payload.push_str(TAG_CRC);
    payload.push_str("04");
    let crc = crc16_ccitt(payload.as_bytes());
    payload.push_str(&format!("{:04X}", crc));

    Ok(payload)
}

/// Verifies a payload's trailing CRC against a recomputation over the rest.
pub fn verify_payload(payload: &str) -> bool {
    if payload.len() < 4 || !payload.is_ascii() {
        return false;
    }
    let (body, checksum) = payload.split_at(payload.len() - 4);
    format!("{:04X}", crc16_ccitt(body.as_bytes())) == checksum
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("0812345678"), "0066812345678");
        assert_eq!(normalize_phone("081-234-5678"), "0066812345678");
        assert_eq!(normalize_phone("66812345678"), "0066812345678");
        assert_eq!(normalize_phone("0066812345678"), "0066812345678");
        // No recognized prefix: 0066 is prepended unconditionally
        assert_eq!(normalize_phone("812345678"), "0066812345678");
    }

    #[test]
    fn test_crc16_ccitt_known_vector() {
        // Standard CCITT-FALSE check value for "123456789"
        assert_eq!(crc16_ccitt(b"123456789"), 0x29B1);
        assert_eq!(crc16_ccitt(b""), 0xFFFF);
    }

    #[test]
    fn test_static_payload() {
        let payload = build_payload("0812345678", None).unwrap();

        // Payload format indicator, then static point of initiation
        assert!(payload.starts_with("000201"));
        assert!(payload.contains("010211"));
        // Normalized proxy with its sub-TLV header (tag 01, len 13)
        assert!(payload.contains("01130066812345678"));
        assert!(payload.contains(PROMPTPAY_AID));
        // MCC, currency, country
        assert!(payload.contains("52040000"));
        assert!(payload.contains("5303764"));
        assert!(payload.contains("5802TH"));
        // No amount field on the static path
        assert!(!payload.contains("5406"));

        assert!(verify_payload(&payload));
    }

    #[test]
    fn test_dynamic_payload_with_amount() {
        let payload = build_payload("0812345678", Some(Money::from_cents(10050))).unwrap();

        assert!(payload.contains("010212"));
        // tag 54, len 06, "100.50"
        assert!(payload.contains("5406100.50"));
        assert!(verify_payload(&payload));
    }

    #[test]
    fn test_crc_self_verifies() {
        let payload = build_payload("0899999999", None).unwrap();
        let (body, checksum) = payload.split_at(payload.len() - 4);

        assert_eq!(format!("{:04X}", crc16_ccitt(body.as_bytes())), checksum);
        assert_eq!(checksum.len(), 4);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(checksum, checksum.to_uppercase());
    }

    #[test]
    fn test_tampered_payload_fails_verification() {
        let payload = build_payload("0812345678", None).unwrap();
        let tampered = payload.replace("0066812345678", "0066812345679");
        assert!(!verify_payload(&tampered));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(build_payload("", None).is_err());
        assert!(build_payload("no digits here", None).is_err());
        assert!(build_payload("0812345678", Some(Money::from_cents(-100))).is_err());
    }
}
