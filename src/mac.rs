//! MAC address normalization.
//!
//! The controller keys devices by lowercase, colon-separated MAC addresses
//! (e.g., `aa:bb:cc:dd:ee:ff`). Config files and query URLs may use upper case
//! or dashes, so every address is normalized before it reaches the client.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::BmcError;

static MAC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}([:-])[0-9A-Fa-f]{2}(?:[:-][0-9A-Fa-f]{2}){4}$")
        .expect("MAC regex is valid")
});

/// Normalize a MAC address to lowercase colon form.
///
/// Accepts `:` or `-` separators. Returns `InvalidMacAddress` for anything
/// that is not six hex octets.
pub fn normalize_mac(mac: &str) -> crate::Result<String> {
    let trimmed = mac.trim();
    if !MAC_RE.is_match(trimmed) {
        return Err(BmcError::InvalidMacAddress(mac.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase().replace('-', ":"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_upper_case() {
        assert_eq!(
            normalize_mac("AA:BB:CC:DD:EE:FF").unwrap(),
            "aa:bb:cc:dd:ee:ff"
        );
    }

    #[test]
    fn test_normalize_dashes() {
        assert_eq!(
            normalize_mac("00-1a-2B-3c-4D-5e").unwrap(),
            "00:1a:2b:3c:4d:5e"
        );
    }

    #[test]
    fn test_rejects_short_address() {
        assert!(matches!(
            normalize_mac("aa:bb:cc:dd:ee"),
            Err(BmcError::InvalidMacAddress(m)) if m == "aa:bb:cc:dd:ee"
        ));
    }

    #[test]
    fn test_rejects_non_hex() {
        assert!(normalize_mac("zz:bb:cc:dd:ee:ff").is_err());
        assert!(normalize_mac("").is_err());
    }
}
