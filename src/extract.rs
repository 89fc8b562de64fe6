//! Access key extraction from decoded QR text.
//!
//! Fiscal receipt QR codes carry the 44-digit access key in one of a
//! few URL shapes; the rules below are applied in order and the first
//! match wins. The `p=` and `chNFe=` branches do not validate that the
//! captured segment is 44 digits; only the bare-digits fallback
//! enforces the exact length.

/// Length of a fiscal document access key.
pub const ACCESS_KEY_LEN: usize = 44;

/// Isolate the access key from decoded QR text.
///
/// Rules, first match wins:
/// 1. text after the first `p=`, up to the next `|`
/// 2. text after the first `chNFe=`, up to the next `&`
/// 3. the first run of exactly 44 consecutive decimal digits
///
/// Returns `None` when no rule matches or the matched segment is
/// empty; malformed input never errors.
pub fn extract_key(text: &str) -> Option<String> {
    if let Some(start) = text.find("p=") {
        let rest = &text[start + 2..];
        let end = rest.find('|').unwrap_or(rest.len());
        return non_empty(&rest[..end]);
    }

    if let Some(start) = text.find("chNFe=") {
        let rest = &text[start + 6..];
        let end = rest.find('&').unwrap_or(rest.len());
        return non_empty(&rest[..end]);
    }

    first_exact_digit_run(text, ACCESS_KEY_LEN)
}

fn non_empty(segment: &str) -> Option<String> {
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

/// Find the first maximal run of decimal digits whose length is
/// exactly `len`.
fn first_exact_digit_run(text: &str, len: usize) -> Option<String> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == len {
                return Some(text[start..i].to_string());
            }
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "35200714200166000196550010000123451234567890";

    #[test]
    fn test_p_parameter_wins() {
        let text = format!("https://www.fazenda.sp.gov.br/qr?p={KEY}|2|1|1|ABCDEF");
        assert_eq!(extract_key(&text).as_deref(), Some(KEY));
    }

    #[test]
    fn test_p_parameter_runs_to_end_without_pipe() {
        let text = format!("...p={KEY}");
        assert_eq!(extract_key(&text).as_deref(), Some(KEY));
    }

    #[test]
    fn test_p_parameter_is_not_length_validated() {
        assert_eq!(extract_key("x?p=ABCDEF|rest").as_deref(), Some("ABCDEF"));
    }

    #[test]
    fn test_chnfe_parameter() {
        let text = format!("https://nfe.example/consulta?chNFe={KEY}&nVersao=100");
        assert_eq!(extract_key(&text).as_deref(), Some(KEY));
        assert_eq!(
            extract_key("a?chNFe=123456&x=1").as_deref(),
            Some("123456")
        );
    }

    #[test]
    fn test_bare_digits_embedded_in_text() {
        let text = format!("NFC-e recibo {KEY} obrigado pela compra");
        assert_eq!(extract_key(&text).as_deref(), Some(KEY));
    }

    #[test]
    fn test_digit_run_must_be_exactly_44() {
        let short = "1".repeat(43);
        let long = "2".repeat(45);
        assert_eq!(extract_key(&short), None);
        assert_eq!(extract_key(&long), None);
        // A 44-digit run after a longer run is still found
        let text = format!("{long} e depois {KEY}");
        assert_eq!(extract_key(&text).as_deref(), Some(KEY));
    }

    #[test]
    fn test_no_digits_is_absent() {
        assert_eq!(extract_key("no digits here"), None);
        assert_eq!(extract_key(""), None);
    }

    #[test]
    fn test_empty_capture_is_absent() {
        assert_eq!(extract_key("x?p="), None);
        assert_eq!(extract_key("x?p=|2|1"), None);
        assert_eq!(extract_key("x?chNFe=&v=1"), None);
    }

    #[test]
    fn test_leading_zeros_survive() {
        let key = format!("00{}", &KEY[2..]);
        let text = format!("texto {key} fim");
        assert_eq!(extract_key(&text).as_deref(), Some(key.as_str()));
    }
}
