//! Deterministic placeholder image URLs
//!
//! URL scheme: `<base>/seed/<percent-encoded seed>/<width>/<height>`.
//! The same seed always yields the same URL.

/// Default placeholder image service
pub const DEFAULT_PLACEHOLDER_BASE: &str = "https://picsum.photos";

/// Size used for collection cards and freshly imported records
pub const CARD_SIZE: (u32, u32) = (400, 300);

/// Size used when the image search falls back to a placeholder
pub const PHOTO_SIZE: (u32, u32) = (800, 600);

/// Placeholder URL builder bound to one base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderImages {
    base: String,
}

impl PlaceholderImages {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Build the placeholder URL for `seed` at `(width, height)`
    pub fn url(&self, seed: &str, (width, height): (u32, u32)) -> String {
        format!(
            "{}/seed/{}/{}/{}",
            self.base,
            encode_uri_component(seed),
            width,
            height
        )
    }
}

impl Default for PlaceholderImages {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_BASE)
    }
}

/// Percent-encode a URL component.
///
/// Leaves `A-Z a-z 0-9 - _ . ! ~ * ' ( )` untouched and encodes every other
/// UTF-8 byte as `%XX`, the same set browsers leave alone in
/// `encodeURIComponent`.
pub fn encode_uri_component(input: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => {
                out.push('%');
                out.push(HEX[(byte >> 4) as usize] as char);
                out.push(HEX[(byte & 0x0f) as usize] as char);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_is_deterministic() {
        let p = PlaceholderImages::default();
        assert_eq!(p.url("500", CARD_SIZE), "https://picsum.photos/seed/500/400/300");
        assert_eq!(p.url("500", CARD_SIZE), p.url("500", CARD_SIZE));
    }

    #[test]
    fn test_seed_is_percent_encoded() {
        let p = PlaceholderImages::default();
        assert_eq!(
            p.url("Giulia GT/Rossa", PHOTO_SIZE),
            "https://picsum.photos/seed/Giulia%20GT%2FRossa/800/600"
        );
    }

    #[test]
    fn test_multibyte_seed() {
        assert_eq!(encode_uri_component("Citroën"), "Citro%C3%ABn");
        assert_eq!(encode_uri_component("a-b_c.d!e~f*g'h(i)"), "a-b_c.d!e~f*g'h(i)");
    }

    #[test]
    fn test_trailing_slash_in_base_is_dropped() {
        let p = PlaceholderImages::new("http://localhost:9000/");
        assert_eq!(p.base(), "http://localhost:9000");
        assert_eq!(p.url("x", (1, 2)), "http://localhost:9000/seed/x/1/2");
    }
}
