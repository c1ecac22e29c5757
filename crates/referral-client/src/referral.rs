//! Shareable referral links: sponsor address + tree side in the page URL

use alloy_primitives::Address;
use url::Url;

use crate::address::{canonicalize, checksummed};
use crate::constants::{COMPANY_SPONSOR, REF_PARAM, SIDE_PARAM};
use crate::model::Side;

/// Sponsor and side carried by a link. Always complete: decoding falls back
/// instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Referral {
    pub sponsor: Address,
    pub side: Side,
}

impl Referral {
    /// Join directly under the company
    pub fn company(side: Side) -> Self {
        Self {
            sponsor: COMPANY_SPONSOR,
            side,
        }
    }
}

/// Set `ref` and `side` on the page URL, keeping any unrelated parameters
pub fn encode(page_url: &Url, sponsor: &Address, side: Side) -> String {
    let mut url = page_url.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != REF_PARAM && key != SIDE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(REF_PARAM, &checksummed(sponsor))
        .append_pair(SIDE_PARAM, side.code());

    url.to_string()
}

/// Read sponsor and side from a URL.
///
/// A missing or malformed `ref` yields the company sponsor; `side` is Right only
/// for `R` (any case), Left otherwise.
pub fn decode(url: &Url) -> Referral {
    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    let sponsor = param(REF_PARAM)
        .and_then(|raw| canonicalize(&raw).ok())
        .unwrap_or(COMPANY_SPONSOR);
    let side = param(SIDE_PARAM)
        .map(|code| Side::from_code(&code))
        .unwrap_or_default();

    Referral { sponsor, side }
}

/// Decode from a raw string; an unparseable URL decodes to the full fallback
pub fn decode_str(url: &str) -> Referral {
    Url::parse(url)
        .map(|url| decode(&url))
        .unwrap_or_else(|_| Referral::company(Side::Left))
}

/// Link that places the visitor directly under the company
pub fn company_link(page_url: &Url, side: Side) -> String {
    encode(page_url, &COMPANY_SPONSOR, side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::canonical_string;

    const SPONSOR: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";

    fn page() -> Url {
        Url::parse("https://app.example.org/join").unwrap()
    }

    fn sponsor() -> Address {
        canonicalize(SPONSOR).unwrap()
    }

    #[test]
    fn test_round_trip() {
        for side in [Side::Left, Side::Right] {
            let link = encode(&page(), &sponsor(), side);
            let decoded = decode_str(&link);
            assert_eq!(decoded.sponsor, sponsor());
            assert_eq!(decoded.side, side);
        }
    }

    #[test]
    fn test_encode_writes_checksummed_sponsor_and_code() {
        let link = encode(&page(), &sponsor(), Side::Right);
        assert_eq!(
            link,
            format!("https://app.example.org/join?ref={}&side=R", canonical_string(SPONSOR).unwrap())
        );
    }

    #[test]
    fn test_encode_is_idempotent_and_keeps_other_params() {
        let base = Url::parse("https://app.example.org/join?lang=en&ref=0xdead&side=L").unwrap();
        let once = encode(&base, &sponsor(), Side::Right);
        let twice = encode(&Url::parse(&once).unwrap(), &sponsor(), Side::Right);
        assert_eq!(once, twice);
        assert!(once.contains("lang=en"));
        assert_eq!(once.matches("ref=").count(), 1);
        assert_eq!(once.matches("side=").count(), 1);
    }

    #[test]
    fn test_missing_params_fall_back() {
        let decoded = decode(&page());
        assert_eq!(decoded, Referral::company(Side::Left));
    }

    #[test]
    fn test_malformed_params_fall_back() {
        let decoded = decode_str("https://app.example.org/join?ref=0xnot-an-address&side=X");
        assert_eq!(decoded.sponsor, COMPANY_SPONSOR);
        assert_eq!(decoded.side, Side::Left);
    }

    #[test]
    fn test_lowercase_side_code_accepted() {
        let decoded = decode_str(&format!("https://app.example.org/?ref={}&side=r", SPONSOR));
        assert_eq!(decoded.side, Side::Right);
        assert_eq!(decoded.sponsor, sponsor());
    }

    #[test]
    fn test_padded_side_code_is_left() {
        let decoded = decode_str(&format!("https://app.example.org/?ref={}&side=%20R", SPONSOR));
        assert_eq!(decoded.side, Side::Left);
    }

    #[test]
    fn test_unparseable_url_falls_back() {
        assert_eq!(decode_str("not a url"), Referral::company(Side::Left));
    }

    #[test]
    fn test_company_link() {
        let decoded = decode_str(&company_link(&page(), Side::Right));
        assert_eq!(decoded, Referral::company(Side::Right));
    }
}
