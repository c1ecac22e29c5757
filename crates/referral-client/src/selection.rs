//! The user's package, sponsor and side choice, and the submit gate

use alloy_primitives::Address;
use url::Url;

use crate::address::canonicalize;
use crate::constants::COMPANY_SPONSOR;
use crate::model::{Side, Tier};
use crate::referral::{self, Referral};

/// Current choice. Every field may be unset; only a complete, valid selection
/// can be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub tier: Option<Tier>,
    pub side: Option<Side>,
    pub sponsor: Option<Address>,
}

impl Selection {
    /// Account connected, purchasable tier, valid sponsor, side chosen
    pub fn can_submit(&self, account: Option<Address>) -> bool {
        account.is_some()
            && self.tier.is_some_and(Tier::is_purchasable)
            && self.sponsor.is_some()
            && self.side.is_some()
    }
}

/// Owns the selection for the page session, seeded from the page URL
#[derive(Debug, Clone)]
pub struct SelectionState {
    selection: Selection,
    page_url: Url,
}

impl SelectionState {
    /// Sponsor and side from the link (with fallbacks), no tier yet
    pub fn from_page_url(page_url: Url) -> Self {
        let Referral { sponsor, side } = referral::decode(&page_url);
        Self {
            selection: Selection {
                tier: None,
                side: Some(side),
                sponsor: Some(sponsor),
            },
            page_url,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    pub fn set_tier(&mut self, tier: Option<Tier>) {
        self.selection.tier = tier;
    }

    pub fn set_side(&mut self, side: Side) {
        self.selection.side = Some(side);
    }

    /// Store the canonical sponsor, or clear it when `raw` is not a valid
    /// address. Unlike link decoding there is no company fallback here.
    pub fn set_sponsor(&mut self, raw: &str) -> Option<Address> {
        self.selection.sponsor = canonicalize(raw.trim()).ok();
        self.selection.sponsor
    }

    pub fn can_submit(&self, account: Option<Address>) -> bool {
        self.selection.can_submit(account)
    }

    pub fn sponsor_or_company(&self) -> Address {
        self.selection.sponsor.unwrap_or(COMPANY_SPONSOR)
    }

    /// Link for the current sponsor and side; always available
    pub fn preview_link(&self) -> String {
        self.share_link(self.selection.side.unwrap_or_default())
    }

    /// Link for the current sponsor (or company) on a given side
    pub fn share_link(&self, side: Side) -> String {
        referral::encode(&self.page_url, &self.sponsor_or_company(), side)
    }

    pub fn company_link(&self, side: Side) -> String {
        referral::company_link(&self.page_url, side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::referral::decode_str;

    const ACCOUNT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const SPONSOR: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    fn state(url: &str) -> SelectionState {
        SelectionState::from_page_url(Url::parse(url).unwrap())
    }

    #[test]
    fn test_can_submit_all_combinations() {
        let account = canonicalize(ACCOUNT).unwrap();
        let sponsor = canonicalize(SPONSOR).unwrap();

        for mask in 0u8..16 {
            let has_account = mask & 1 != 0;
            let has_tier = mask & 2 != 0;
            let has_sponsor = mask & 4 != 0;
            let has_side = mask & 8 != 0;

            let selection = Selection {
                tier: has_tier.then_some(Tier::Medium),
                side: has_side.then_some(Side::Right),
                sponsor: has_sponsor.then_some(sponsor),
            };
            let expected = mask == 0b1111;
            assert_eq!(
                selection.can_submit(has_account.then_some(account)),
                expected,
                "mask {:04b}",
                mask
            );
        }
    }

    #[test]
    fn test_unset_tier_never_submits() {
        let selection = Selection {
            tier: Some(Tier::Unset),
            side: Some(Side::Left),
            sponsor: Some(canonicalize(SPONSOR).unwrap()),
        };
        assert!(!selection.can_submit(Some(canonicalize(ACCOUNT).unwrap())));
    }

    #[test]
    fn test_seeded_from_link() {
        let s = state(&format!("https://app.example.org/?ref={}&side=R", SPONSOR.to_lowercase()));
        assert_eq!(s.selection().sponsor, Some(canonicalize(SPONSOR).unwrap()));
        assert_eq!(s.selection().side, Some(Side::Right));
        assert_eq!(s.selection().tier, None);
    }

    #[test]
    fn test_invalid_sponsor_input_clears() {
        let mut s = state("https://app.example.org/");
        assert_eq!(s.selection().sponsor, Some(COMPANY_SPONSOR));

        assert_eq!(s.set_sponsor("0x123"), None);
        assert_eq!(s.selection().sponsor, None);

        // preview still works through the company fallback
        assert_eq!(decode_str(&s.preview_link()).sponsor, COMPANY_SPONSOR);

        let stored = s.set_sponsor(&format!("  {}  ", SPONSOR.to_lowercase()));
        assert_eq!(stored, Some(canonicalize(SPONSOR).unwrap()));
    }

    #[test]
    fn test_preview_follows_side() {
        let mut s = state("https://app.example.org/");
        s.set_sponsor(SPONSOR);
        s.set_side(Side::Right);
        let preview = decode_str(&s.preview_link());
        assert_eq!(preview.side, Side::Right);
        assert_eq!(preview.sponsor, canonicalize(SPONSOR).unwrap());

        assert_eq!(decode_str(&s.share_link(Side::Left)).side, Side::Left);
        assert_eq!(decode_str(&s.company_link(Side::Right)).sponsor, COMPANY_SPONSOR);
    }
}
