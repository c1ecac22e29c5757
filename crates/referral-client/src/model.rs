//! Program enums: package tier, tree side, rank

use crate::constants::PLACEHOLDER;

/// Membership package, with the ledger's numeric encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tier {
    /// Ledger state for "no package yet"; never a valid selection
    Unset = 0,
    Small = 1,
    Medium = 2,
    Large = 3,
}

impl Tier {
    /// Tiers a user can buy
    pub const PURCHASABLE: [Tier; 3] = [Tier::Small, Tier::Medium, Tier::Large];

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Tier::Unset),
            1 => Some(Tier::Small),
            2 => Some(Tier::Medium),
            3 => Some(Tier::Large),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Package button codes: "S", "M", "L" (any case). Anything else clears the choice.
    pub fn from_button(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "S" => Some(Tier::Small),
            "M" => Some(Tier::Medium),
            "L" => Some(Tier::Large),
            _ => None,
        }
    }

    pub fn is_purchasable(self) -> bool {
        self != Tier::Unset
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Unset => PLACEHOLDER,
            Tier::Small => "Small",
            Tier::Medium => "Medium",
            Tier::Large => "Large",
        }
    }

    /// Label for a raw ledger value, `-` when out of range or unset
    pub fn label_for_code(code: u8) -> &'static str {
        Self::from_code(code).map(Tier::label).unwrap_or(PLACEHOLDER)
    }
}

/// Branch of the binary tree a new member joins under their sponsor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    /// Single-letter link code
    pub fn code(self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }

    /// Parse a link code. Only "R" (any case, no padding) means Right;
    /// everything else is Left.
    pub fn from_code(code: &str) -> Self {
        if code.eq_ignore_ascii_case("R") {
            Side::Right
        } else {
            Side::Left
        }
    }

    /// Wire form expected by the ledger (`sideRight`)
    pub fn is_right(self) -> bool {
        self == Side::Right
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }
}

/// Display-only rank read from the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    None,
    Bronze,
    Silver,
    Gold,
}

impl Rank {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Rank::None),
            1 => Some(Rank::Bronze),
            2 => Some(Rank::Silver),
            3 => Some(Rank::Gold),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::None => "None",
            Rank::Bronze => "Bronze",
            Rank::Silver => "Silver",
            Rank::Gold => "Gold",
        }
    }

    pub fn label_for_code(code: u8) -> &'static str {
        Self::from_code(code).map(Rank::label).unwrap_or(PLACEHOLDER)
    }
}
