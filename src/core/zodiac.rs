use serde::{Deserialize, Serialize};
use std::fmt;

/// The twelve zodiac sun signs.
///
/// Discriminants double as row/column indices into the static compatibility
/// tables below, so the variant order here must match the table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SunSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

/// The four classical elements; each sign maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

/// The three modalities; each sign maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Cardinal,
    Fixed,
    Mutable,
}

impl SunSign {
    pub const ALL: [SunSign; 12] = [
        SunSign::Aries,
        SunSign::Taurus,
        SunSign::Gemini,
        SunSign::Cancer,
        SunSign::Leo,
        SunSign::Virgo,
        SunSign::Libra,
        SunSign::Scorpio,
        SunSign::Sagittarius,
        SunSign::Capricorn,
        SunSign::Aquarius,
        SunSign::Pisces,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn element(self) -> Element {
        match self {
            SunSign::Aries | SunSign::Leo | SunSign::Sagittarius => Element::Fire,
            SunSign::Taurus | SunSign::Virgo | SunSign::Capricorn => Element::Earth,
            SunSign::Gemini | SunSign::Libra | SunSign::Aquarius => Element::Air,
            SunSign::Cancer | SunSign::Scorpio | SunSign::Pisces => Element::Water,
        }
    }

    pub fn modality(self) -> Modality {
        match self {
            SunSign::Aries | SunSign::Cancer | SunSign::Libra | SunSign::Capricorn => {
                Modality::Cardinal
            }
            SunSign::Taurus | SunSign::Leo | SunSign::Scorpio | SunSign::Aquarius => {
                Modality::Fixed
            }
            SunSign::Gemini | SunSign::Virgo | SunSign::Sagittarius | SunSign::Pisces => {
                Modality::Mutable
            }
        }
    }

    /// Parse a raw profile label into a sign.
    ///
    /// Profile rows written by older clients carry French labels, newer ones
    /// English; both are accepted, case-insensitively and with or without
    /// diacritics. Anything else is unknown and scores with neutral defaults.
    pub fn parse(label: &str) -> Option<SunSign> {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "aries" | "bélier" | "belier" => Some(SunSign::Aries),
            "taurus" | "taureau" => Some(SunSign::Taurus),
            "gemini" | "gémeaux" | "gemeaux" => Some(SunSign::Gemini),
            "cancer" => Some(SunSign::Cancer),
            "leo" | "lion" => Some(SunSign::Leo),
            "virgo" | "vierge" => Some(SunSign::Virgo),
            "libra" | "balance" => Some(SunSign::Libra),
            "scorpio" | "scorpion" => Some(SunSign::Scorpio),
            "sagittarius" | "sagittaire" => Some(SunSign::Sagittarius),
            "capricorn" | "capricorne" => Some(SunSign::Capricorn),
            "aquarius" | "verseau" => Some(SunSign::Aquarius),
            "pisces" | "poissons" => Some(SunSign::Pisces),
            _ => None,
        }
    }
}

impl fmt::Display for SunSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SunSign::Aries => "Aries",
            SunSign::Taurus => "Taurus",
            SunSign::Gemini => "Gemini",
            SunSign::Cancer => "Cancer",
            SunSign::Leo => "Leo",
            SunSign::Virgo => "Virgo",
            SunSign::Libra => "Libra",
            SunSign::Scorpio => "Scorpio",
            SunSign::Sagittarius => "Sagittarius",
            SunSign::Capricorn => "Capricorn",
            SunSign::Aquarius => "Aquarius",
            SunSign::Pisces => "Pisces",
        };
        f.write_str(name)
    }
}

/// Neutral score used whenever a sign is missing or unknown.
pub const NEUTRAL_SCORE: u8 = 50;

/// Sign-pair scores, row = first sign, column = second sign, in `ALL` order.
/// Lookups read one direction only; the table is not forced symmetric.
const SUN_SIGN_TABLE: [[u8; 12]; 12] = [
    // Aries
    [75, 60, 85, 55, 95, 50, 70, 65, 95, 55, 90, 60],
    // Taurus
    [60, 80, 55, 90, 65, 95, 75, 85, 50, 95, 55, 90],
    // Gemini
    [85, 55, 75, 60, 90, 70, 95, 55, 85, 50, 95, 65],
    // Cancer
    [55, 90, 60, 85, 70, 80, 65, 95, 55, 85, 50, 95],
    // Leo
    [95, 65, 90, 70, 75, 60, 85, 70, 95, 60, 85, 65],
    // Virgo
    [50, 95, 70, 80, 60, 80, 75, 85, 60, 95, 65, 75],
    // Libra
    [70, 75, 95, 65, 85, 75, 80, 70, 90, 65, 95, 70],
    // Scorpio
    [65, 85, 55, 95, 70, 85, 70, 85, 60, 90, 65, 95],
    // Sagittarius
    [95, 50, 85, 55, 95, 60, 90, 60, 80, 55, 90, 65],
    // Capricorn
    [55, 95, 50, 85, 60, 95, 65, 90, 55, 85, 70, 80],
    // Aquarius
    [90, 55, 95, 50, 85, 65, 95, 65, 90, 70, 80, 70],
    // Pisces
    [60, 90, 65, 95, 65, 75, 70, 95, 65, 80, 70, 85],
];

/// Element-pair scores, fire/earth/air/water order.
const ELEMENT_TABLE: [[u8; 4]; 4] = [
    [90, 50, 85, 55],
    [50, 85, 60, 90],
    [85, 60, 90, 65],
    [55, 90, 65, 85],
];

/// Modality-pair scores, cardinal/fixed/mutable order.
const MODALITY_TABLE: [[u8; 3]; 3] = [
    [70, 85, 80],
    [85, 60, 75],
    [80, 75, 85],
];

/// Raw sun-sign pair score; 50 when either side is unknown.
#[inline]
pub fn sun_sign_score(a: Option<SunSign>, b: Option<SunSign>) -> u8 {
    match (a, b) {
        (Some(a), Some(b)) => SUN_SIGN_TABLE[a.index()][b.index()],
        _ => NEUTRAL_SCORE,
    }
}

/// Element-pair score; 50 when either side is unknown.
#[inline]
pub fn element_score(a: Option<SunSign>, b: Option<SunSign>) -> u8 {
    match (a, b) {
        (Some(a), Some(b)) => ELEMENT_TABLE[a.element() as usize][b.element() as usize],
        _ => NEUTRAL_SCORE,
    }
}

/// Modality-pair score; 50 when either side is unknown.
#[inline]
pub fn modality_score(a: Option<SunSign>, b: Option<SunSign>) -> u8 {
    match (a, b) {
        (Some(a), Some(b)) => MODALITY_TABLE[a.modality() as usize][b.modality() as usize],
        _ => NEUTRAL_SCORE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sign_has_element_and_modality() {
        for sign in SunSign::ALL {
            // Exhaustive matches make this a compile-time guarantee; the loop
            // just pins the expected distribution.
            let _ = sign.element();
            let _ = sign.modality();
        }
        let fires = SunSign::ALL.iter().filter(|s| s.element() == Element::Fire).count();
        let cardinals = SunSign::ALL
            .iter()
            .filter(|s| s.modality() == Modality::Cardinal)
            .count();
        assert_eq!(fires, 3);
        assert_eq!(cardinals, 4);
    }

    #[test]
    fn parse_accepts_french_and_english() {
        assert_eq!(SunSign::parse("Lion"), Some(SunSign::Leo));
        assert_eq!(SunSign::parse("leo"), Some(SunSign::Leo));
        assert_eq!(SunSign::parse("Bélier"), Some(SunSign::Aries));
        assert_eq!(SunSign::parse("belier"), Some(SunSign::Aries));
        assert_eq!(SunSign::parse("  VERSEAU "), Some(SunSign::Aquarius));
        assert_eq!(SunSign::parse("ophiuchus"), None);
        assert_eq!(SunSign::parse(""), None);
    }

    #[test]
    fn table_values_are_percentages() {
        for row in SUN_SIGN_TABLE {
            for v in row {
                assert!((1..=100).contains(&v));
            }
        }
        for row in ELEMENT_TABLE {
            for v in row {
                assert!((1..=100).contains(&v));
            }
        }
        for row in MODALITY_TABLE {
            for v in row {
                assert!((1..=100).contains(&v));
            }
        }
    }

    #[test]
    fn known_pair_scores() {
        // Leo/Leo sits on the diagonal; fire/fire is the strongest element
        // pairing in the table.
        assert_eq!(sun_sign_score(Some(SunSign::Leo), Some(SunSign::Leo)), 75);
        assert_eq!(element_score(Some(SunSign::Leo), Some(SunSign::Leo)), 90);
        assert_eq!(modality_score(Some(SunSign::Leo), Some(SunSign::Leo)), 60);
        assert_eq!(sun_sign_score(Some(SunSign::Aries), Some(SunSign::Leo)), 95);
    }

    #[test]
    fn unknown_sign_scores_neutral() {
        assert_eq!(sun_sign_score(None, Some(SunSign::Leo)), NEUTRAL_SCORE);
        assert_eq!(element_score(Some(SunSign::Leo), None), NEUTRAL_SCORE);
        assert_eq!(modality_score(None, None), NEUTRAL_SCORE);
    }
}
