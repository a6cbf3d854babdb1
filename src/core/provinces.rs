//! Provinces and territories of Pakistan, for origin/destination of supply.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Province {
    Punjab,
    Sindh,
    KhyberPakhtunkhwa,
    Balochistan,
    IslamabadCapitalTerritory,
    GilgitBaltistan,
    AzadJammuAndKashmir,
}

impl Province {
    /// Name as printed on FBR annexures.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Punjab => "Punjab",
            Self::Sindh => "Sindh",
            Self::KhyberPakhtunkhwa => "Khyber Pakhtunkhwa",
            Self::Balochistan => "Balochistan",
            Self::IslamabadCapitalTerritory => "Islamabad Capital Territory",
            Self::GilgitBaltistan => "Gilgit-Baltistan",
            Self::AzadJammuAndKashmir => "Azad Jammu and Kashmir",
        }
    }

    /// Lenient parse: case-insensitive, accepts common abbreviations.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "punjab" => Some(Self::Punjab),
            "sindh" | "sind" => Some(Self::Sindh),
            "khyberpakhtunkhwa" | "kpk" | "kp" => Some(Self::KhyberPakhtunkhwa),
            "balochistan" | "baluchistan" => Some(Self::Balochistan),
            "islamabadcapitalterritory" | "islamabad" | "ict" => {
                Some(Self::IslamabadCapitalTerritory)
            }
            "gilgitbaltistan" | "gb" => Some(Self::GilgitBaltistan),
            "azadjammuandkashmir" | "azadjammukashmir" | "ajk" | "azadkashmir" => {
                Some(Self::AzadJammuAndKashmir)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Province {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_abbreviations() {
        assert_eq!(Province::from_name("Sindh"), Some(Province::Sindh));
        assert_eq!(Province::from_name("KPK"), Some(Province::KhyberPakhtunkhwa));
        assert_eq!(Province::from_name("Khyber-Pakhtunkhwa"), Some(Province::KhyberPakhtunkhwa));
        assert_eq!(Province::from_name("islamabad"), Some(Province::IslamabadCapitalTerritory));
        assert_eq!(Province::from_name("Gilgit-Baltistan"), Some(Province::GilgitBaltistan));
        assert_eq!(Province::from_name("Bavaria"), None);
    }

    #[test]
    fn name_roundtrips() {
        for p in [
            Province::Punjab,
            Province::Sindh,
            Province::KhyberPakhtunkhwa,
            Province::Balochistan,
            Province::IslamabadCapitalTerritory,
            Province::GilgitBaltistan,
            Province::AzadJammuAndKashmir,
        ] {
            assert_eq!(Province::from_name(p.name()), Some(p));
        }
    }
}
