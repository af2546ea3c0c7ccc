//! Topic label set: the closed list of wedding-services support categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::fold;
use crate::domain::foundation::ValidationError;

/// Shortest response accepted as a fragment of a category name.
const MIN_FRAGMENT_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Topic {
    #[serde(rename = "Düğün Mekanı")]
    Venue,
    #[serde(rename = "Düğün Organizasyonu")]
    Organization,
    #[serde(rename = "Gelinlik")]
    WeddingDress,
    #[serde(rename = "Fotoğrafçı")]
    Photographer,
    #[serde(rename = "Video Çekimi")]
    Videography,
    #[serde(rename = "Müzik/DJ")]
    MusicDj,
    #[serde(rename = "Çiçek/Dekorasyon")]
    FlowersDecoration,
    #[serde(rename = "Davetiye")]
    Invitation,
    #[serde(rename = "Pasta/Catering")]
    CakeCatering,
    #[serde(rename = "Nikah Şekeri")]
    FavorCandy,
    #[serde(rename = "Takı/Aksesuar")]
    JewelryAccessories,
    #[serde(rename = "Düğün Arabası")]
    WeddingCar,
    #[serde(rename = "Düğün Dansı")]
    WeddingDance,
    #[serde(rename = "Genel Bilgi")]
    GeneralInfo,
    #[serde(rename = "Fiyat Sorgusu")]
    PriceInquiry,
    #[serde(rename = "Rezervasyon")]
    Reservation,
    #[serde(rename = "Şikayet")]
    Complaint,
    #[serde(rename = "Diğer")]
    Other,
}

impl Topic {
    /// Returns all topics in declaration order. Matching walks this order.
    pub fn all() -> &'static [Topic] {
        &[
            Topic::Venue,
            Topic::Organization,
            Topic::WeddingDress,
            Topic::Photographer,
            Topic::Videography,
            Topic::MusicDj,
            Topic::FlowersDecoration,
            Topic::Invitation,
            Topic::CakeCatering,
            Topic::FavorCandy,
            Topic::JewelryAccessories,
            Topic::WeddingCar,
            Topic::WeddingDance,
            Topic::GeneralInfo,
            Topic::PriceInquiry,
            Topic::Reservation,
            Topic::Complaint,
            Topic::Other,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Topic::Venue => "Düğün Mekanı",
            Topic::Organization => "Düğün Organizasyonu",
            Topic::WeddingDress => "Gelinlik",
            Topic::Photographer => "Fotoğrafçı",
            Topic::Videography => "Video Çekimi",
            Topic::MusicDj => "Müzik/DJ",
            Topic::FlowersDecoration => "Çiçek/Dekorasyon",
            Topic::Invitation => "Davetiye",
            Topic::CakeCatering => "Pasta/Catering",
            Topic::FavorCandy => "Nikah Şekeri",
            Topic::JewelryAccessories => "Takı/Aksesuar",
            Topic::WeddingCar => "Düğün Arabası",
            Topic::WeddingDance => "Düğün Dansı",
            Topic::GeneralInfo => "Genel Bilgi",
            Topic::PriceInquiry => "Fiyat Sorgusu",
            Topic::Reservation => "Rezervasyon",
            Topic::Complaint => "Şikayet",
            Topic::Other => "Diğer",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            Topic::Venue => "venue",
            Topic::Organization => "organization",
            Topic::WeddingDress => "wedding_dress",
            Topic::Photographer => "photographer",
            Topic::Videography => "videography",
            Topic::MusicDj => "music_dj",
            Topic::FlowersDecoration => "flowers_decoration",
            Topic::Invitation => "invitation",
            Topic::CakeCatering => "cake_catering",
            Topic::FavorCandy => "favor_candy",
            Topic::JewelryAccessories => "jewelry_accessories",
            Topic::WeddingCar => "wedding_car",
            Topic::WeddingDance => "wedding_dance",
            Topic::GeneralInfo => "general_info",
            Topic::PriceInquiry => "price_inquiry",
            Topic::Reservation => "reservation",
            Topic::Complaint => "complaint",
            Topic::Other => "other",
        }
    }

    /// Fuzzy match of classifier output: the first topic whose folded name
    /// is contained in the response, or contains a response of at least
    /// `MIN_FRAGMENT_CHARS` characters.
    pub fn match_response(raw: &str) -> Option<Topic> {
        let response = fold(raw);
        if response.is_empty() {
            return None;
        }
        let fragment_ok = response.chars().count() >= MIN_FRAGMENT_CHARS;
        Topic::all().iter().copied().find(|topic| {
            let name = fold(topic.display_name());
            response.contains(&name) || (fragment_ok && name.contains(&response))
        })
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Topic {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold(s);
        if folded.is_empty() {
            return Err(ValidationError::empty_field("topic"));
        }
        Topic::all()
            .iter()
            .copied()
            .find(|t| fold(t.display_name()) == folded || t.slug() == folded)
            .ok_or_else(|| {
                ValidationError::invalid_format("topic", format!("unknown label '{}'", s.trim()))
            })
    }
}

impl TryFrom<String> for Topic {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
