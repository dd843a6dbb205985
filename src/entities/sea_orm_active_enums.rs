use std::str::FromStr;

use sea_orm::{Iterable, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum EventKind {
    #[default]
    #[sea_orm(string_value = "Meeting")]
    Meeting,
    #[sea_orm(string_value = "Canvassing")]
    Canvassing,
    #[sea_orm(string_value = "DoorToDoor")]
    DoorToDoor,
    #[sea_orm(string_value = "Rally")]
    Rally,
}

impl EventKind {
    pub fn label(self) -> &'static str {
        match self {
            EventKind::Meeting => "Reunión",
            EventKind::Canvassing => "Volanteo",
            EventKind::DoorToDoor => "Casa por Casa",
            EventKind::Rally => "Mitin",
        }
    }
}

/// The nine zones a registrant can belong to. There is no catch-all value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Sector {
    #[serde(rename = "Zona Urbana")]
    #[sea_orm(string_value = "Zona Urbana")]
    ZonaUrbana,
    #[serde(rename = "Filadelfia")]
    #[sea_orm(string_value = "Filadelfia")]
    Filadelfia,
    #[serde(rename = "Samaria")]
    #[sea_orm(string_value = "Samaria")]
    Samaria,
    #[serde(rename = "San Luis")]
    #[sea_orm(string_value = "San Luis")]
    SanLuis,
    #[serde(rename = "Morritos")]
    #[sea_orm(string_value = "Morritos")]
    Morritos,
    #[serde(rename = "La Paila")]
    #[sea_orm(string_value = "La Paila")]
    LaPaila,
    #[serde(rename = "El Pintado")]
    #[sea_orm(string_value = "El Pintado")]
    ElPintado,
    #[serde(rename = "El Verso")]
    #[sea_orm(string_value = "El Verso")]
    ElVerso,
    #[serde(rename = "La Soledad")]
    #[sea_orm(string_value = "La Soledad")]
    LaSoledad,
}

impl Sector {
    pub fn label(self) -> &'static str {
        match self {
            Sector::ZonaUrbana => "Zona Urbana",
            Sector::Filadelfia => "Filadelfia",
            Sector::Samaria => "Samaria",
            Sector::SanLuis => "San Luis",
            Sector::Morritos => "Morritos",
            Sector::LaPaila => "La Paila",
            Sector::ElPintado => "El Pintado",
            Sector::ElVerso => "El Verso",
            Sector::LaSoledad => "La Soledad",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Sector::iter().map(Sector::label).collect()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sector: {0}")]
pub struct UnknownSector(pub String);

impl FromStr for Sector {
    type Err = UnknownSector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sector::iter()
            .find(|sector| sector.label() == s)
            .ok_or_else(|| UnknownSector(s.to_string()))
    }
}
