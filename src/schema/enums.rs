//! Closed enumerations. Each Rust enum has a matching [`EnumDef`] naming its PostgreSQL type.

use super::EnumDef;
use serde::{Deserialize, Serialize};

pub const PAGE_STATUS: EnumDef = EnumDef {
    name: "page_status",
    values: &["DRAFT", "PUBLISHED"],
};

pub const STAGE_TYPE: EnumDef = EnumDef {
    name: "stage_type",
    values: &["GROUP", "KO"],
};

pub const MATCH_STATUS: EnumDef = EnumDef {
    name: "match_status",
    values: &["SCHEDULED", "LIVE", "FT", "POSTPONED", "CANCELED"],
};

pub const PARTNER_KIND: EnumDef = EnumDef {
    name: "partner_kind",
    values: &["HOTEL", "FLIGHT", "TOUR", "TICKET", "STREAMING"],
};

pub const TOPIC_TYPE: EnumDef = EnumDef {
    name: "topic_type",
    values: &["TEAM", "CITY", "COMPETITION"],
};

/// Every enumeration the schema declares; created before any table.
pub const ENUMS: &[&EnumDef] = &[&PAGE_STATUS, &STAGE_TYPE, &MATCH_STATUS, &PARTNER_KIND, &TOPIC_TYPE];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageStatus {
    Draft,
    Published,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageType {
    Group,
    Ko,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Ft,
    Postponed,
    Canceled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerKind {
    Hotel,
    Flight,
    Tour,
    Ticket,
    Streaming,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopicType {
    Team,
    City,
    Competition,
}
