//! Entity declarations. Wire names follow the public API (camelCase scalars, snake_case references).

use super::enums::*;
use super::*;
use chrono::NaiveDateTime;

// ===== Core locations =====

entity! {
    /// A host city.
    City, CityCreate, CityUpdate => CITY in "cities" {
        req name: String = "name" => text(),
        req country_code: String = "countryCode" => text(),
        req slug: String = "slug" => text().unique(),
        opt tz: String = "tz" => text(),
        opt airport_codes: String = "airportCodes" => text(),
        opt lat: f64 = "lat" => float(),
        opt lng: f64 = "lng" => float(),
    }
}

entity! {
    /// A stadium or arena inside a city.
    Venue, VenueCreate, VenueUpdate => VENUE in "venues" {
        req name: String = "name" => text(),
        req slug: String = "slug" => text().unique(),
        opt capacity: i32 = "capacity" => integer(),
        opt tz: String = "tz" => text(),
        opt lat: f64 = "lat" => float(),
        opt lng: f64 = "lng" => float(),
        req city_id: i64 = "city_id" => references("cities", DeletePolicy::Restrict),
    }
}

// ===== Competitions & matches =====

entity! {
    Competition, CompetitionCreate, CompetitionUpdate => COMPETITION in "competitions" {
        req name: String = "name" => text(),
        req code: String = "code" => text().unique(),
        req kind: String = "kind" => text(),
        opt region: String = "region" => text(),
        req slug: String = "slug" => text().unique(),
    }
}

entity! {
    Season, SeasonCreate, SeasonUpdate => SEASON in "seasons" {
        req year_start: i32 = "yearStart" => integer(),
        req year_end: i32 = "yearEnd" => integer(),
        req slug: String = "slug" => text().unique(),
        req competition_id: i64 = "competition_id" => references("competitions", DeletePolicy::Cascade),
    }
}

entity! {
    /// Group or knockout phase of a season.
    Stage, StageCreate, StageUpdate => STAGE in "stages" {
        req name: String = "name" => text(),
        req stage_type: StageType = "type" => enumeration(&STAGE_TYPE),
        opt sort_order: i32 = "sortOrder" => integer(),
        req season_id: i64 = "season_id" => references("seasons", DeletePolicy::Cascade),
    }
}

entity! {
    Team, TeamCreate, TeamUpdate => TEAM in "teams" {
        req name: String = "name" => text(),
        opt country_code: String = "countryCode" => text(),
        opt fifa_code: String = "fifaCode" => text(),
        req slug: String = "slug" => text().unique(),
    }
}

entity! {
    /// A fixture between two teams. Stage and venue are cleared when their rows go away.
    Match, MatchCreate, MatchUpdate => MATCH in "matches" {
        opt round: String = "round" => text(),
        req kickoff: NaiveDateTime = "kickoff" => timestamp(),
        req status: MatchStatus = "status" => enumeration(&MATCH_STATUS),
        opt score_home: i32 = "scoreHome" => integer(),
        opt score_away: i32 = "scoreAway" => integer(),
        opt pens_home: i32 = "pensHome" => integer(),
        opt pens_away: i32 = "pensAway" => integer(),
        req season_id: i64 = "season_id" => references("seasons", DeletePolicy::Restrict),
        opt stage_id: i64 = "stage_id" => references("stages", DeletePolicy::SetNull),
        opt venue_id: i64 = "venue_id" => references("venues", DeletePolicy::SetNull),
        req home_team_id: i64 = "home_team_id" => references("teams", DeletePolicy::Restrict),
        req away_team_id: i64 = "away_team_id" => references("teams", DeletePolicy::Restrict),
    }
}

// ===== CMS pages =====

entity! {
    Page, PageCreate, PageUpdate => PAGE in "pages" {
        req slug: String = "slug" => text().unique(),
        req title: String = "title" => text(),
        req status: PageStatus = "status" => enumeration(&PAGE_STATUS),
        opt meta: String = "meta" => text(),
        opt published_at: NaiveDateTime = "publishedAt" => timestamp(),
    }
}

entity! {
    PageBlock, PageBlockCreate, PageBlockUpdate => PAGE_BLOCK in "page_blocks" {
        req block_type: String = "type" => text(),
        opt data: String = "data" => text(),
        opt sort_order: i32 = "sortOrder" => integer(),
        req page_id: i64 = "page_id" => references("pages", DeletePolicy::Cascade),
    }
}

// ===== Affiliates & tracking =====

entity! {
    AffiliatePartner, AffiliatePartnerCreate, AffiliatePartnerUpdate => AFFILIATE_PARTNER in "affiliate_partners" {
        req name: String = "name" => text(),
        req kind: PartnerKind = "kind" => enumeration(&PARTNER_KIND),
        opt program: String = "program" => text(),
        opt base_url: String = "baseUrl" => text(),
        opt geo_rules: String = "geoRules" => text(),
        req active: bool = "active" => boolean(),
    }
}

entity! {
    AffiliateOffer, AffiliateOfferCreate, AffiliateOfferUpdate => AFFILIATE_OFFER in "affiliate_offers" {
        req name: String = "name" => text(),
        req deeplink_pattern: String = "deeplinkPattern" => text(),
        opt params: String = "params" => text(),
        req active: bool = "active" => boolean(),
        req partner_id: i64 = "partner_id" => references("affiliate_partners", DeletePolicy::Cascade),
    }
}

entity! {
    /// One tracked redirect to a partner offer.
    OutboundClick, OutboundClickCreate, OutboundClickUpdate => OUTBOUND_CLICK in "outbound_clicks" {
        req target_url: String = "targetUrl" => text(),
        opt utm: String = "utm" => text(),
        opt ip: String = "ip" => text(),
        opt country: String = "country" => text(),
        opt user_agent: String = "userAgent" => text(),
        req created_at: NaiveDateTime = "createdAt" => timestamp(),
        req offer_id: i64 = "offer_id" => references("affiliate_offers", DeletePolicy::Cascade),
    }
}

// ===== Email subscribers & alerts =====

entity! {
    EmailSubscriber, EmailSubscriberCreate, EmailSubscriberUpdate => EMAIL_SUBSCRIBER in "email_subscribers" {
        req email: String = "email" => text().unique(),
        opt locale: String = "locale" => text(),
        opt double_opt_in: bool = "doubleOptIn" => boolean(),
        opt status: String = "status" => text(),
        req created_at: NaiveDateTime = "createdAt" => timestamp(),
        opt unsubscribed_at: NaiveDateTime = "unsubscribedAt" => timestamp(),
    }
}

entity! {
    AlertSubscription, AlertSubscriptionCreate, AlertSubscriptionUpdate => ALERT_SUBSCRIPTION in "alert_subscriptions" {
        req topic_type: TopicType = "topicType" => enumeration(&TOPIC_TYPE),
        req topic_ref: String = "topicRef" => text(),
        req channel: String = "channel" => text(),
        req created_at: NaiveDateTime = "createdAt" => timestamp(),
        req subscriber_id: i64 = "subscriber_id" => references("email_subscribers", DeletePolicy::Cascade),
    }
}
