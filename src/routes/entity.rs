//! Entity CRUD routes, one resource per catalog entity at `/<table>` and `/<table>/:id`,
//! plus the relationship sub-paths.

use crate::handlers::entity::{create, delete, list, read, update};
use crate::handlers::relations::{children, team_matches};
use crate::schema::*;
use crate::service::Validate;
use crate::state::AppState;
use axum::{routing::get, Router};

fn resource<E>() -> Router<AppState>
where
    E: Entity,
    E::Create: Validate,
    E::Update: Validate,
{
    let base = format!("/{}", E::def().table);
    Router::new()
        .route(&base, get(list::<E>).post(create::<E>))
        .route(
            &format!("{}/:id", base),
            get(read::<E>).patch(update::<E>).delete(delete::<E>),
        )
}

fn relation_routes() -> Router<AppState> {
    Router::new()
        .route("/cities/:id/venues", get(children::<City, Venue>))
        .route("/competitions/:id/seasons", get(children::<Competition, Season>))
        .route("/seasons/:id/stages", get(children::<Season, Stage>))
        .route("/seasons/:id/matches", get(children::<Season, Match>))
        .route("/stages/:id/matches", get(children::<Stage, Match>))
        .route("/venues/:id/matches", get(children::<Venue, Match>))
        .route("/teams/:id/matches", get(team_matches))
        .route("/pages/:id/blocks", get(children::<Page, PageBlock>))
        .route("/affiliate_partners/:id/offers", get(children::<AffiliatePartner, AffiliateOffer>))
        .route("/affiliate_offers/:id/clicks", get(children::<AffiliateOffer, OutboundClick>))
        .route(
            "/email_subscribers/:id/subscriptions",
            get(children::<EmailSubscriber, AlertSubscription>),
        )
}

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .merge(resource::<City>())
        .merge(resource::<Venue>())
        .merge(resource::<Competition>())
        .merge(resource::<Season>())
        .merge(resource::<Stage>())
        .merge(resource::<Team>())
        .merge(resource::<Match>())
        .merge(resource::<Page>())
        .merge(resource::<PageBlock>())
        .merge(resource::<AffiliatePartner>())
        .merge(resource::<AffiliateOffer>())
        .merge(resource::<OutboundClick>())
        .merge(resource::<EmailSubscriber>())
        .merge(resource::<AlertSubscription>())
        .merge(relation_routes())
        .with_state(state)
}
