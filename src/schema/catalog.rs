//! The closed catalog: every entity, in dependency order (referenced tables first).

use super::entities::*;
use super::{Column, DeletePolicy, EntityDef};

pub static CATALOG: &[&EntityDef] = &[
    &CITY,
    &VENUE,
    &COMPETITION,
    &SEASON,
    &STAGE,
    &TEAM,
    &MATCH,
    &PAGE,
    &PAGE_BLOCK,
    &AFFILIATE_PARTNER,
    &AFFILIATE_OFFER,
    &OUTBOUND_CLICK,
    &EMAIL_SUBSCRIBER,
    &ALERT_SUBSCRIPTION,
];

/// A foreign-key column in `entity` that points at some parent table.
#[derive(Clone, Copy, Debug)]
pub struct Dependent {
    pub entity: &'static EntityDef,
    pub column: &'static Column,
    pub on_delete: DeletePolicy,
}

/// Every column in the catalog referencing `table`, with its delete policy.
pub fn dependents_of(catalog: &[&'static EntityDef], table: &str) -> Vec<Dependent> {
    catalog
        .iter()
        .flat_map(|&entity| {
            entity.references_to(table).filter_map(move |column| {
                column.references.map(|fk| Dependent {
                    entity,
                    column,
                    on_delete: fk.on_delete,
                })
            })
        })
        .collect()
}
