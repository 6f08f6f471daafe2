mod annotate;
mod cache;
mod db;
mod provider;
mod resolver;
mod types;

pub(crate) use annotate::annotate_costs;
pub(crate) use db::PricingDb;
pub(crate) use types::{NoPricing, PricingSource};
