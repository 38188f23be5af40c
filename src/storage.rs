mod models;
mod postgres;
mod querier;
mod store;

pub use self::{
    models::{Author, Category, CategoryRef, PostRecord, PostRow, PostSummary},
    postgres::{DBPool, migrate, new_db_poll},
    querier::{AdminListFilter, ListingFilter, Querier, admin_list_query, listing_query},
    store::PostStorage,
};
