mod post;
mod sort;
mod trashed;

pub use self::{
    post::{FormOperation, PostForm, derive_slug},
    sort::SortDirection,
    trashed::TrashedFilter,
};
