// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod dashboard;
pub mod detail;
pub mod forms;
pub mod ids;
pub mod list;
pub mod model;
pub mod mutation;
pub mod reconcile;
pub mod related;
pub mod search;
pub mod state;
pub mod store;
pub mod templates;

pub use dashboard::*;
pub use detail::*;
pub use forms::*;
pub use ids::*;
pub use list::*;
pub use model::*;
pub use mutation::*;
pub use reconcile::*;
pub use related::*;
pub use search::*;
pub use state::*;
pub use store::*;
pub use templates::*;
