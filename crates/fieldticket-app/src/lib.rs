// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod editor;
pub mod forms;
pub mod ids;
pub mod model;
pub mod options;
pub mod paging;
pub mod profile;
pub mod query;
pub mod reconcile;
pub mod screen;
pub mod session;
pub mod wire;

pub use editor::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use options::*;
pub use profile::*;
pub use reconcile::{Keyed, NestedEditPolicy, merge, merge_with_policy, without_deleted};
pub use screen::*;
pub use session::*;
