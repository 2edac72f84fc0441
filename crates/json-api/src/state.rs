//! State

use std::{fmt, sync::Arc};

use forno_app::{context::AppContext, domain::orders::OrdersService};

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) orders: Arc<dyn OrdersService>,
}

impl State {
    #[must_use]
    pub(crate) fn new(orders: Arc<dyn OrdersService>) -> Self {
        Self { orders }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: &AppContext) -> Arc<Self> {
        Arc::new(Self::new(app.orders.clone()))
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State").finish_non_exhaustive()
    }
}
