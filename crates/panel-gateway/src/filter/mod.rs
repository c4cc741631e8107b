//! Filter module.

mod logger;
mod session;

pub use logger::LoggingFilter;
pub use session::SessionFilter;

use panel_kernel::gateway::{FilterAction, GatewayContext, GatewayFilter, GatewayResponse};
use std::sync::Arc;

/// Ordered list of boxed filters executed as a pipeline.
///
/// Filters are sorted by [`FilterOrder`](panel_kernel::gateway::FilterOrder)
/// in ascending order (lowest value runs first on the request path).
pub struct FilterPipeline {
    filters: Vec<Arc<dyn GatewayFilter>>,
}

impl FilterPipeline {
    /// Build a pipeline from a list of filters, sorted by their declared order.
    pub fn new(mut filters: Vec<Arc<dyn GatewayFilter>>) -> Self {
        filters.sort_by_key(|f| f.order());
        Self { filters }
    }

    /// Run all filters' `on_request` hooks in ascending order.
    ///
    /// Short-circuits on the first action other than `Continue`.
    pub async fn run_request(&self, ctx: &mut GatewayContext) -> FilterAction {
        for filter in &self.filters {
            match filter.on_request(ctx).await {
                FilterAction::Continue => {}
                other => return other,
            }
        }
        FilterAction::Continue
    }

    /// Run all filters' `on_response` hooks in descending order.
    pub async fn run_response(&self, ctx: &GatewayContext, resp: &mut GatewayResponse) {
        for filter in self.filters.iter().rev() {
            filter.on_response(ctx, resp).await;
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}
