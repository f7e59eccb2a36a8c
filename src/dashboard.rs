use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::binder::surface::Surface;
use crate::binder::Binder;
use crate::client::{ClientError, OptimizerApi};
use crate::history::aggregator::aggregate_history;
use crate::history::HistorySummary;
use crate::report::{build_view, OptimizationView};
use crate::types::{Food, OptimizeRequest};

pub async fn bounded<T, F>(label: &str, limit: Duration, action: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match tokio::time::timeout(limit, action).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout {
            url: label.to_string(),
            after: limit,
        }),
    }
}

pub struct Dashboard {
    api: Arc<dyn OptimizerApi>,
    binder: Binder,
    timeout: Duration,
}

impl Dashboard {
    pub fn new(api: Arc<dyn OptimizerApi>, timeout: Duration) -> Self {
        Self {
            api,
            binder: Binder::new(),
            timeout,
        }
    }

    pub async fn submit(
        &mut self,
        surface: &mut dyn Surface,
        request: &OptimizeRequest,
    ) -> Result<OptimizationView, ClientError> {
        self.binder.begin_optimization(surface);
        let outcome = bounded(
            "optimize",
            self.timeout,
            self.api.submit_optimization(request),
        )
        .await;
        match outcome {
            Ok(outcome) => {
                let view = build_view(&outcome, &request.targets, request.budget);
                self.binder.render_view(surface, &view);
                Ok(view)
            }
            Err(err) => {
                warn!("optimization failed: {err}");
                self.binder.render_failure(surface, err.user_message());
                Err(err)
            }
        }
    }

    pub async fn load_history(
        &mut self,
        surface: &mut dyn Surface,
    ) -> Result<HistorySummary, ClientError> {
        match bounded("history", self.timeout, self.api.list_history()).await {
            Ok(entries) => {
                let summary = aggregate_history(&entries);
                debug!("history has {} rows", summary.rows.len());
                self.binder.render_history(surface, &summary);
                Ok(summary)
            }
            Err(err) => {
                warn!("loading history failed: {err}");
                self.binder.render_status_error(surface, err.user_message());
                Err(err)
            }
        }
    }

    pub async fn load_foods(&mut self, surface: &mut dyn Surface) -> Result<Vec<Food>, ClientError> {
        match bounded("foods", self.timeout, self.api.list_foods()).await {
            Ok(foods) => {
                self.binder.render_foods(surface, &foods);
                Ok(foods)
            }
            Err(err) => {
                warn!("loading foods failed: {err}");
                self.binder.render_status_error(surface, err.user_message());
                Err(err)
            }
        }
    }

    pub async fn add_food(
        &mut self,
        surface: &mut dyn Surface,
        food: &Food,
    ) -> Result<Vec<Food>, ClientError> {
        if let Err(err) = bounded("add food", self.timeout, self.api.create_food(food)).await {
            warn!("adding food {} failed: {err}", food.name);
            self.binder.render_status_error(surface, err.user_message());
            return Err(err);
        }
        self.load_foods(surface).await
    }

    pub async fn delete_food(
        &mut self,
        surface: &mut dyn Surface,
        name: &str,
    ) -> Result<Vec<Food>, ClientError> {
        if let Err(err) = bounded("delete food", self.timeout, self.api.delete_food(name)).await {
            warn!("deleting food {name} failed: {err}");
            self.binder.render_status_error(surface, err.user_message());
            return Err(err);
        }
        self.load_foods(surface).await
    }

    pub fn close(&mut self, surface: &mut dyn Surface) {
        self.binder.release(surface);
    }
}
