//! Application controller.
//!
//! [`App`] owns the one piece of mutable state: which [`Screen`] is shown and
//! the data that screen needs. Rendering reads it; user actions go through
//! the methods below.

use capture::{PendingQuery, UploadSink};
use catalog::{project, FilterState, MatchOutcome, Product, QuickFilter};
use client::{ClientError, MatchService};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// A submission is in flight; the upload control is disabled.
    #[error("a search is already in progress")]
    Busy,
    /// Filters only exist while results are shown.
    #[error("no results to filter; run a search first")]
    NoResults,
    /// `finish` was called with nothing in flight.
    #[error("no search in progress")]
    Idle,
}

/// What the user is looking at.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// Waiting for an image. `error` is the message from the last failed search.
    Upload { error: Option<String> },
    /// A query has been submitted and the answer is pending.
    Loading { query: PendingQuery },
    /// The service answered; `filters` narrow what is shown.
    Results {
        query: PendingQuery,
        outcome: MatchOutcome,
        filters: FilterState,
    },
}

impl Default for Screen {
    fn default() -> Self {
        Screen::Upload { error: None }
    }
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Upload { .. } => "upload",
            Screen::Loading { .. } => "loading",
            Screen::Results { .. } => "results",
        }
    }
}

#[derive(Debug, Default)]
pub struct App {
    screen: Screen,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.screen, Screen::Loading { .. })
    }

    /// Message from the last failed search, while on the upload screen.
    pub fn error(&self) -> Option<&str> {
        match &self.screen {
            Screen::Upload { error } => error.as_deref(),
            _ => None,
        }
    }

    pub fn query(&self) -> Option<&PendingQuery> {
        match &self.screen {
            Screen::Loading { query } | Screen::Results { query, .. } => Some(query),
            Screen::Upload { .. } => None,
        }
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        match &self.screen {
            Screen::Results { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn filters(&self) -> Option<&FilterState> {
        match &self.screen {
            Screen::Results { filters, .. } => Some(filters),
            _ => None,
        }
    }

    /// Enter the loading state for `query`. Any previous results and error
    /// are dropped.
    pub fn begin(&mut self, query: PendingQuery) -> Result<(), AppError> {
        if self.is_loading() {
            tracing::debug!("submission ignored while loading");
            return Err(AppError::Busy);
        }
        tracing::info!(kind = ?query.kind(), source = %query.describe(), "search started");
        self.screen = Screen::Loading { query };
        Ok(())
    }

    /// Leave the loading state with the service's answer.
    pub fn finish(&mut self, result: Result<MatchOutcome, ClientError>) -> Result<(), AppError> {
        let query = match std::mem::take(&mut self.screen) {
            Screen::Loading { query } => query,
            other => {
                self.screen = other;
                return Err(AppError::Idle);
            }
        };

        self.screen = match result {
            Ok(outcome) => {
                tracing::info!(
                    products = outcome.products.len(),
                    brands = outcome.brand_facets.len(),
                    "showing results"
                );
                Screen::Results {
                    query,
                    outcome,
                    filters: FilterState::default(),
                }
            }
            Err(err) => {
                tracing::warn!(
                    category = err.category().as_str(),
                    error = %err,
                    source = %query.describe(),
                    "search failed"
                );
                Screen::Upload {
                    error: Some(err.user_message().to_string()),
                }
            }
        };
        Ok(())
    }

    /// Submit `query` to `service` and wait for the answer.
    ///
    /// Returns `Err(AppError::Busy)` without contacting the service when a
    /// search is already running. Service failures are not errors here; they
    /// land on the upload screen as a message.
    pub async fn submit(
        &mut self,
        query: PendingQuery,
        service: &dyn MatchService,
    ) -> Result<(), AppError> {
        self.begin(query.clone())?;
        let result = service.submit_query(&query).await;
        self.finish(result)
    }

    /// Back to the upload screen, discarding query, results and filters.
    pub fn new_search(&mut self) -> Result<(), AppError> {
        if self.is_loading() {
            return Err(AppError::Busy);
        }
        tracing::info!(from = self.screen.name(), "new search");
        self.screen = Screen::default();
        Ok(())
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> Result<(), AppError> {
        self.filters_mut()?.set_search_text(text);
        Ok(())
    }

    /// Set the minimum similarity; values above 100 are clamped.
    pub fn set_threshold(&mut self, percent: u8) -> Result<(), AppError> {
        self.filters_mut()?.set_threshold(percent);
        Ok(())
    }

    pub fn apply_quick_filter(&mut self, quick: QuickFilter) -> Result<(), AppError> {
        self.filters_mut()?.apply_quick_filter(quick);
        Ok(())
    }

    /// Add a brand to the selection; selecting it twice is a no-op.
    pub fn select_brand(&mut self, brand: &str) -> Result<(), AppError> {
        self.filters_mut()?.select_brand(brand);
        Ok(())
    }

    /// Flip a brand's selection. Returns whether it is now selected.
    pub fn toggle_brand(&mut self, brand: &str) -> Result<bool, AppError> {
        Ok(self.filters_mut()?.toggle_brand(brand))
    }

    /// Threshold back to the default and brands cleared; search text stays.
    pub fn reset_filters(&mut self) -> Result<(), AppError> {
        self.filters_mut()?.reset();
        Ok(())
    }

    /// Products passing the current filters, in service order.
    pub fn visible_products(&self) -> Vec<&Product> {
        match &self.screen {
            Screen::Results {
                outcome, filters, ..
            } => project(&outcome.products, filters),
            _ => Vec::new(),
        }
    }

    fn filters_mut(&mut self) -> Result<&mut FilterState, AppError> {
        match &mut self.screen {
            Screen::Results { filters, .. } => Ok(filters),
            _ => Err(AppError::NoResults),
        }
    }
}

/// Upload sink holding the most recent accepted query until the controller
/// takes it.
#[derive(Debug, Default)]
pub struct QuerySlot(Option<PendingQuery>);

impl QuerySlot {
    pub fn take(&mut self) -> Option<PendingQuery> {
        self.0.take()
    }
}

impl UploadSink for QuerySlot {
    fn on_upload(&mut self, query: PendingQuery) {
        self.0 = Some(query);
    }
}
