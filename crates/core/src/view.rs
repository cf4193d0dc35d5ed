//! Dashboard state machine.
//!
//! Intents return immediately. A network call is handed back to the caller
//! as a [`PendingCall`]; once it has run, its [`Completion`] is fed to
//! [`ViewController::complete`]. Every intent advances an epoch and a
//! completion is only applied when its epoch is still current, so a late
//! response never overwrites a newer view.

use crate::client::{ClientError, ErrorKind, Operation, RecommendationApi};
use crate::domain::{HistoryEntry, Location, RecommendationResult};
use crate::session::SessionStore;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

const SIGNED_OUT_MESSAGE: &str = "Please sign in to continue.";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    NewSearch,
    Loading,
    ResultShown(RecommendationResult),
    ErrorShown(String),
    HistoryShown(Vec<HistoryEntry>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    operation: Operation,
}

impl Ticket {
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

#[derive(Debug)]
pub enum Outcome {
    Recommend(Result<RecommendationResult, ClientError>),
    History(Result<Vec<HistoryEntry>, ClientError>),
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: Outcome,
}

type CallFuture = Pin<Box<dyn Future<Output = Outcome> + Send>>;

/// An issued call that has not resolved yet. Owns everything it needs, so it
/// can be awaited or spawned independently of the controller.
pub struct PendingCall {
    ticket: Ticket,
    future: CallFuture,
}

impl PendingCall {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub async fn run(self) -> Completion {
        let outcome = self.future.await;
        Completion {
            ticket: self.ticket,
            outcome,
        }
    }
}

impl std::fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCall")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// Returned by [`ViewController::sign_out`]; the caller routes to the
/// unauthenticated screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SignedOut;

pub struct ViewController {
    client: Arc<dyn RecommendationApi>,
    session: SessionStore,
    state: ViewState,
    epoch: u64,
    needs_reauth: bool,
}

impl ViewController {
    pub fn new(client: Arc<dyn RecommendationApi>, session: SessionStore) -> Self {
        Self {
            client,
            session,
            state: ViewState::NewSearch,
            epoch: 0,
            needs_reauth: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// True while the shown error came from a rejected or missing credential.
    pub fn needs_reauth(&self) -> bool {
        self.needs_reauth
    }

    /// Ignored (returns `None`) while a recommendation is loading.
    pub fn search(&mut self, location: Location) -> Option<PendingCall> {
        if self.state == ViewState::Loading {
            tracing::debug!(%location, "search ignored; recommendation already in flight");
            return None;
        }

        let ticket = self.advance(Operation::Recommend);
        self.state = ViewState::Loading;
        self.needs_reauth = false;
        tracing::info!(%location, epoch = ticket.epoch, "requesting recommendation");

        let client = Arc::clone(&self.client);
        let token = self.session.load();
        let future: CallFuture = Box::pin(async move {
            let result = match token {
                Some(token) => client.recommend(location, &token).await,
                None => Err(signed_out(Operation::Recommend)),
            };
            Outcome::Recommend(result)
        });

        Some(PendingCall { ticket, future })
    }

    /// The current view stays on screen until the history arrives.
    pub fn view_history(&mut self) -> PendingCall {
        let ticket = self.advance(Operation::History);
        tracing::info!(epoch = ticket.epoch, "requesting history");

        let client = Arc::clone(&self.client);
        let token = self.session.load();
        let future: CallFuture = Box::pin(async move {
            let result = match token {
                Some(token) => client.history(&token).await,
                None => Err(signed_out(Operation::History)),
            };
            Outcome::History(result)
        });

        PendingCall { ticket, future }
    }

    pub fn reset_to_new_search(&mut self) {
        self.advance(Operation::Recommend);
        self.state = ViewState::NewSearch;
        self.needs_reauth = false;
    }

    pub fn sign_out(&mut self) -> SignedOut {
        self.session.clear();
        self.advance(Operation::Login);
        self.state = ViewState::NewSearch;
        self.needs_reauth = false;
        tracing::info!("signed out");
        SignedOut
    }

    /// Applies a resolved call. Returns `false` when the completion was stale
    /// and has been discarded.
    pub fn complete(&mut self, completion: Completion) -> bool {
        let Completion { ticket, outcome } = completion;
        if ticket.epoch != self.epoch {
            tracing::debug!(
                operation = ticket.operation.as_str(),
                epoch = ticket.epoch,
                current_epoch = self.epoch,
                "discarding stale response"
            );
            return false;
        }

        match outcome {
            Outcome::Recommend(Ok(result)) => {
                tracing::info!(
                    recommended_date = %result.recommended_date,
                    predicted_price = result.predicted_price,
                    "recommendation received"
                );
                self.state = ViewState::ResultShown(result);
            }
            Outcome::History(Ok(entries)) => {
                tracing::info!(entries = entries.len(), "history received");
                self.state = ViewState::HistoryShown(entries);
            }
            Outcome::Recommend(Err(err)) | Outcome::History(Err(err)) => self.fail(err),
        }
        true
    }

    pub async fn search_and_wait(&mut self, location: Location) -> &ViewState {
        if let Some(call) = self.search(location) {
            let completion = call.run().await;
            self.complete(completion);
        }
        &self.state
    }

    pub async fn view_history_and_wait(&mut self) -> &ViewState {
        let completion = self.view_history().run().await;
        self.complete(completion);
        &self.state
    }

    fn advance(&mut self, operation: Operation) -> Ticket {
        self.epoch += 1;
        Ticket {
            epoch: self.epoch,
            operation,
        }
    }

    fn fail(&mut self, err: ClientError) {
        tracing::warn!(
            operation = err.operation().as_str(),
            kind = ?err.kind(),
            error = %err,
            "showing error"
        );
        self.needs_reauth = err.is_auth();
        self.state = ViewState::ErrorShown(err.to_string());
    }
}

fn signed_out(operation: Operation) -> ClientError {
    ClientError::new(ErrorKind::Auth, operation, Some(SIGNED_OUT_MESSAGE.to_string()))
}
