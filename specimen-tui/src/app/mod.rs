//! Application state and main event loop.

mod events;
mod form;
mod panel;
mod render;

pub use form::OptionsForm;
pub use panel::TaxonomyPanel;

use std::io;
use std::time::Instant;

use crossterm::event::EventStream;
use futures::StreamExt;
use log::{debug, error, info};
use specimen_lib::SpecimenClient;
use specimen_lib::error::ApiError;
use specimen_lib::model::{QueryResponse, TaxonNode};
use tokio::sync::mpsc;

use crate::terminal::TerminalGuard;

/// Which pane receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tree,
    Search,
    Options,
    Results,
}

impl Focus {
    /// Tab order. Search is entered with `/`, not Tab.
    fn next(self) -> Self {
        match self {
            Self::Tree | Self::Search => Self::Options,
            Self::Options => Self::Results,
            Self::Results => Self::Tree,
        }
    }
}

/// Taxonomy pane lifecycle.
#[derive(Debug)]
pub enum TaxonomyView {
    Loading,
    /// Fetch failed; the message replaces the tree.
    Failed(String),
    Ready(TaxonomyPanel),
}

/// Results of background tasks, delivered to the event loop.
#[derive(Debug)]
pub enum Message {
    TaxonomyLoaded(Result<Vec<TaxonNode>, ApiError>),
    QueryBuilt {
        /// Pretty-printed request body, shown for inspection.
        sent: String,
        result: Result<QueryResponse, ApiError>,
    },
}

/// SQL and rows of the last submitted query.
#[derive(Debug, Default)]
pub struct ResultsView {
    pub sql: Option<String>,
    pub sent: Option<String>,
    pub response: Option<QueryResponse>,
    pub scroll_offset: usize,
}

pub struct App {
    client: SpecimenClient,
    taxonomy: TaxonomyView,
    form: OptionsForm,
    results: ResultsView,
    focus: Focus,
    status: String,
    query_in_flight: bool,
    should_quit: bool,
    tx: mpsc::UnboundedSender<Message>,
}

impl App {
    pub fn new(client: SpecimenClient) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Self {
            client,
            taxonomy: TaxonomyView::Loading,
            form: OptionsForm::new(),
            results: ResultsView::default(),
            focus: Focus::Tree,
            status: "Loading taxonomy...".to_string(),
            query_in_flight: false,
            should_quit: false,
            tx,
        };
        (app, rx)
    }

    pub fn taxonomy(&self) -> &TaxonomyView {
        &self.taxonomy
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Fetches the taxonomy once in the background.
    fn start_loading(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_taxonomy().await;
            let _ = tx.send(Message::TaxonomyLoaded(result));
        });
    }

    /// Posts the current form state in the background.
    fn submit_query(&mut self) {
        if self.query_in_flight {
            return;
        }

        let taxonomy = match &self.taxonomy {
            TaxonomyView::Ready(panel) => panel.selection(),
            _ => Vec::new(),
        };
        let state = self.form.query_state(taxonomy);
        let sent = serde_json::to_string_pretty(&state).unwrap_or_default();

        self.query_in_flight = true;
        self.status = "Building query...".to_string();

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.build_query(&state).await;
            let _ = tx.send(Message::QueryBuilt { sent, result });
        });
    }

    pub fn handle_message(&mut self, message: Message) {
        match message {
            Message::TaxonomyLoaded(Ok(forest)) => {
                let panel = TaxonomyPanel::new(forest);
                info!("Taxonomy ready: {} taxa", panel.tree().len());
                self.form.set_ranks(panel.tree().ranks());
                self.status = format!("Taxonomy loaded: {} taxa", panel.tree().len());
                self.taxonomy = TaxonomyView::Ready(panel);
            }
            Message::TaxonomyLoaded(Err(e)) => {
                error!("Taxonomy fetch failed: {}", e);
                self.taxonomy = TaxonomyView::Failed(format!("Failed to load taxonomy: {}", e));
                self.status = "Error loading taxonomy".to_string();
                if self.focus == Focus::Search {
                    self.focus = Focus::Tree;
                }
            }
            Message::QueryBuilt { sent, result } => {
                self.query_in_flight = false;
                self.results.sent = Some(sent);
                self.results.scroll_offset = 0;
                match result {
                    Ok(response) => {
                        debug!("Query returned {} rows", response.row_count());
                        self.status = format!(
                            "Query built successfully, {} results loaded.",
                            response.row_count()
                        );
                        self.results.sql = response.sql.clone();
                        self.results.response = Some(response);
                    }
                    Err(e) => {
                        error!("Query build failed: {}", e);
                        self.results.sql = Some(format!("Error: {}", e));
                        self.results.response = None;
                        self.status = "Error building query".to_string();
                    }
                }
            }
        }
    }

    fn panel_mut(&mut self) -> Option<&mut TaxonomyPanel> {
        match &mut self.taxonomy {
            TaxonomyView::Ready(panel) => Some(panel),
            _ => None,
        }
    }

    fn highlight_deadline(&self) -> Option<Instant> {
        match &self.taxonomy {
            TaxonomyView::Ready(panel) => panel.highlight_deadline(),
            _ => None,
        }
    }

    /// Runs until the user quits.
    pub async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<Message>,
        terminal: &mut TerminalGuard,
    ) -> io::Result<()> {
        let mut events = EventStream::new();
        self.start_loading();

        let mut dirty = true;
        while !self.should_quit {
            if dirty {
                let (width, height) = terminal.size()?;
                let frame = render::frame(&mut self, width, height, Instant::now());
                terminal.draw(&frame)?;
                dirty = false;
            }

            let deadline = self.highlight_deadline();
            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(event)) => dirty = self.handle_event(event),
                    Some(Err(e)) => error!("Event stream error: {}", e),
                    None => break,
                },
                Some(message) = rx.recv() => {
                    self.handle_message(message);
                    dirty = true;
                }
                _ = sleep_until_optional(deadline) => {
                    let now = Instant::now();
                    dirty = self.panel_mut().is_some_and(|p| p.clear_expired_highlight(now));
                }
            }
        }

        info!("Quit requested");
        Ok(())
    }
}

async fn sleep_until_optional(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let client = SpecimenClient::builder()
            .url("http://127.0.0.1:9")
            .build()
            .unwrap();
        App::new(client).0
    }

    fn forest() -> Vec<TaxonNode> {
        vec![TaxonNode::new("Root", None).with_child(
            TaxonNode::new("Kingdom A", Some("kingdom"))
                .with_child(TaxonNode::new("Genus X", Some("genus"))),
        )]
    }

    #[test]
    fn test_failed_load_shows_error_only() {
        let mut app = app();
        app.handle_message(Message::TaxonomyLoaded(Err(ApiError::http(502, "Bad Gateway"))));

        match app.taxonomy() {
            TaxonomyView::Failed(message) => {
                assert_eq!(message, "Failed to load taxonomy: HTTP 502: Bad Gateway")
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(app.status(), "Error loading taxonomy");
    }

    #[test]
    fn test_loaded_taxonomy_feeds_ranks() {
        let mut app = app();
        app.handle_message(Message::TaxonomyLoaded(Ok(forest())));

        assert!(matches!(app.taxonomy(), TaxonomyView::Ready(_)));
        assert_eq!(app.status(), "Taxonomy loaded: 3 taxa");
        app.form.cycle(true);
        assert_eq!(app.form.rows()[0].value, "kingdom");
    }

    #[test]
    fn test_query_error_goes_to_sql_pane() {
        let mut app = app();
        app.query_in_flight = true;
        app.handle_message(Message::QueryBuilt {
            sent: "{}".to_string(),
            result: Err(ApiError::http(500, "boom")),
        });

        assert!(!app.query_in_flight);
        assert_eq!(app.results.sql.as_deref(), Some("Error: HTTP 500: boom"));
        assert_eq!(app.status(), "Error building query");
    }

    #[test]
    fn test_query_success() {
        let mut app = app();
        let response = QueryResponse {
            sql: Some("SELECT *".into()),
            total_count: Some(7),
            ..Default::default()
        };
        app.handle_message(Message::QueryBuilt {
            sent: "{}".to_string(),
            result: Ok(response),
        });

        assert_eq!(app.results.sql.as_deref(), Some("SELECT *"));
        assert_eq!(app.status(), "Query built successfully, 7 results loaded.");
    }
}
