use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::{is_date_sentinel, Precision};

use super::{TimeResolver, TimeSource};

/// Live preview for one date input field.
///
/// Each edit of the field goes through [`DatePreview::on_input`]. When the text is
/// the sentinel, the date is resolved on a background task and delivered on the
/// receiver returned by [`DatePreview::new`]. At most one resolution is in flight:
/// a newer request, or an edit away from the sentinel, aborts the older one.
///
/// Must be driven from within a tokio runtime.
pub struct DatePreview<S> {
    resolver: TimeResolver<S>,
    precision: Precision,
    results: mpsc::UnboundedSender<String>,
    in_flight: Option<JoinHandle<()>>,
}

impl<S> DatePreview<S>
where
    S: TimeSource + Clone + 'static,
{
    pub fn new(
        resolver: TimeResolver<S>,
        precision: Precision,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (results, receiver) = mpsc::unbounded_channel();
        let preview = Self {
            resolver,
            precision,
            results,
            in_flight: None,
        };
        (preview, receiver)
    }

    /// React to the field's current text. Returns true if a resolution was started.
    pub fn on_input(&mut self, text: &str) -> bool {
        self.cancel();
        if !is_date_sentinel(text) {
            return false;
        }

        let resolver = self.resolver.clone();
        let results = self.results.clone();
        let precision = self.precision;

        self.in_flight = Some(tokio::spawn(async move {
            let date = resolver.resolve_date(precision).await;
            // Receiver gone means the field went away; nothing to deliver to
            let _ = results.send(date);
        }));
        true
    }

    /// Abort the in-flight resolution, if any.
    pub fn cancel(&mut self) {
        if let Some(task) = self.in_flight.take() {
            if !task.is_finished() {
                debug!("superseding in-flight date preview");
            }
            task.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl<S> Drop for DatePreview<S> {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}
