use indicatif::{ProgressBar, ProgressStyle};
use mediapart_library::{IngestEvent, Observer};
use std::path::Path;
use std::time::Duration;

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar driven by [`IngestEvent`]s. The length is set by the counting pass.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        let bar = match enabled {
            true => ProgressBar::new(0),
            false => ProgressBar::hidden(),
        };
        bar.set_style(ProgressStyle::with_template(TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar()));
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn advance(&self, source: &Path) {
        if let Some(name) = source.file_name() {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }
        self.bar.inc(1);
    }

    #[cfg(test)]
    fn position(&self) -> (u64, Option<u64>) {
        (self.bar.position(), self.bar.length())
    }
}

impl Observer for Progress {
    fn on_event(&self, event: &IngestEvent) {
        match event {
            IngestEvent::Discovered(total) => self.bar.set_length(*total),
            IngestEvent::Ingested(ingested) => self.advance(&ingested.source),
            IngestEvent::Failed { source, .. } => self.advance(source),
        }
    }
}
