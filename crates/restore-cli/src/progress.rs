use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use restore_core::pipeline::{PipelineStage, ProgressReporter};

/// Drives one indicatif bar per pipeline stage.
#[derive(Default)]
pub struct BarReporter {
    current: Mutex<Option<ProgressBar>>,
}

impl BarReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn stage_bar(stage: PipelineStage, total_items: Option<usize>) -> ProgressBar {
    let bar = match total_items {
        Some(total) => {
            let bar = ProgressBar::new(total as u64);
            let template = ProgressStyle::default_bar().template("{msg:16} [{bar:40}] {pos}/{len}");
            if let Ok(style) = template {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
                bar.set_style(style);
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        }
    };
    bar.set_message(stage.to_string());
    bar
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(stage_bar(stage, total_items));
        }
    }

    fn advance(&self, items_done: usize) {
        if let Ok(current) = self.current.lock() {
            if let Some(bar) = current.as_ref() {
                bar.set_position(items_done as u64);
            }
        }
    }

    fn finish_stage(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(bar) = current.take() {
                bar.finish_and_clear();
            }
        }
    }
}
