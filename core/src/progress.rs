use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn default_style() -> ProgressStyle {
    match ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        Ok(style) => style.progress_chars("##-"),
        Err(_) => ProgressStyle::default_bar(),
    }
}

/// Receives progress from a classification run and tells it when to stop.
///
/// Cancellation is cooperative: the run polls [`is_canceled`] once per image,
/// so an image that is being decoded is always finished first.
///
/// [`is_canceled`]: ProgressObserver::is_canceled
pub trait ProgressObserver {
    fn begin_task(&self, name: &str, total: u64);
    fn sub_task(&self, description: &str);
    fn worked(&self, units: u64);
    fn is_canceled(&self) -> bool;
    fn done(&self) {}
}

/// Observer used when the caller does not care about progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn begin_task(&self, _name: &str, _total: u64) {}
    fn sub_task(&self, _description: &str) {}
    fn worked(&self, _units: u64) {}
    fn is_canceled(&self) -> bool {
        false
    }
}

/// Shared cancellation request, settable from another thread or a signal
/// handler.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Returns `true` when it had already been
    /// requested.
    pub fn cancel(&self) -> bool {
        self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives an `indicatif` progress bar.
pub struct BarObserver {
    bar: ProgressBar,
    cancel: CancelFlag,
}

impl BarObserver {
    pub fn new(bar: ProgressBar, cancel: CancelFlag) -> Self {
        bar.set_style(default_style());
        Self { bar, cancel }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl ProgressObserver for BarObserver {
    fn begin_task(&self, name: &str, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_message(name.to_string());
    }

    fn sub_task(&self, description: &str) {
        self.bar.set_message(description.to_string());
    }

    fn worked(&self, units: u64) {
        self.bar.inc(units);
    }

    fn is_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }

    fn done(&self) {
        if self.cancel.is_canceled() {
            self.bar.abandon_with_message("Canceled");
        } else {
            self.bar.finish_with_message("Renaming complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_cancel_is_reported() {
        let flag = CancelFlag::new();
        assert!(!flag.cancel());
        assert!(flag.cancel());
        assert!(flag.is_canceled());
    }

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let handle = flag.clone();
        assert!(!flag.is_canceled());
        handle.cancel();
        assert!(flag.is_canceled());
    }

    #[test]
    fn bar_observer_tracks_position() {
        let cancel = CancelFlag::new();
        let observer = BarObserver::new(ProgressBar::hidden(), cancel.clone());
        observer.begin_task("Renaming images", 3);
        observer.sub_task("Renaming image 1");
        observer.worked(1);
        observer.worked(1);
        assert_eq!(observer.bar().length(), Some(3));
        assert_eq!(observer.bar().position(), 2);
        assert!(!observer.is_canceled());
        cancel.cancel();
        assert!(observer.is_canceled());
        observer.done();
    }
}
