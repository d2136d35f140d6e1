//! A progress spinner with an owned stop flag.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// A background spinner on stderr for the duration of a blocking call.
///
/// The spinner shares nothing with the work it decorates except its stop
/// flag. [`stop`](Spinner::stop) signals and joins the thread and clears
/// the line, so the caller reads its result on a clean terminal; dropping
/// a spinner does the same, so one can never outlive its call site.
pub struct Spinner {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start spinning next to `message`.
    pub fn start(message: &str) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let message = message.to_string();

        let handle = thread::spawn(move || {
            let mut frame = 0usize;
            while !flag.load(Ordering::Relaxed) {
                eprint!("\r{} {message}", FRAMES[frame % FRAMES.len()]);
                let _ = io::stderr().flush();
                frame += 1;
                thread::sleep(FRAME_INTERVAL);
            }
            eprint!("\r{}\r", " ".repeat(message.chars().count() + 2));
            let _ = io::stderr().flush();
        });

        Self { stop, handle: Some(handle) }
    }

    /// Signal the spinner to stop and wait for it to clear the line.
    pub fn stop(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_joins_the_background_thread() {
        let spinner = Spinner::start("working");
        thread::sleep(Duration::from_millis(30));
        // Returning at all proves the join; a leaked thread would hang here.
        spinner.stop();
    }

    #[test]
    fn drop_also_stops_the_spinner() {
        let spinner = Spinner::start("working");
        drop(spinner);
    }
}
