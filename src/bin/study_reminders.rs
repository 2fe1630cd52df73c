//! Loads the tasks stored in a folder, prints them, and sends reminders for them until interrupted.
//!
//! Usage: `study-reminders [DATA_FOLDER]`. Set `RUST_LOG=info` to see the reminders.

use std::path::PathBuf;

use study_tracker::clock::SystemClock;
use study_tracker::config::DEFAULT_DATA_FOLDER;
use study_tracker::notifier::LogNotifier;
use study_tracker::storage::FileStorage;
use study_tracker::Tracker;


#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let folder = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FOLDER));
    log::info!("Using data folder {:?}", folder);

    let storage = FileStorage::new(&folder);
    let mut tracker = Tracker::new(storage, SystemClock, LogNotifier::new());

    let model = tracker.render();
    if model.is_empty() {
        println!("No tasks yet.");
    }
    for line in &model.visible_tasks {
        println!("  {}", line);
    }
    for progress in &model.category_progress {
        println!("  {}", progress);
    }

    tracker.start().await;
    tracker.run_reminders().await;
}
