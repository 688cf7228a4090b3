use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::NoteDuration;
use crate::scheduler::Scheduler;

/// Extra delay after the last replayed note before playback is considered
/// finished, so the final chime can ring out.
pub const PLAYBACK_SETTLE_MS: u64 = 1000;

/// Anything that can sound a named note. The engine handle implements
/// this; tests substitute a capturing fake.
pub trait NoteSink: Send + Sync {
    fn trigger_note(&self, note: &str, duration: NoteDuration);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNote {
    pub note: String,
    /// Milliseconds since the recording session started.
    pub time_ms: u64,
}

/// Captures a timestamped note sequence and replays it with its original
/// relative timing. At most one session records at a time, and at most
/// one playback is in flight.
pub struct NoteRecorder {
    sink: Arc<dyn NoteSink>,
    scheduler: Scheduler,
    recording: bool,
    epoch: Instant,
    notes: Vec<RecordedNote>,
    playing: Arc<AtomicBool>,
}

impl NoteRecorder {
    pub fn new(sink: Arc<dyn NoteSink>, scheduler: Scheduler) -> Self {
        Self {
            sink,
            scheduler,
            recording: false,
            epoch: Instant::now(),
            notes: Vec::new(),
            playing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Starts a new session, discarding any previously recorded notes.
    pub fn start(&mut self) {
        self.recording = true;
        self.notes.clear();
        self.epoch = Instant::now();
        debug!("recording started");
    }

    /// No-op when no session is active.
    pub fn stop(&mut self) {
        if self.recording {
            self.recording = false;
            debug!(notes = self.notes.len(), "recording stopped");
        }
    }

    /// Appends a note at the current session offset. No-op outside a
    /// session. Rapid calls may land on identical timestamps; nothing is
    /// deduplicated or quantized.
    pub fn record(&mut self, note: &str) {
        if !self.recording {
            return;
        }

        self.notes.push(RecordedNote {
            note: note.to_string(),
            time_ms: self.epoch.elapsed().as_millis() as u64,
        });
    }

    /// Schedules every recorded note against its original offset and
    /// returns immediately. No-op when the buffer is empty or a previous
    /// playback has not settled yet. In-flight notes cannot be cancelled.
    pub fn play(&self, duration: NoteDuration) {
        if self.notes.is_empty() {
            return;
        }
        if self.playing.swap(true, Ordering::SeqCst) {
            debug!("playback already in flight, ignoring");
            return;
        }

        let mut last_ms = 0;
        for recorded in &self.notes {
            let sink = self.sink.clone();
            let note = recorded.note.clone();

            let scheduled = self
                .scheduler
                .schedule(Duration::from_millis(recorded.time_ms), move || {
                    sink.trigger_note(&note, duration);
                });
            if let Err(e) = scheduled {
                warn!("failed to schedule note: {}", e);
            }

            last_ms = last_ms.max(recorded.time_ms);
        }

        let playing = self.playing.clone();
        let settle = Duration::from_millis(last_ms + PLAYBACK_SETTLE_MS);
        if self
            .scheduler
            .schedule(settle, move || playing.store(false, Ordering::SeqCst))
            .is_err()
        {
            self.playing.store(false, Ordering::SeqCst);
        }
    }

    /// Empties the buffer regardless of recording or playback state.
    pub fn clear(&mut self) {
        self.notes.clear();
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn notes(&self) -> &[RecordedNote] {
        &self.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct CaptureSink {
        triggered: Mutex<Vec<String>>,
    }

    impl NoteSink for CaptureSink {
        fn trigger_note(&self, note: &str, _duration: NoteDuration) {
            self.triggered.lock().push(note.to_string());
        }
    }

    fn recorder_with_sink() -> (NoteRecorder, Arc<CaptureSink>) {
        let sink = Arc::new(CaptureSink::default());
        let recorder = NoteRecorder::new(sink.clone(), Scheduler::new());
        (recorder, sink)
    }

    #[test]
    fn session_captures_notes_in_order() {
        let (mut recorder, _sink) = recorder_with_sink();

        recorder.start();
        recorder.record("C4");
        std::thread::sleep(Duration::from_millis(15));
        recorder.record("E4");
        recorder.stop();

        let notes = recorder.notes();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].note, "C4");
        assert_eq!(notes[1].note, "E4");
        assert!(notes[0].time_ms < 50, "first note should be near the epoch");
        assert!(notes[0].time_ms <= notes[1].time_ms);
    }

    #[test]
    fn record_while_inactive_is_ignored() {
        let (mut recorder, _sink) = recorder_with_sink();

        recorder.record("C4");
        assert!(recorder.notes().is_empty());

        recorder.start();
        recorder.record("C4");
        recorder.stop();
        recorder.record("E4");
        assert_eq!(recorder.notes().len(), 1);
    }

    #[test]
    fn start_discards_the_previous_session() {
        let (mut recorder, _sink) = recorder_with_sink();

        recorder.start();
        recorder.record("C4");
        recorder.stop();

        recorder.start();
        assert!(recorder.notes().is_empty());
    }

    #[test]
    fn play_on_empty_buffer_is_a_no_op() {
        let (recorder, sink) = recorder_with_sink();

        recorder.play(NoteDuration::Half);

        assert!(!recorder.is_playing());
        std::thread::sleep(Duration::from_millis(40));
        assert!(sink.triggered.lock().is_empty());
    }

    #[test]
    fn playback_replays_the_recorded_order() {
        let (mut recorder, sink) = recorder_with_sink();

        recorder.start();
        for note in ["C4", "E4", "G4"] {
            recorder.record(note);
        }
        recorder.stop();

        recorder.play(NoteDuration::Half);
        assert!(recorder.is_playing());

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(*sink.triggered.lock(), vec!["C4", "E4", "G4"]);
    }

    #[test]
    fn overlapping_playback_is_rejected() {
        let (mut recorder, sink) = recorder_with_sink();

        recorder.start();
        recorder.record("A4");
        recorder.stop();

        recorder.play(NoteDuration::Half);
        recorder.play(NoteDuration::Half);

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(sink.triggered.lock().len(), 1);
        assert!(recorder.is_playing(), "still inside the settle margin");
    }

    #[test]
    fn playing_flag_resets_after_the_settle_margin() {
        let (mut recorder, _sink) = recorder_with_sink();

        recorder.start();
        recorder.record("A4");
        recorder.stop();

        recorder.play(NoteDuration::Half);
        std::thread::sleep(Duration::from_millis(PLAYBACK_SETTLE_MS + 300));
        assert!(!recorder.is_playing());
    }

    #[test]
    fn clear_empties_the_buffer_in_any_state() {
        let (mut recorder, _sink) = recorder_with_sink();

        recorder.start();
        recorder.record("C4");
        recorder.clear();
        assert!(recorder.notes().is_empty());
        assert!(recorder.is_recording());

        recorder.record("D4");
        recorder.stop();
        recorder.clear();
        assert!(recorder.notes().is_empty());
    }
}
