pub mod config;
pub mod engine;
pub mod patch;
pub mod pitch;
pub mod recorder;
pub mod scheduler;
pub mod synth;
pub mod ui;

pub use config::NoteDuration;
pub use engine::{EngineCommand, EngineHandle, EngineUpdate, spawn_engine};
pub use patch::ChimePatch;
pub use recorder::{NoteRecorder, NoteSink, RecordedNote};
pub use scheduler::Scheduler;
pub use ui::ChimeApp;
