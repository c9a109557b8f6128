//! # Audio Module
//!
//! The audio collaborator: a looping background track chosen per screen and
//! short jingles fired by game events.
//!
//! The engine only says *what* should sound. Tone sequencing is left to the
//! [`AudioSink`] the host provides.

use log::debug;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Background music tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Track {
    Title,
    Town,
    Dungeon,
    Combat,
}

/// Short one-shot tunes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jingle {
    Startup,
    Encounter,
    Victory,
    Defeat,
    LevelUp,
    Treasure,
    ShopBuy,
    Heal,
    Hit,
}

/// Receiver of audio events.
pub trait AudioSink {
    /// Plays a jingle, pausing the background track while it sounds.
    fn play_jingle(&mut self, jingle: Jingle);

    /// Switches the background track; `None` stops it.
    fn set_track(&mut self, track: Option<Track>);

    /// Silences or resumes background music. Jingles are unaffected.
    fn set_music_muted(&mut self, muted: bool);
}

/// Sink that writes audio events to the log.
#[derive(Debug, Default)]
pub struct LogAudio {
    track: Option<Track>,
    muted: bool,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for LogAudio {
    fn play_jingle(&mut self, jingle: Jingle) {
        debug!("jingle {:?}", jingle);
    }

    fn set_track(&mut self, track: Option<Track>) {
        if self.track != track {
            debug!("track {:?} -> {:?} (muted: {})", self.track, track, self.muted);
            self.track = track;
        }
    }

    fn set_music_muted(&mut self, muted: bool) {
        self.muted = muted;
        debug!("music muted: {}", muted);
    }
}

/// Audio event captured by [`RecordingAudio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    Jingle(Jingle),
    Track(Option<Track>),
    Muted(bool),
}

/// Sink that records every event into a shared log, for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    log: Rc<RefCell<Vec<AudioEvent>>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the event log that stays readable after the sink is moved.
    pub fn log(&self) -> Rc<RefCell<Vec<AudioEvent>>> {
        Rc::clone(&self.log)
    }

    /// Jingles played so far.
    pub fn jingles(&self) -> Vec<Jingle> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                AudioEvent::Jingle(jingle) => Some(*jingle),
                _ => None,
            })
            .collect()
    }
}

impl AudioSink for RecordingAudio {
    fn play_jingle(&mut self, jingle: Jingle) {
        self.log.borrow_mut().push(AudioEvent::Jingle(jingle));
    }

    fn set_track(&mut self, track: Option<Track>) {
        self.log.borrow_mut().push(AudioEvent::Track(track));
    }

    fn set_music_muted(&mut self, muted: bool) {
        self.log.borrow_mut().push(AudioEvent::Muted(muted));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_survives_move() {
        let recorder = RecordingAudio::new();
        let probe = recorder.clone();
        let mut sink: Box<dyn AudioSink> = Box::new(recorder);
        sink.play_jingle(Jingle::Hit);
        sink.set_track(Some(Track::Combat));
        assert_eq!(probe.jingles(), vec![Jingle::Hit]);
        assert_eq!(probe.log().borrow().len(), 2);
    }
}
