use serde::Serialize;

use crate::foundation::error::ShotreelResult;
use crate::foundation::time::{CancelToken, wait};
use crate::session::opts::INTERVAL_MS;

/// Snapshot of playback progress.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TimeProperties {
    pub shot_index: usize,
    pub total_time: u64,
    pub shot_time: u64,
    pub total_duration: u64,
    pub shot_duration: u64,
    pub total_percentage: f64,
    pub shot_percentage: f64,
    pub is_playing: bool,
    pub is_finished: bool,
    pub is_last_shot: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    /// A shot became current while playing.
    ShotStarted(TimeProperties),
    /// A shot became current while stopped; draw it once.
    ShotPrepared(TimeProperties),
    Stopped(TimeProperties),
    Progress(TimeProperties),
}

pub type PlayerListener = Box<dyn FnMut(&PlayerEvent) + Send>;

/// Interactive playback clock over a list of shot durations.
///
/// Time only moves through [`Player::tick`]; pacing against the wall clock is left to
/// [`run_realtime`] so tests can drive it directly.
pub struct Player {
    durations: Vec<u64>,
    shot_index: usize,
    shot_time: u64,
    shot_duration: u64,
    playing: bool,
    finished: bool,
    listener: Option<PlayerListener>,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("durations", &self.durations)
            .field("shot_index", &self.shot_index)
            .field("shot_time", &self.shot_time)
            .field("playing", &self.playing)
            .field("finished", &self.finished)
            .finish()
    }
}

impl Player {
    pub fn new(durations: Vec<u64>) -> Self {
        let shot_duration = durations.first().copied().unwrap_or(0);
        Self {
            durations,
            shot_index: 0,
            shot_time: 0,
            shot_duration,
            playing: false,
            finished: false,
            listener: None,
        }
    }

    /// Install the event listener; it immediately receives the current progress.
    pub fn on_event(&mut self, listener: PlayerListener) {
        self.listener = Some(listener);
        self.emit(PlayerEvent::Progress(self.time_properties()));
    }

    pub fn take_listener(&mut self) -> Option<PlayerListener> {
        self.listener.take()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn shot_index(&self) -> usize {
        self.shot_index
    }

    pub fn shot_time(&self) -> u64 {
        self.shot_time
    }

    pub fn total_duration(&self) -> u64 {
        self.durations.iter().sum()
    }

    /// Restart the current shot and start the clock.
    pub fn play(&mut self) {
        self.finished = false;
        self.playing = true;
        self.handle_new_shot();
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.emit(PlayerEvent::Stopped(self.time_properties()));
    }

    /// Advance the clock by `dt_ms` when playing.
    pub fn tick(&mut self, dt_ms: u64) {
        if !self.playing {
            return;
        }
        self.update_time(self.shot_time + dt_ms);
        let props = self.time_properties();
        if self.playing && props.total_percentage <= 100.0 {
            self.emit(PlayerEvent::Progress(props));
        }
    }

    /// Move to the next shot; past the last one playback finishes.
    pub fn next_shot(&mut self) {
        if self.shot_index + 1 >= self.durations.len() {
            self.finished = true;
            self.stop();
            return;
        }
        self.shot_index += 1;
        self.handle_new_shot();
    }

    pub fn previous_shot(&mut self) {
        let Some(prev) = self.shot_index.checked_sub(1) else {
            self.stop();
            return;
        };
        self.shot_index = prev;
        self.handle_new_shot();
    }

    pub fn go_to_shot(&mut self, idx: usize) {
        if self.shot_index == idx {
            return;
        }
        if idx >= self.durations.len() {
            self.stop();
            return;
        }
        self.shot_index = idx;
        self.handle_new_shot();
    }

    /// Replace the shot list, e.g. as progressive resolution completes more shots.
    pub fn update_shots(&mut self, durations: Vec<u64>) {
        self.durations = durations;
        if let Some(&d) = self.durations.get(self.shot_index) {
            self.shot_duration = d;
        }
    }

    pub fn time_properties(&self) -> TimeProperties {
        let total_duration = self.total_duration();
        let total_time = self.durations[..self.shot_index.min(self.durations.len())]
            .iter()
            .sum::<u64>()
            + self.shot_time;
        TimeProperties {
            shot_index: self.shot_index,
            total_time,
            shot_time: self.shot_time,
            total_duration,
            shot_duration: self.shot_duration,
            total_percentage: percentage(total_time, total_duration),
            shot_percentage: percentage(self.shot_time, self.shot_duration),
            is_playing: self.playing,
            is_finished: self.finished,
            is_last_shot: self.shot_index + 1 == self.durations.len(),
        }
    }

    fn update_time(&mut self, shot_time: u64) {
        if shot_time > self.shot_duration {
            self.next_shot();
            return;
        }
        let Some(&duration) = self.durations.get(self.shot_index) else {
            self.stop();
            return;
        };
        self.shot_time = shot_time;
        self.shot_duration = duration;
    }

    fn handle_new_shot(&mut self) {
        self.shot_time = 0;
        self.update_time(0);
        let props = self.time_properties();
        if self.playing {
            self.emit(PlayerEvent::ShotStarted(props));
        } else {
            self.emit(PlayerEvent::ShotPrepared(props));
            self.stop();
        }
    }

    fn emit(&mut self, event: PlayerEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&event);
        }
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Drive `player` against the wall clock until it stops or `cancel` is set.
///
/// `on_tick` runs after every tick while playing, typically to draw the current shot. Cancelling
/// stops the player and leaves whatever was drawn last.
pub fn run_realtime(
    player: &mut Player,
    cancel: &CancelToken,
    mut on_tick: impl FnMut(&Player) -> ShotreelResult<()>,
) -> ShotreelResult<TimeProperties> {
    while player.is_playing() {
        if cancel.is_cancelled() {
            player.stop();
            break;
        }
        wait(INTERVAL_MS);
        player.tick(INTERVAL_MS);
        if player.is_playing() {
            on_tick(player)?;
        }
    }
    Ok(player.time_properties())
}

#[cfg(test)]
#[path = "../../tests/unit/playback/player.rs"]
mod tests;
