use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::resolver::MediaResolver;
use crate::assets::source::MediaSource;
use crate::audio::mix::{mix, write_mix_to_f32le_file};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameSink};
use crate::foundation::error::{ShotreelError, ShotreelResult};
use crate::foundation::time::CancelToken;
use crate::playback::export::{ExportDriver, ExportStats};
use crate::playback::player::{Player, PlayerListener, TimeProperties, run_realtime};
use crate::render::canvas::{CanvasOptions, CanvasRenderer};
use crate::render::surface::{DrawSurface, FrameRGBA};
use crate::scene::Scene;
use crate::session::access::{AccessPrivilege, Capabilities, Env, validate_access};
use crate::session::opts::{CreatorOpts, INTERVAL_MS};
use crate::timeline::media_data::prepare_media_data;
use crate::timeline::{ShotDuration, Timeline, TimelineWarning, build_timeline};

const PLAY: AccessPrivilege = AccessPrivilege::new("play")
    .only(Env::Interactive)
    .ready()
    .canvas();
const TICK: AccessPrivilege = AccessPrivilege::new("tick")
    .only(Env::Interactive)
    .ready()
    .canvas();
const STOP: AccessPrivilege = AccessPrivilege::new("stop").only(Env::Interactive);
const INVOKE_SHOT: AccessPrivilege = AccessPrivilege::new("invoke_shot")
    .only(Env::Interactive)
    .ready()
    .canvas();
const IS_PLAYING: AccessPrivilege = AccessPrivilege::new("is_playing").only(Env::Interactive);
const DURATION: AccessPrivilege = AccessPrivilege::new("duration").ready();
const SHOT_DURATIONS: AccessPrivilege = AccessPrivilege::new("shot_durations").ready();
const FRAME_AT: AccessPrivilege = AccessPrivilege::new("frame_at").ready();
const EXPORT: AccessPrivilege = AccessPrivilege::new("export").only(Env::Export).ready();
const CREATE_FILE: AccessPrivilege = AccessPrivilege::new("create_file")
    .only(Env::Export)
    .ready();

/// One video-creation session: scenes in, preview or file out.
///
/// Every [`VideoCreator::generate`] call starts with an empty media cache, so edited content is
/// never served stale. Exporting consumes the built timeline.
pub struct VideoCreator {
    opts: CreatorOpts,
    source: Arc<dyn MediaSource>,
    timeline: Option<Timeline>,
    player: Option<Player>,
    listener: Option<PlayerListener>,
    surface: Option<Box<dyn DrawSurface + Send>>,
    render_opts: CanvasOptions,
}

impl std::fmt::Debug for VideoCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoCreator")
            .field("opts", &self.opts)
            .field("shots", &self.timeline.as_ref().map(Timeline::len))
            .field("player", &self.player)
            .field("has_surface", &self.surface.is_some())
            .finish()
    }
}

impl VideoCreator {
    pub fn new(opts: CreatorOpts, source: Arc<dyn MediaSource>) -> ShotreelResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            source,
            timeline: None,
            player: None,
            listener: None,
            surface: None,
            render_opts: CanvasOptions::default(),
        })
    }

    /// Attach the display surface used for interactive playback.
    pub fn attach_surface(&mut self, surface: Box<dyn DrawSurface + Send>) -> ShotreelResult<()> {
        let canvas = self.opts.canvas()?;
        if surface.canvas() != canvas {
            return Err(ShotreelError::validation(format!(
                "surface is {}x{}, session renders {}x{}",
                surface.canvas().width,
                surface.canvas().height,
                canvas.width,
                canvas.height
            )));
        }
        self.surface = Some(surface);
        Ok(())
    }

    pub fn surface(&self) -> Option<&(dyn DrawSurface + Send)> {
        self.surface.as_deref()
    }

    /// Progress listener handed to every player this session creates.
    pub fn on_progress(&mut self, listener: PlayerListener) {
        match self.player.as_mut() {
            Some(player) => player.on_event(listener),
            None => self.listener = Some(listener),
        }
    }

    pub fn options(&self) -> &CreatorOpts {
        &self.opts
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    /// Resolve `scenes` (or only scene `part`) into a timeline.
    ///
    /// Returns the clamp warnings raised while building.
    #[tracing::instrument(skip_all, fields(scenes = scenes.len(), part = ?part))]
    pub fn generate(
        &mut self,
        scenes: &[Scene],
        part: Option<usize>,
        cancel: &CancelToken,
    ) -> ShotreelResult<Vec<TimelineWarning>> {
        if let Some(player) = self.player.as_mut() {
            player.stop();
        }
        if part.is_some() {
            self.opts.part = part;
        }

        let media = prepare_media_data(scenes, &self.opts)?;
        let resolver = MediaResolver::new(self.source.clone())
            .with_fps(self.opts.fps)
            .with_retry(self.opts.retry);
        let timeline = build_timeline(&media, &resolver, &self.opts, cancel)?;
        let warnings = timeline.warnings.clone();

        if self.opts.env == Env::Interactive && self.surface.is_some() {
            let mut player = Player::new(timeline.shots.iter().map(|s| s.duration).collect());
            let listener = self
                .listener
                .take()
                .or_else(|| self.player.as_mut().and_then(Player::take_listener));
            if let Some(listener) = listener {
                player.on_event(listener);
            }
            self.player = Some(player);
        } else {
            self.player = None;
        }
        self.render_opts = CanvasOptions::default();
        self.timeline = Some(timeline);
        Ok(warnings)
    }

    pub fn is_ready(&self) -> bool {
        self.timeline.is_some()
    }

    /// Start playback from the beginning of the current shot and draw it.
    pub fn play(&mut self) -> ShotreelResult<()> {
        self.check(&PLAY)?;
        if let Some(player) = self.player.as_mut() {
            player.play();
        }
        self.draw_current()
    }

    /// Advance playback by `dt_ms` and draw the shot now showing.
    pub fn tick(&mut self, dt_ms: u64) -> ShotreelResult<()> {
        self.check(&TICK)?;
        let Some(player) = self.player.as_mut() else {
            return Ok(());
        };
        if !player.is_playing() {
            return Ok(());
        }
        player.tick(dt_ms);
        if player.is_playing() {
            self.draw_current()?;
        }
        Ok(())
    }

    /// Play against the wall clock until the end, a stop, or `cancel`.
    pub fn run(&mut self, cancel: &CancelToken) -> ShotreelResult<TimeProperties> {
        self.play()?;
        let Self {
            player,
            timeline,
            surface,
            render_opts,
            opts,
            ..
        } = self;
        let (Some(player), Some(timeline), Some(surface)) =
            (player.as_mut(), timeline.as_ref(), surface.as_deref_mut())
        else {
            return Err(ShotreelError::not_ready("no interactive session to run"));
        };
        let renderer = CanvasRenderer::new(opts.canvas()?, opts.fps).with_tick_ms(INTERVAL_MS);
        run_realtime(player, cancel, |p| {
            let shot = &timeline.shots[p.shot_index()];
            renderer.render(shot, p.shot_time() as f64, &mut *render_opts, &mut *surface)?;
            Ok(())
        })
    }

    /// Stop playback; the surface keeps its last drawn frame.
    pub fn stop(&mut self) -> ShotreelResult<()> {
        self.check(&STOP)?;
        if let Some(player) = self.player.as_mut() {
            player.stop();
        }
        Ok(())
    }

    /// Jump to shot `index` and draw it. Out-of-range indices are ignored.
    pub fn invoke_shot(&mut self, index: usize) -> ShotreelResult<()> {
        self.check(&INVOKE_SHOT)?;
        let in_range = self.timeline.as_ref().is_some_and(|t| index < t.len());
        if !in_range {
            return Ok(());
        }
        if let Some(player) = self.player.as_mut() {
            player.go_to_shot(index);
        }
        self.draw_current()
    }

    /// Total duration in milliseconds.
    pub fn duration(&self) -> ShotreelResult<u64> {
        self.check(&DURATION)?;
        Ok(self.timeline.as_ref().map_or(0, Timeline::duration))
    }

    pub fn is_playing(&self) -> ShotreelResult<bool> {
        self.check(&IS_PLAYING)?;
        Ok(self.player.as_ref().is_some_and(Player::is_playing))
    }

    pub fn time_properties(&self) -> Option<TimeProperties> {
        self.player.as_ref().map(Player::time_properties)
    }

    /// Replace the options; the built timeline is discarded.
    pub fn update_options(&mut self, opts: CreatorOpts) -> ShotreelResult<()> {
        opts.validate()?;
        if let Some(player) = self.player.as_mut() {
            player.stop();
        }
        if let Some(surface) = self.surface.as_ref()
            && surface.canvas() != opts.canvas()?
        {
            tracing::debug!("canvas size changed, detaching surface");
            self.surface = None;
        }
        self.opts = opts;
        self.timeline = None;
        self.player = None;
        self.render_opts = CanvasOptions::default();
        Ok(())
    }

    pub fn shot_durations(&self) -> ShotreelResult<Vec<ShotDuration>> {
        self.check(&SHOT_DURATIONS)?;
        Ok(self
            .timeline
            .as_ref()
            .map(Timeline::shot_durations)
            .unwrap_or_default())
    }

    /// Render the frame at absolute time `t_ms` offscreen.
    pub fn frame_at(&self, t_ms: f64, animate: bool) -> ShotreelResult<FrameRGBA> {
        self.check(&FRAME_AT)?;
        let timeline = self.ready_timeline()?;
        let driver = ExportDriver::new(timeline, self.opts.canvas()?, self.opts.fps);
        let mut opts = if animate {
            CanvasOptions::default()
        } else {
            CanvasOptions::poster()
        };
        driver.frame_at_time(t_ms, &mut opts)
    }

    /// Export every frame into `sink`, without audio.
    pub fn export_into(
        &mut self,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> ShotreelResult<ExportStats> {
        self.check(&EXPORT)?;
        let timeline = self.ready_timeline()?;
        let stats = ExportDriver::new(timeline, self.opts.canvas()?, self.opts.fps)
            .run(sink, None, cancel);
        self.timeline = None;
        stats
    }

    /// Encode the session to an MP4 at `out_path` with `ffmpeg`.
    ///
    /// The file only appears at `out_path` once encoding succeeded.
    #[tracing::instrument(skip_all, fields(out = %out_path.display()))]
    pub fn create_file(
        &mut self,
        out_path: &Path,
        cancel: &CancelToken,
    ) -> ShotreelResult<ExportStats> {
        self.check(&CREATE_FILE)?;
        let result = self.encode_file(out_path, cancel);
        self.timeline = None;
        result
    }

    fn encode_file(&self, out_path: &Path, cancel: &CancelToken) -> ShotreelResult<ExportStats> {
        let timeline = self.ready_timeline()?;
        tracing::info!(shots = timeline.len(), "encoding video");

        let track = mix(timeline, &self.opts.volume);
        let audio_path = audio_scratch_path(out_path);
        crate::encode::ffmpeg::ensure_parent_dir(&audio_path)?;
        write_mix_to_f32le_file(&track.interleaved_f32, &audio_path)?;
        let audio = AudioInputConfig {
            path: audio_path.clone(),
            sample_rate: track.sample_rate,
            channels: track.channels,
        };

        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out_path));
        let stats = ExportDriver::new(timeline, self.opts.canvas()?, self.opts.fps).run(
            &mut sink,
            Some(audio),
            cancel,
        );
        if let Err(e) = std::fs::remove_file(&audio_path) {
            tracing::debug!(error = %e, path = %audio_path.display(), "audio scratch not removed");
        }
        stats
    }

    fn ready_timeline(&self) -> ShotreelResult<&Timeline> {
        self.timeline
            .as_ref()
            .ok_or_else(|| ShotreelError::not_ready("run generate first"))
    }

    fn draw_current(&mut self) -> ShotreelResult<()> {
        let (Some(player), Some(timeline), Some(surface)) = (
            self.player.as_ref(),
            self.timeline.as_ref(),
            self.surface.as_deref_mut(),
        ) else {
            return Ok(());
        };
        let Some(shot) = timeline.shots.get(player.shot_index()) else {
            return Ok(());
        };
        let renderer =
            CanvasRenderer::new(self.opts.canvas()?, self.opts.fps).with_tick_ms(INTERVAL_MS);
        renderer.render(
            shot,
            player.shot_time() as f64,
            &mut self.render_opts,
            surface,
        )?;
        Ok(())
    }

    fn check(&self, privilege: &AccessPrivilege) -> ShotreelResult<()> {
        validate_access(
            privilege,
            Capabilities {
                env: self.opts.env,
                is_ready: self.is_ready(),
                has_canvas: self.surface.is_some(),
            },
        )
    }
}

fn audio_scratch_path(out_path: &Path) -> PathBuf {
    let name = out_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_owned());
    out_path.with_file_name(format!(".audio-{name}.f32le"))
}

#[cfg(test)]
#[path = "../../tests/unit/session/creator.rs"]
mod tests;
