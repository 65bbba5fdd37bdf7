use crate::analysis::{FaceAnalyzer, OVERLAY_ACTIONS};
use crate::camera::{downscale, FrameSource, ScaleFactors};
use crate::display::Display;
use crate::error::Result;
use crate::interrupt::StopFlag;
use crate::overlay::{draw_face, draw_footer, FpsCounter};
use crate::throttle::{AnalysisThrottle, ResultCache, DEFAULT_ANALYSIS_INTERVAL};
use log::{debug, info, warn};
use opencv::prelude::*;
use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq)]
pub struct LoopSettings {
    pub resize_factor: f64,
    pub analysis_interval: Duration,
    pub quit_key: char,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            resize_factor: 0.5,
            analysis_interval: DEFAULT_ANALYSIS_INTERVAL,
            quit_key: 'q',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    StreamEnded,
    QuitKey,
    Interrupted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub analyses: u64,
    pub failures: u64,
    pub exit: ExitReason,
}

#[derive(Default)]
struct Counters {
    frames: u64,
    analyses: u64,
    failures: u64,
}

/// Owns the capture and display for one run and shuts both down exactly
/// once, whichever way the run ends.
struct Session<S: FrameSource, D: Display> {
    source: S,
    display: D,
    finished: bool,
}

impl<S: FrameSource, D: Display> Session<S, D> {
    fn shutdown(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        let released = self.source.release();
        let closed = self.display.close();
        released?;
        closed
    }
}

impl<S: FrameSource, D: Display> Drop for Session<S, D> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!("Shutdown failed {:?}", err);
        }
    }
}

/// Capture, analyze, render.
pub struct OverlayLoop<A: FaceAnalyzer> {
    settings: LoopSettings,
    analyzer: A,
    throttle: AnalysisThrottle,
    cache: ResultCache,
    stop: StopFlag,
}

impl<A: FaceAnalyzer> OverlayLoop<A> {
    pub fn new(settings: LoopSettings, analyzer: A, stop: StopFlag) -> Self {
        let throttle = AnalysisThrottle::new(settings.analysis_interval);
        Self {
            settings,
            analyzer,
            throttle,
            cache: ResultCache::default(),
            stop,
        }
    }

    pub fn run<S: FrameSource, D: Display>(&mut self, source: S, display: D) -> Result<RunSummary> {
        let mut session = Session {
            source,
            display,
            finished: false,
        };
        let mut counters = Counters::default();

        let outcome = self.drive(&mut session, &mut counters);
        let shutdown = session.shutdown();
        let exit = outcome?;
        shutdown?;

        let summary = RunSummary {
            frames: counters.frames,
            analyses: counters.analyses,
            failures: counters.failures,
            exit,
        };
        info!("Stopped {:?}", summary);
        Ok(summary)
    }

    fn drive<S: FrameSource, D: Display>(
        &mut self,
        session: &mut Session<S, D>,
        counters: &mut Counters,
    ) -> Result<ExitReason> {
        let mut fps = FpsCounter::default();
        loop {
            if self.stop.is_raised() {
                return Ok(ExitReason::Interrupted);
            }
            let Some(mut frame) = session.source.next_frame()? else {
                return Ok(ExitReason::StreamEnded);
            };
            counters.frames += 1;

            let small = downscale(&frame, self.settings.resize_factor)?;
            let scale = ScaleFactors::of(&frame, &small)?;

            let now = Instant::now();
            if self.throttle.should_analyze(now) {
                self.throttle.record_attempt(now);
                self.analyze(&small, counters);
            }

            if let Some(face) = self.cache.primary() {
                draw_face(&mut frame, face, scale)?;
            }
            draw_footer(&mut frame, fps.tick(Instant::now()), self.settings.quit_key)?;

            session.display.show(&frame)?;
            if session.display.poll_key()? == Some(self.settings.quit_key) {
                return Ok(ExitReason::QuitKey);
            }
        }
    }

    fn analyze(&mut self, small: &Mat, counters: &mut Counters) {
        counters.analyses += 1;
        match self.analyzer.analyze(small, &OVERLAY_ACTIONS) {
            Ok(faces) => self.cache.store(faces),
            Err(err) => {
                counters.failures += 1;
                debug!("Analysis failed {}", err);
                self.cache.clear();
            }
        }
    }
}
