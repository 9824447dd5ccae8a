use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use drishya_core::{update, AppState, CrudRequest, Msg, RecordQuery};
use drishya_logging::{drishya_debug, drishya_info};

use crate::cli::ListArgsPlan;
use crate::effects::EffectRunner;
use crate::render::render;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the application state and feeds every message through `update`.
pub struct App {
    state: AppState,
    runner: EffectRunner,
    settle_timeout: Duration,
}

impl App {
    pub fn new(runner: EffectRunner, page_size: usize, settle_timeout: Duration) -> Self {
        Self {
            state: AppState::new().with_page_size(page_size),
            runner,
            settle_timeout,
        }
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    /// Pumps engine events until no fetch or write is outstanding.
    fn settle(&mut self) -> Result<()> {
        let deadline = Instant::now() + self.settle_timeout;
        while self.state.is_busy() {
            if Instant::now() >= deadline {
                bail!("timed out waiting for the server");
            }
            if let Some(msg) = self.runner.next_msg(POLL_INTERVAL) {
                self.dispatch(msg);
            }
        }
        Ok(())
    }

    fn render_to(&mut self, out: &mut impl Write) -> Result<()> {
        self.state.consume_dirty();
        out.write_all(render(&self.state.view()).as_bytes())?;
        out.flush()?;
        Ok(())
    }

    pub fn show(&mut self, query: RecordQuery, list: ListArgsPlan, out: &mut impl Write) -> Result<()> {
        drishya_info!("Opening {} view", query.view());
        self.dispatch(Msg::ViewOpened(query));
        for msg in list.messages {
            self.dispatch(msg);
        }
        self.settle()?;
        self.render_to(out)?;

        if let Some(seconds) = list.watch {
            self.watch(Duration::from_secs(seconds), out)?;
        }
        self.dispatch(Msg::ViewClosed);
        self.fail_on_banner()
    }

    /// Re-renders whenever live updates or refetches change the screen.
    fn watch(&mut self, duration: Duration, out: &mut impl Write) -> Result<()> {
        let until = Instant::now() + duration;
        while Instant::now() < until {
            if let Some(msg) = self.runner.next_msg(POLL_INTERVAL) {
                self.dispatch(msg);
            }
            if !self.state.is_busy() && self.state.consume_dirty() {
                writeln!(out)?;
                self.render_to(out)?;
            }
        }
        drishya_debug!("Watch window over");
        Ok(())
    }

    pub fn write(
        &mut self,
        request: CrudRequest,
        then_show: RecordQuery,
        out: &mut impl Write,
    ) -> Result<()> {
        self.dispatch(Msg::ViewOpened(then_show));
        self.settle()?;
        let summary = request.describe();
        self.dispatch(Msg::CrudRequested(request));
        self.settle()?;
        if self.state.banner().is_none() {
            writeln!(out, "Done: {summary}")?;
        }
        self.render_to(out)?;
        self.dispatch(Msg::ViewClosed);
        self.fail_on_banner()
    }

    fn fail_on_banner(&self) -> Result<()> {
        match self.state.banner() {
            Some(banner) => bail!("{banner}"),
            None => Ok(()),
        }
    }
}
