use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use rand::random_range;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::driver::InputDriver;
use crate::config::Config;
use crate::logger::ActivityLog;

/// The idle-prevention loop: `Stopped → Running → Stopped`.
///
/// Each cycle displaces the cursor by the configured pixel count and moves it
/// straight back (net zero displacement), taps Shift unless silent mode is
/// on, then waits for the next interval or an external stop request,
/// whichever comes first. Injection failures are logged and never terminate
/// the loop.
///
/// A simulator drives a single run; build a new one to start again. Calling
/// [`Simulator::run`] while a run is already active is not guarded.
pub struct Simulator {
    config: Config,
    log: ActivityLog,
    driver: Box<dyn InputDriver>,
    running: Arc<AtomicBool>,
    cancel: CancellationToken,
}

/// External view of a running loop. Callers may only request a stop; the
/// loop state itself stays owned by the [`Simulator`].
#[derive(Clone)]
pub struct LoopHandle {
    running: Arc<AtomicBool>,
    cancel: CancellationToken,
    log: ActivityLog,
}

impl LoopHandle {
    /// Request a graceful stop. The first call while the loop is running
    /// releases the wait, prints and logs the shutdown notice; later calls
    /// are no-ops.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.cancel.cancel();
            println!("■ Graceful shutdown initiated");
            self.log.shutdown();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Simulator {
    pub fn new(config: Config, log: ActivityLog, driver: Box<dyn InputDriver>) -> Self {
        Self {
            config,
            log,
            driver,
            running: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
        }
    }

    /// A stop-only handle onto this loop, safe to hand to other tasks.
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            running: Arc::clone(&self.running),
            cancel: self.cancel.clone(),
            log: self.log.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request a graceful stop (same semantics as [`LoopHandle::stop`]).
    pub fn stop(&self) {
        self.handle().stop();
    }

    /// The wait before the next cycle, in seconds: a fresh uniform draw from
    /// the configured inclusive range when random intervals are on, the
    /// fixed interval otherwise.
    pub fn next_interval(&self) -> u64 {
        if self.config.random_interval {
            let min = u64::from(self.config.interval_range_min);
            let max = u64::from(self.config.interval_range_max);
            let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
            if lo == hi { lo } else { random_range(lo..=hi) }
        } else {
            u64::from(self.config.interval_seconds)
        }
    }

    fn inject_activity(&mut self) -> Result<()> {
        let pixels = self.config.movement_pixels as i32;
        let (x, y) = self.driver.cursor_position()?;
        self.driver.move_relative(pixels, pixels)?;
        self.driver.move_absolute(x, y)?;
        if !self.config.silent_mode {
            self.driver.tap_neutral_key()?;
        }
        Ok(())
    }

    /// Perform one activity cycle: inject, then print and log the outcome.
    /// Returns whether the cycle succeeded. A failure is logged as ERROR
    /// exactly once and leaves the loop state untouched.
    pub fn simulate_cycle(&mut self, next_interval: Option<u64>) -> bool {
        match self.inject_activity() {
            Ok(()) => {
                let mode = if self.config.silent_mode {
                    "silent mode"
                } else {
                    "with keystroke"
                };
                let message = match next_interval {
                    Some(seconds) => format!(
                        "Activity simulation completed - mouse moved {}px ({mode}), next in {seconds}s",
                        self.config.movement_pixels
                    ),
                    None => format!(
                        "Activity simulation completed - mouse moved {}px ({mode})",
                        self.config.movement_pixels
                    ),
                };
                println!("✓ {message}");
                self.log.activity(&message);
                true
            }
            Err(err) => {
                let message = format!("Error during activity simulation: {err:#}");
                println!("✗ {message}");
                self.log.error(&message);
                false
            }
        }
    }

    /// Run the loop until a stop is requested.
    ///
    /// A Ctrl+C watcher is installed for the duration of the run and calls
    /// [`LoopHandle::stop`]; it is torn down exactly once on exit so prior
    /// interrupt handling is back in effect afterwards. Cancellation is
    /// cooperative at the wait boundary: a cycle in flight always completes
    /// before shutdown takes effect.
    pub async fn run(&mut self) {
        self.running.store(true, Ordering::SeqCst);

        let start_message = if self.config.random_interval {
            format!(
                "Starting idle prevention loop (random interval: {}-{}s)",
                self.config.interval_range_min, self.config.interval_range_max
            )
        } else {
            format!(
                "Starting idle prevention loop (interval: {}s)",
                self.config.interval_seconds
            )
        };
        println!("▶ {start_message}");
        self.log.activity(&start_message);

        let watcher = {
            let handle = self.handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    handle.stop();
                }
            })
        };

        while self.running.load(Ordering::SeqCst) {
            let next = self.next_interval();
            self.simulate_cycle(Some(next));

            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = sleep(Duration::from_secs(next)) => {}
            }
        }

        watcher.abort();
        self.running.store(false, Ordering::SeqCst);
        debug!(target: "notidle::simulator", "Loop exited");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::collections::HashSet;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct MockState {
        pos: (i32, i32),
        position_calls: usize,
        key_taps: usize,
        fail_position: bool,
    }

    #[derive(Clone)]
    struct MockDriver(Arc<Mutex<MockState>>);

    impl MockDriver {
        fn at(x: i32, y: i32) -> (Self, Arc<Mutex<MockState>>) {
            let state = Arc::new(Mutex::new(MockState {
                pos: (x, y),
                ..MockState::default()
            }));
            (Self(Arc::clone(&state)), state)
        }
    }

    impl InputDriver for MockDriver {
        fn cursor_position(&mut self) -> Result<(i32, i32)> {
            let mut state = self.0.lock().unwrap();
            state.position_calls += 1;
            if state.fail_position {
                bail!("injection backend unavailable");
            }
            Ok(state.pos)
        }

        fn move_relative(&mut self, dx: i32, dy: i32) -> Result<()> {
            let mut state = self.0.lock().unwrap();
            state.pos.0 += dx;
            state.pos.1 += dy;
            Ok(())
        }

        fn move_absolute(&mut self, x: i32, y: i32) -> Result<()> {
            self.0.lock().unwrap().pos = (x, y);
            Ok(())
        }

        fn tap_neutral_key(&mut self) -> Result<()> {
            self.0.lock().unwrap().key_taps += 1;
            Ok(())
        }
    }

    fn test_log(dir: &TempDir) -> ActivityLog {
        ActivityLog::new(dir.path().join("activity.log"))
    }

    #[test]
    fn test_cycle_restores_cursor_position() {
        let dir = TempDir::new().unwrap();
        for pixels in [1, 2, 50, 100] {
            let (driver, state) = MockDriver::at(640, 480);
            let config = Config {
                movement_pixels: pixels,
                ..Config::default()
            };
            let mut sim = Simulator::new(config, test_log(&dir), Box::new(driver));

            assert!(sim.simulate_cycle(Some(300)));
            assert_eq!(state.lock().unwrap().pos, (640, 480));
        }
    }

    #[test]
    fn test_key_tapped_iff_not_silent() {
        let dir = TempDir::new().unwrap();
        for silent in [false, true] {
            let (driver, state) = MockDriver::at(10, 10);
            let config = Config {
                silent_mode: silent,
                ..Config::default()
            };
            let mut sim = Simulator::new(config, test_log(&dir), Box::new(driver));

            assert!(sim.simulate_cycle(None));
            let taps = state.lock().unwrap().key_taps;
            assert_eq!(taps, usize::from(!silent));
        }
    }

    #[test]
    fn test_failed_cycle_logs_one_error_and_keeps_running_flag() {
        let dir = TempDir::new().unwrap();
        let (driver, state) = MockDriver::at(0, 0);
        state.lock().unwrap().fail_position = true;

        let log = test_log(&dir);
        let mut sim = Simulator::new(Config::default(), log.clone(), Box::new(driver));
        // As if a run were in flight.
        sim.running.store(true, Ordering::SeqCst);

        assert!(!sim.simulate_cycle(Some(60)));
        assert!(sim.is_running());

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("[ERROR]").count(), 1);
        assert!(content.contains("Error during activity simulation"));
    }

    #[test]
    fn test_next_interval_fixed_and_random() {
        let dir = TempDir::new().unwrap();
        let (driver, _) = MockDriver::at(0, 0);
        let fixed = Simulator::new(Config::default(), test_log(&dir), Box::new(driver));
        for _ in 0..10 {
            assert_eq!(fixed.next_interval(), 300);
        }

        let (driver, _) = MockDriver::at(0, 0);
        let config = Config {
            random_interval: true,
            interval_range_min: 10,
            interval_range_max: 60,
            ..Config::default()
        };
        let random = Simulator::new(config, test_log(&dir), Box::new(driver));
        let draws: Vec<u64> = (0..10).map(|_| random.next_interval()).collect();
        assert!(draws.iter().all(|d| (10..=60).contains(d)));
        let distinct: HashSet<u64> = draws.iter().copied().collect();
        assert!(distinct.len() > 1, "10 draws over 10..=60 were all {draws:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_resolves_wait_and_finishes_loop() {
        let dir = TempDir::new().unwrap();
        let (driver, state) = MockDriver::at(100, 200);
        let log = test_log(&dir);
        let mut sim = Simulator::new(Config::default(), log.clone(), Box::new(driver));
        let handle = sim.handle();

        let task = tokio::spawn(async move { sim.run().await });

        // Let the first cycle complete and the loop park on its wait.
        sleep(Duration::from_millis(10)).await;
        assert!(handle.is_running());
        assert!(state.lock().unwrap().position_calls >= 1);

        handle.stop();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("loop did not stop after cancellation")
            .unwrap();

        assert!(!handle.is_running());
        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("Graceful shutdown initiated").count(), 1);

        // A second stop request is a no-op.
        handle.stop();
        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("Graceful shutdown initiated").count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_survives_repeated_injection_failures() {
        let dir = TempDir::new().unwrap();
        let (driver, state) = MockDriver::at(0, 0);
        state.lock().unwrap().fail_position = true;

        let log = test_log(&dir);
        let mut sim = Simulator::new(Config::default(), log.clone(), Box::new(driver));
        let handle = sim.handle();

        let task = tokio::spawn(async move { sim.run().await });

        // Default interval is 300s; paused time auto-advances across waits.
        sleep(Duration::from_secs(650)).await;
        assert!(handle.is_running());
        assert!(state.lock().unwrap().position_calls >= 2);

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.matches("[ERROR]").count() >= 2);

        handle.stop();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("loop did not stop after cancellation")
            .unwrap();
    }
}
