use serde::Serialize;

/// Hours in one simulated day.
pub const HOURS_PER_DAY: u32 = 24;

/// Longest game a configuration may ask for.
pub const MAX_GAME_DAYS: u32 = 3650;

/// Simulated day/hour counter.
///
/// Each call to [`GameClock::advance`] moves one hour forward. Crossing
/// midnight resets the hour to 0 and increments the day.
///
/// # Examples
///
/// ```
/// use p2p_energy_sim::sim::clock::GameClock;
///
/// let mut clock = GameClock::new(1, 22, 7);
/// assert!(!clock.advance().new_day);
/// let tick = clock.advance();
/// assert!(tick.new_day);
/// assert_eq!((tick.day, tick.hour), (2, 0));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct GameClock {
    /// Current day, starting at 1.
    day: u32,
    /// Day the run began on.
    start_day: u32,
    /// Current hour of day (0-23).
    hour: u32,
    /// The run is over once `day` exceeds this value.
    max_days: u32,
}

/// Position of the clock after one advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    pub day: u32,
    pub hour: u32,
    /// `true` when this advance crossed midnight.
    pub new_day: bool,
}

impl GameClock {
    /// Creates a clock at `day`/`hour`.
    ///
    /// # Arguments
    ///
    /// * `day` - Starting day
    /// * `hour` - Starting hour; values past 23 wrap
    /// * `max_days` - Last playable day
    pub fn new(day: u32, hour: u32, max_days: u32) -> Self {
        Self {
            day,
            start_day: day,
            hour: hour % HOURS_PER_DAY,
            max_days,
        }
    }

    /// Advances by one simulated hour.
    pub fn advance(&mut self) -> ClockTick {
        self.hour += 1;
        let new_day = self.hour >= HOURS_PER_DAY;
        if new_day {
            self.hour = 0;
            self.day = self.day.saturating_add(1);
        }
        ClockTick {
            day: self.day,
            hour: self.hour,
            new_day,
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Returns `true` once the day counter has passed `max_days`.
    pub fn is_finished(&self) -> bool {
        self.day > self.max_days
    }

    /// Number of days completed since the start day, capped at the
    /// configured length of the run.
    pub fn days_played(&self) -> u32 {
        self.day
            .min(self.max_days.saturating_add(1))
            .saturating_sub(self.start_day)
    }
}
