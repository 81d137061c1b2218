//! Period clock

use crate::config::GameplaySettings;

/// What follows the period that just ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodOutcome {
    NextPeriod,
    Overtime,
    MatchOver,
}

#[derive(Debug, Clone)]
pub struct MatchClock {
    /// 1-based; overtime is `period_count + 1`
    period: u32,
    period_count: u32,
    remaining: f32,
    period_length: f32,
    overtime_length: f32,
    sudden_death: bool,
    in_overtime: bool,
    finished: bool,
}

impl MatchClock {
    pub fn new(settings: &GameplaySettings) -> Self {
        let period_length = settings.period_length_seconds().max(0.0);
        Self {
            period: 1,
            period_count: settings.period_count.max(1),
            remaining: period_length,
            period_length,
            overtime_length: settings.overtime_length_seconds().max(0.0),
            sudden_death: settings.sudden_death_overtime,
            in_overtime: false,
            finished: false,
        }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Seconds left in the current period
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_overtime(&self) -> bool {
        self.in_overtime
    }

    /// Next goal ends the match
    pub fn is_sudden_death(&self) -> bool {
        self.in_overtime && self.sudden_death
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Run the clock; returns the period number on the tick it expires
    pub fn advance(&mut self, dt: f32) -> Option<u32> {
        if self.finished || self.remaining <= 0.0 {
            return None;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        (self.remaining <= 0.0).then_some(self.period)
    }

    /// Move past an expired period
    pub fn begin_next(&mut self, tied: bool) -> PeriodOutcome {
        if !self.in_overtime && self.period < self.period_count {
            self.period += 1;
            self.remaining = self.period_length;
            return PeriodOutcome::NextPeriod;
        }
        if !self.in_overtime && tied && self.overtime_length > 0.0 {
            self.period += 1;
            self.in_overtime = true;
            self.remaining = self.overtime_length;
            return PeriodOutcome::Overtime;
        }
        self.finish();
        PeriodOutcome::MatchOver
    }

    pub fn finish(&mut self) {
        self.finished = true;
        self.remaining = 0.0;
    }
}
