//! Per-direction position state machine: `Flat → Open → Flat`.
//!
//! Each direction a strategy trades owns one [`Lane`]. Transitions are pure
//! functions on [`PositionState`]; [`simulate`] threads the lanes through
//! the bar sequence and collects every closed position in closing order.

use common::{Direction, ExitReason};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_price: f64,
    /// Price level the entry was measured against (e.g. the broken high).
    pub reference_level: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedPosition {
    pub position: OpenPosition,
    pub exit_index: usize,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Open(OpenPosition),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    /// `Flat → Open`. An already open state is returned unchanged: no pyramiding.
    pub fn open(self, position: OpenPosition) -> Self {
        match self {
            PositionState::Flat => PositionState::Open(position),
            open => open,
        }
    }

    /// `Open → Flat`, yielding the closed position. Closing a flat state, or
    /// closing on or before the entry bar, is a no-op.
    pub fn close(
        self,
        exit_index: usize,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> (Self, Option<ClosedPosition>) {
        match self {
            PositionState::Open(position) if exit_index > position.entry_index => (
                PositionState::Flat,
                Some(ClosedPosition {
                    position,
                    exit_index,
                    exit_price,
                    exit_reason,
                }),
            ),
            state => (state, None),
        }
    }
}

/// Bars an exit blocks new entries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cooldown {
    None,
    /// Only the direction that exited waits.
    SameDirection(usize),
    /// Any exit blocks both directions.
    AnyDirection(usize),
}

/// Position state plus exit history for one direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lane {
    pub direction: Direction,
    pub state: PositionState,
    pub last_exit: Option<usize>,
}

impl Lane {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            state: PositionState::Flat,
            last_exit: None,
        }
    }
}

fn cooled_down(last_exit: Option<usize>, bars: usize, index: usize) -> bool {
    last_exit.map_or(true, |exit| index >= exit + bars)
}

/// Entry decision for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub reference_level: Option<f64>,
}

impl Entry {
    pub fn at_market() -> Self {
        Self { reference_level: None }
    }

    pub fn against(level: f64) -> Self {
        Self { reference_level: Some(level) }
    }
}

/// Signal logic a strategy plugs into [`simulate`].
pub trait TradeRules {
    /// First bar on which entries and exits are evaluated (at least 1).
    fn first_bar(&self) -> usize;

    /// Bars a position must be held before a rule-based exit is honored.
    fn min_hold(&self) -> usize {
        0
    }

    fn cooldown(&self) -> Cooldown {
        Cooldown::None
    }

    fn entry(&self, direction: Direction, index: usize) -> Option<Entry>;

    /// Highest-priority exit condition met on `index`, if any.
    fn exit(&self, position: &OpenPosition, index: usize) -> Option<ExitReason>;
}

/// Replay `closes` bar by bar for each direction in `directions`.
///
/// On every bar exits are evaluated before entries. The final bar closes
/// anything still open with [`ExitReason::TimeExpiry`], whatever the minimum
/// hold, and never opens a position.
pub fn simulate<R: TradeRules + ?Sized>(
    rules: &R,
    closes: &[f64],
    directions: &[Direction],
) -> Vec<ClosedPosition> {
    let mut closed = Vec::new();
    let Some(last) = closes.len().checked_sub(1) else {
        return closed;
    };
    let mut lanes: Vec<Lane> = directions.iter().map(|&d| Lane::new(d)).collect();
    let mut last_exit_any: Option<usize> = None;

    for index in rules.first_bar().max(1)..=last {
        let price = closes[index];

        for lane in lanes.iter_mut() {
            let PositionState::Open(position) = lane.state else {
                continue;
            };
            let held = index - position.entry_index;
            let reason = if held >= rules.min_hold() {
                rules.exit(&position, index)
            } else {
                None
            };
            let Some(reason) = reason.or((index == last).then_some(ExitReason::TimeExpiry)) else {
                continue;
            };
            let (state, trade) = lane.state.close(index, price, reason);
            lane.state = state;
            if let Some(trade) = trade {
                lane.last_exit = Some(index);
                last_exit_any = Some(index);
                closed.push(trade);
            }
        }

        if index == last {
            break;
        }

        for lane in lanes.iter_mut() {
            if !lane.state.is_flat() {
                continue;
            }
            let ready = match rules.cooldown() {
                Cooldown::None => true,
                Cooldown::SameDirection(bars) => cooled_down(lane.last_exit, bars, index),
                Cooldown::AnyDirection(bars) => cooled_down(last_exit_any, bars, index),
            };
            if !ready {
                continue;
            }
            if let Some(entry) = rules.entry(lane.direction, index) {
                lane.state = lane.state.open(OpenPosition {
                    direction: lane.direction,
                    entry_index: index,
                    entry_price: price,
                    reference_level: entry.reference_level,
                });
            }
        }
    }

    closed
}
