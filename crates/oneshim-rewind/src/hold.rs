//! 방향키 홀드 시 가속 반복 스케줄러.
//!
//! 첫 반복은 300ms 뒤, 이후 반복 횟수에 따라 150ms → 80ms → 40ms로 빨라진다.
//! 틱마다 무엇을 할지는 엔진이 정한다 (여기서는 방향만 돌려준다).

use oneshim_core::config::HoldRepeatConfig;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::timer::{Cadence, ScheduledTask, TimerKind, TimerTick};

/// 이동 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepDirection {
    /// 과거 쪽 (인덱스 감소)
    Backward,
    /// 최신 쪽 (인덱스 증가)
    Forward,
}

impl StepDirection {
    /// 인덱스 증감량
    pub fn delta(self) -> isize {
        match self {
            StepDirection::Backward => -1,
            StepDirection::Forward => 1,
        }
    }
}

/// 홀드 상태 스냅샷 (`direction`: -1 | 0 | 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HoldState {
    /// 진행 방향 (0이면 홀드 없음)
    pub direction: i8,
    /// 지금까지 반복 횟수
    pub repeat_count: u32,
}

/// 가속 간격 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldCadence {
    initial: Duration,
    slow: Duration,
    medium: Duration,
    fast: Duration,
    slow_until: u32,
    medium_until: u32,
}

impl HoldCadence {
    /// 설정에서 생성
    pub fn from_config(config: &HoldRepeatConfig) -> Self {
        Self {
            initial: Duration::from_millis(config.initial_delay_ms),
            slow: Duration::from_millis(config.slow_interval_ms),
            medium: Duration::from_millis(config.medium_interval_ms),
            fast: Duration::from_millis(config.fast_interval_ms),
            slow_until: config.slow_until_repeats,
            medium_until: config.medium_until_repeats,
        }
    }

    /// 현재 반복 횟수 기준 다음 간격 (첫 반복 전 지연 제외)
    pub fn interval_for(&self, repeat_count: u32) -> Duration {
        if repeat_count < self.slow_until {
            self.slow
        } else if repeat_count < self.medium_until {
            self.medium
        } else {
            self.fast
        }
    }
}

impl Default for HoldCadence {
    fn default() -> Self {
        Self::from_config(&HoldRepeatConfig::default())
    }
}

impl Cadence for HoldCadence {
    // sequence번째 틱 직전의 반복 횟수 == sequence
    fn delay(&self, sequence: u32) -> Duration {
        if sequence == 0 {
            self.initial
        } else {
            self.interval_for(sequence)
        }
    }
}

/// 홀드 반복기
#[derive(Debug)]
pub struct HoldRepeater {
    cadence: HoldCadence,
    direction: Option<StepDirection>,
    repeat_count: u32,
    task: ScheduledTask,
}

impl HoldRepeater {
    /// 새 반복기 생성
    pub fn new(cadence: HoldCadence) -> Self {
        Self {
            cadence,
            direction: None,
            repeat_count: 0,
            task: ScheduledTask::new(TimerKind::HoldRepeat),
        }
    }

    /// 홀드 시작
    ///
    /// 같은 방향으로 이미 홀드 중이면 무시한다 (OS 키 자동 반복).
    /// 반대 방향이면 카운트를 초기화하고 다시 시작한다.
    /// 타이머를 시작할 수 없으면 홀드 없음 상태로 남는다.
    pub fn start(&mut self, direction: StepDirection, tx: mpsc::Sender<TimerTick>) -> bool {
        if self.is_holding(direction) {
            return false;
        }
        self.repeat_count = 0;
        if !self.task.start(self.cadence, tx) {
            self.direction = None;
            return false;
        }
        self.direction = Some(direction);
        debug!("홀드 반복 시작: {:?}", direction);
        true
    }

    /// 홀드 종료: 예약된 틱 취소 + 카운트 초기화
    pub fn stop(&mut self) {
        if self.task.cancel() {
            debug!("홀드 반복 종료: {}회", self.repeat_count);
        }
        self.direction = None;
        self.repeat_count = 0;
    }

    /// 틱 수신 처리: 현재 작업의 틱이면 이동 방향 반환
    pub fn on_tick(&mut self, tick: &TimerTick) -> Option<StepDirection> {
        if !self.task.accepts(tick) {
            return None;
        }
        self.repeat_count = self.repeat_count.saturating_add(1);
        self.direction
    }

    /// 해당 방향으로 홀드 중인지
    pub fn is_holding(&self, direction: StepDirection) -> bool {
        self.direction == Some(direction) && self.task.is_active()
    }

    /// 활성 여부
    pub fn is_active(&self) -> bool {
        self.task.is_active()
    }

    /// 상태 스냅샷
    pub fn state(&self) -> HoldState {
        HoldState {
            direction: self.direction.map(|d| d.delta() as i8).unwrap_or(0),
            repeat_count: self.repeat_count,
        }
    }
}
