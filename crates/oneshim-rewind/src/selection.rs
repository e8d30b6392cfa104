//! 두 점 범위 선택 상태 머신.
//!
//! `Idle → PendingEnd → Selected`. `Selected`에서 다시 시작점을 찍으면
//! 새 선택이 시작된다 (누적되지 않는다).

use oneshim_core::models::capture::Capture;
use serde::Serialize;

/// 선택기 내부 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// 선택 없음
    #[default]
    Idle,
    /// 시작점만 찍힘
    PendingEnd {
        /// 시작 인덱스
        start: usize,
    },
    /// 두 점 모두 확정
    Selected {
        /// 처음 찍은 점 (고정)
        anchor: usize,
        /// 움직이는 끝점 (키보드/드래그로 확장)
        focus: usize,
    },
}

/// 정규화된 선택 범위 (`start_index <= end_index`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeSelection {
    /// 시작 인덱스 (포함)
    pub start_index: usize,
    /// 끝 인덱스 (포함)
    pub end_index: usize,
}

impl RangeSelection {
    fn normalized(a: usize, b: usize) -> Self {
        Self {
            start_index: a.min(b),
            end_index: a.max(b),
        }
    }

    /// 삭제/저장용 시간 구간 `[captures[lo].timestamp, captures[hi].timestamp + 1)`
    ///
    /// 인덱스가 배열 밖이면 `None`.
    pub fn time_interval(&self, captures: &[Capture]) -> Option<TimeInterval> {
        let start = captures.get(self.start_index)?;
        let end = captures.get(self.end_index)?;
        Some(TimeInterval {
            start_time: start.timestamp,
            end_time_exclusive: end.timestamp.saturating_add(1),
        })
    }
}

/// 반개구간 시간 범위 (초)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeInterval {
    /// 시작 시각 (포함)
    pub start_time: i64,
    /// 종료 시각 (미포함)
    pub end_time_exclusive: i64,
}

/// 범위 선택기
#[derive(Debug, Clone, Default)]
pub struct RangeSelector {
    state: SelectionState,
}

impl RangeSelector {
    /// Idle 상태로 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 상태
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// 시작점 지정 (`Idle`/`Selected`에서만): 전이 여부 반환
    pub fn set_start(&mut self, index: usize) -> bool {
        match self.state {
            SelectionState::Idle | SelectionState::Selected { .. } => {
                self.state = SelectionState::PendingEnd { start: index };
                true
            }
            SelectionState::PendingEnd { .. } => false,
        }
    }

    /// 끝점 지정 (`PendingEnd`에서만): 전이 여부 반환
    pub fn set_end(&mut self, index: usize) -> bool {
        match self.state {
            SelectionState::PendingEnd { start } => {
                self.state = SelectionState::Selected {
                    anchor: start,
                    focus: index,
                };
                true
            }
            _ => false,
        }
    }

    /// 확정된 선택의 끝점을 옮긴다 (상태 유지): 변경 여부 반환
    pub fn extend(&mut self, index: usize) -> bool {
        match &mut self.state {
            SelectionState::Selected { focus, .. } if *focus != index => {
                *focus = index;
                true
            }
            _ => false,
        }
    }

    /// 선택 해제
    pub fn clear(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = SelectionState::Idle;
        was_active
    }

    /// `PendingEnd` 또는 `Selected` 여부
    pub fn is_active(&self) -> bool {
        !matches!(self.state, SelectionState::Idle)
    }

    /// 시작점만 찍힌 상태의 시작 인덱스
    pub fn pending_start(&self) -> Option<usize> {
        match self.state {
            SelectionState::PendingEnd { start } => Some(start),
            _ => None,
        }
    }

    /// 확정된 선택 (정규화)
    pub fn selection(&self) -> Option<RangeSelection> {
        match self.state {
            SelectionState::Selected { anchor, focus } => {
                Some(RangeSelection::normalized(anchor, focus))
            }
            _ => None,
        }
    }
}
