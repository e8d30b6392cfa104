//! 고정 주기 재생 클록.
//!
//! `Paused ⇄ Playing`. 틱마다 인덱스를 1씩 올리고 마지막 인덱스에 닿으면
//! 스스로 멈춘다 (되감아 반복하지 않음). 현재 인덱스는 엔진이 소유한다.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::timer::{FixedCadence, ScheduledTask, TimerKind, TimerTick};

pub use oneshim_core::config::SpeedMultiplier;

/// 재생 상태 스냅샷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    /// 현재 인덱스 (비어 있으면 0)
    pub current_index: usize,
    /// 재생 중 여부
    pub is_playing: bool,
    /// 배속
    pub speed_multiplier: SpeedMultiplier,
}

/// 틱 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStep {
    /// 다음 인덱스로 이동
    Advance(usize),
    /// 마지막 인덱스로 이동하며 자동 정지
    AdvanceAndStop(usize),
    /// 이미 끝에 있어 정지만 함
    Stopped,
}

/// 재생 클록
#[derive(Debug)]
pub struct PlaybackClock {
    base_period: Duration,
    speed: SpeedMultiplier,
    playing: bool,
    task: ScheduledTask,
}

impl PlaybackClock {
    /// 새 클록 생성 (Paused)
    pub fn new(base_period: Duration, speed: SpeedMultiplier) -> Self {
        Self {
            base_period,
            speed,
            playing: false,
            task: ScheduledTask::new(TimerKind::Playback),
        }
    }

    /// 재생 시작: 비어 있거나 이미 마지막이거나 재생 중이면 no-op
    ///
    /// 틱 타이머를 예약하지 못하면 Paused로 남고 `false`를 반환한다.
    pub fn play(&mut self, current_index: usize, len: usize, tx: mpsc::Sender<TimerTick>) -> bool {
        if self.playing || len == 0 || current_index + 1 >= len {
            return false;
        }
        if !self.schedule(tx) {
            return false;
        }
        self.playing = true;
        info!("재생 시작: 인덱스 {}, {}", current_index, self.speed);
        true
    }

    /// 일시정지: 상태가 바뀌었는지 반환
    pub fn pause(&mut self) -> bool {
        self.task.cancel();
        if !self.playing {
            return false;
        }
        self.playing = false;
        info!("재생 정지");
        true
    }

    /// 배속 변경: 재생 중이면 새 주기로 재예약 (인덱스 유지)
    pub fn set_speed(&mut self, speed: SpeedMultiplier, tx: mpsc::Sender<TimerTick>) {
        if self.speed == speed {
            return;
        }
        self.speed = speed;
        debug!("배속 변경: {}", speed);
        if self.playing && !self.schedule(tx) {
            warn!("재예약 실패로 재생 정지");
            self.playing = false;
        }
    }

    /// 틱 처리: 현재 작업의 틱이 아니면 `None`
    pub fn on_tick(&mut self, tick: &TimerTick, current_index: usize, len: usize) -> Option<PlaybackStep> {
        if !self.playing || !self.task.accepts(tick) {
            return None;
        }

        let last = len.checked_sub(1);
        let step = match last {
            Some(last) if current_index < last => {
                let next = current_index + 1;
                if next == last {
                    PlaybackStep::AdvanceAndStop(next)
                } else {
                    PlaybackStep::Advance(next)
                }
            }
            _ => PlaybackStep::Stopped,
        };

        if !matches!(step, PlaybackStep::Advance(_)) {
            self.pause();
        }
        Some(step)
    }

    /// 재생 중 여부
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// 현재 배속
    pub fn speed(&self) -> SpeedMultiplier {
        self.speed
    }

    /// 현재 틱 주기
    pub fn period(&self) -> Duration {
        self.speed.period(self.base_period)
    }

    fn schedule(&mut self, tx: mpsc::Sender<TimerTick>) -> bool {
        self.task.start(FixedCadence(self.period()), tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::tick_channel;

    fn clock() -> PlaybackClock {
        PlaybackClock::new(Duration::from_secs(1), SpeedMultiplier::X1)
    }

    #[tokio::test]
    async fn play_is_noop_when_empty_or_at_end() {
        let (tx, _rx) = tick_channel();
        let mut clock = clock();
        assert!(!clock.play(0, 0, tx.clone()));
        assert!(!clock.play(4, 5, tx.clone()));
        assert!(!clock.is_playing());
        assert!(clock.play(3, 5, tx));
        assert!(clock.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn runs_to_end_and_stops() {
        let (tx, mut rx) = tick_channel();
        let mut clock = clock();
        let len = 4;
        let mut index = 1;
        clock.play(index, len, tx);

        while clock.is_playing() {
            let tick = rx.recv().await.unwrap();
            match clock.on_tick(&tick, index, len) {
                Some(PlaybackStep::Advance(next)) | Some(PlaybackStep::AdvanceAndStop(next)) => {
                    assert!(next < len);
                    index = next;
                }
                Some(PlaybackStep::Stopped) | None => {}
            }
        }
        assert_eq!(index, len - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn index_moved_to_end_externally_stops() {
        let (tx, mut rx) = tick_channel();
        let mut clock = clock();
        clock.play(0, 3, tx);
        let tick = rx.recv().await.unwrap();
        assert_eq!(clock.on_tick(&tick, 2, 3), Some(PlaybackStep::Stopped));
        assert!(!clock.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_reschedules() {
        let (tx, mut rx) = tick_channel();
        let mut clock = clock();
        clock.play(0, 10, tx.clone());
        let old = rx.recv().await.unwrap();

        clock.set_speed(SpeedMultiplier::X10, tx);
        assert_eq!(clock.period(), Duration::from_millis(100));
        assert!(clock.is_playing());
        assert_eq!(clock.on_tick(&old, 1, 10), None);

        let fresh = rx.recv().await.unwrap();
        assert_eq!(clock.on_tick(&fresh, 1, 10), Some(PlaybackStep::Advance(2)));
    }

    #[test]
    fn play_without_runtime_stays_paused() {
        let (tx, _rx) = tick_channel();
        let mut clock = clock();
        assert!(!clock.play(0, 5, tx.clone()));
        assert!(!clock.is_playing());

        // 정지 상태의 배속 변경은 예약 없이 반영
        clock.set_speed(SpeedMultiplier::X2, tx);
        assert_eq!(clock.speed(), SpeedMultiplier::X2);
        assert!(!clock.is_playing());
    }

    #[test]
    fn pause_when_paused_reports_no_change() {
        let mut clock = clock();
        assert!(!clock.pause());
    }
}
