//! 취소 가능한 예약 작업 (재생 틱, 키 홀드 반복 공용).
//!
//! 작업은 `tokio::spawn`된 루프로, [`Cadence`]가 정한 간격마다 엔진 소유의
//! mpsc 채널에 [`TimerTick`]을 보낸다. 상태 변경은 항상 엔진 쪽에서
//! 틱을 수신한 뒤에 일어난다.
//!
//! 종류별 작업은 최대 1개: `start`는 이전 작업을 abort하고 세대(generation)를
//! 올리며, 이전 세대의 틱은 수신 측에서 버려진다.
//!
//! 틱 채널은 유한 용량이다. 수신 측이 밀리면 넘치는 틱은 버려지고
//! (재개 시 몰아서 재생되지 않음), 다음 주기 틱부터 다시 전달된다.
//! tokio 런타임 밖에서 `start`하면 작업을 만들지 않고 `false`를 반환한다.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// 틱 채널 용량 (타이머 종류당 1개 분량)
pub const TICK_CHANNEL_CAPACITY: usize = 2;

/// 엔진 소유 틱 채널 생성
pub fn tick_channel() -> (mpsc::Sender<TimerTick>, mpsc::Receiver<TimerTick>) {
    mpsc::channel(TICK_CHANNEL_CAPACITY)
}

/// 타이머 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// 재생 클록
    Playback,
    /// 방향키 홀드 반복
    HoldRepeat,
}

/// 타이머 틱
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    /// 보낸 타이머 종류
    pub kind: TimerKind,
    /// 작업 세대 (start마다 증가)
    pub generation: u64,
    /// 작업 내 순번 (0부터)
    pub sequence: u32,
}

/// 틱 간격 정책
pub trait Cadence: Send + 'static {
    /// `sequence`번째 틱을 보내기 전 대기 시간
    fn delay(&self, sequence: u32) -> Duration;
}

/// 고정 주기
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCadence(pub Duration);

impl Cadence for FixedCadence {
    fn delay(&self, _sequence: u32) -> Duration {
        self.0
    }
}

/// 단일 종류의 예약 작업 슬롯
#[derive(Debug)]
pub struct ScheduledTask {
    kind: TimerKind,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// 비활성 슬롯 생성
    pub fn new(kind: TimerKind) -> Self {
        Self {
            kind,
            generation: 0,
            handle: None,
        }
    }

    /// 이전 작업을 취소하고 새 작업 시작 (런타임이 없으면 `false`)
    pub fn start<C: Cadence>(&mut self, cadence: C, tx: mpsc::Sender<TimerTick>) -> bool {
        self.cancel();
        let Ok(runtime) = Handle::try_current() else {
            warn!("tokio 런타임 없음, 타이머 시작 거부: {:?}", self.kind);
            return false;
        };
        self.generation += 1;

        let kind = self.kind;
        let generation = self.generation;
        self.handle = Some(runtime.spawn(async move {
            let mut sequence: u32 = 0;
            loop {
                tokio::time::sleep(cadence.delay(sequence)).await;
                let tick = TimerTick {
                    kind,
                    generation,
                    sequence,
                };
                match tx.try_send(tick) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        trace!("틱 채널 가득 참, 틱 버림: {:?} #{}", kind, sequence);
                    }
                    // 수신 측(엔진) 소멸
                    Err(TrySendError::Closed(_)) => break,
                }
                sequence = sequence.saturating_add(1);
            }
        }));
        debug!("타이머 시작: {:?} 세대 {}", kind, generation);
        true
    }

    /// 진행 중인 작업 취소: 취소된 작업이 있었는지 반환
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                debug!("타이머 취소: {:?} 세대 {}", self.kind, self.generation);
                true
            }
            None => false,
        }
    }

    /// 작업 활성 여부
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// 현재 활성 작업이 보낸 틱인지 확인
    pub fn accepts(&self, tick: &TimerTick) -> bool {
        self.handle.is_some() && tick.kind == self.kind && tick.generation == self.generation
    }

    /// 현재 세대
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
