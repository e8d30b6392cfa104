//! 엔진 이벤트 스트림.
//!
//! `tokio::broadcast` 기반. 호스트는 구독해서 렌더링에 필요한 변화만 받는다.
//! 미리보기 이벤트는 커밋된 상태와 분리된 고빈도 채널 역할을 한다.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::playback::SpeedMultiplier;
use crate::scrubber::PreviewEvent;
use crate::selection::RangeSelection;

/// 변경 작업 종류
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum MutationKind {
    /// 범위 일괄 삭제
    Delete,
    /// 범위를 컬렉션으로 저장
    SaveCollection {
        /// 컬렉션 이름
        name: String,
    },
}

/// 엔진 이벤트
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RewindEvent {
    /// 새 데이터셋 설치 완료
    Loaded {
        /// 캡처 수
        captures: usize,
        /// 재생 세그먼트 수
        segments: usize,
    },
    /// 현재 인덱스 변경
    IndexChanged {
        /// 새 인덱스
        index: usize,
        /// 트랙 비율
        fraction: f64,
    },
    /// 라이브 미리보기
    Preview(PreviewEvent),
    /// 재생 상태 변경
    PlaybackChanged {
        /// 재생 중 여부
        playing: bool,
        /// 배속
        speed: SpeedMultiplier,
    },
    /// 선택 상태 변경
    SelectionChanged {
        /// 확정된 선택 (없으면 None)
        selection: Option<RangeSelection>,
        /// 시작점만 찍힌 경우 그 인덱스
        pending_start: Option<usize>,
    },
    /// 범위 선택 모드 전환
    RangeSelectModeChanged {
        /// 활성 여부
        enabled: bool,
    },
    /// 변경 작업 시작 (버튼 비활성화)
    MutationStarted {
        /// 작업 종류
        kind: MutationKind,
    },
    /// 변경 작업 종료
    MutationFinished {
        /// 작업 종류
        kind: MutationKind,
        /// 성공 여부
        success: bool,
    },
}

/// 엔진 이벤트 버스
#[derive(Debug)]
pub struct RewindEventBus {
    tx: broadcast::Sender<RewindEvent>,
}

impl RewindEventBus {
    /// 새 이벤트 버스 생성
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// 이벤트 발행 (구독자가 없어도 에러 아님)
    pub fn publish(&self, event: RewindEvent) {
        trace!("이벤트 발행: {:?}", std::mem::discriminant(&event));
        let _ = self.tx.send(event);
    }

    /// 구독자 생성
    pub fn subscribe(&self) -> broadcast::Receiver<RewindEvent> {
        self.tx.subscribe()
    }
}

impl Default for RewindEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
