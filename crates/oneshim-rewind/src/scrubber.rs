//! 스크러버: 픽셀 ↔ 시각 ↔ 인덱스 좌표 변환과 드래그/호버 제스처.
//!
//! 드래그 중에는 커밋된 상태(`current_index`, 선택)를 건드리지 않고
//! 가벼운 미리보기 이벤트만 낸다. 커밋은 드래그 종료 시에만 일어난다.
//! 범위 선택 모드에서는 포인터 위치가 곧바로 선택기에 반영된다.

use oneshim_core::models::capture::Capture;
use oneshim_core::ports::media::MediaResolver;
use serde::Serialize;
use tracing::debug;

use crate::locator::nearest_index_by_key;
use crate::selection::{RangeSelector, SelectionState};

/// 트랙이 표현하는 벽시계 구간 `[start, end]` (Unix 초)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimeWindow {
    /// 시작 시각
    pub start: i64,
    /// 종료 시각
    pub end: i64,
}

impl TimeWindow {
    /// 구간 생성 (뒤집혀 들어오면 교환)
    pub fn new(start: i64, end: i64) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// 구간 길이 (초)
    pub fn span_secs(&self) -> i64 {
        self.end - self.start
    }

    /// 트랙 x좌표 → 시각 (트랙 밖은 양 끝으로 클램프)
    pub fn pixel_to_time(&self, x: f64, track_width: f64) -> f64 {
        let ratio = if track_width > 0.0 {
            (x / track_width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.start as f64 + ratio * self.span_secs() as f64
    }

    /// 시각 → 트랙 비율 `[0, 1]` (길이 0인 구간은 0)
    pub fn time_to_fraction(&self, t: f64) -> f64 {
        let span = self.span_secs() as f64;
        if span <= 0.0 {
            return 0.0;
        }
        ((t - self.start as f64) / span).clamp(0.0, 1.0)
    }
}

/// 미리보기 내용 (떠 있는 썸네일 + 시각)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrubPreview {
    /// 포인터 위치에서 가장 가까운 캡처 인덱스
    pub index: usize,
    /// 해당 캡처 시각
    pub timestamp: i64,
    /// 시각 라벨 (HH:MM:SS)
    pub time_label: String,
    /// 앱 라벨
    pub app_name: String,
    /// 썸네일 URL
    pub thumbnail_url: String,
    /// 포인터의 트랙 비율
    pub pointer_fraction: f64,
    /// 드래그 중 여부
    pub dragging: bool,
}

/// 라이브 미리보기 채널 이벤트
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state")]
pub enum PreviewEvent {
    /// 미리보기 표시/갱신
    Show(ScrubPreview),
    /// 미리보기 숨김
    Hide,
}

/// 진행 중인 드래그 제스처
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragGesture {
    /// 범위 선택 모드에서 시작했는지
    pub range_select: bool,
    /// 마지막으로 계산된 인덱스
    pub last_index: usize,
}

/// 제스처 처리 결과
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureOutcome {
    /// 미리보기 채널로 보낼 이벤트
    pub preview: Option<PreviewEvent>,
    /// 커밋할 인덱스 (드래그 종료 시)
    pub commit_index: Option<usize>,
    /// 선택 상태 변경 여부
    pub selection_changed: bool,
}

/// 제스처 입력 컨텍스트: 엔진 소유 상태를 참조로 넘긴다
pub struct GestureContext<'a> {
    /// 로드된 캡처 배열
    pub captures: &'a [Capture],
    /// 범위 선택기
    pub selector: &'a mut RangeSelector,
    /// 미디어 URL 해석기
    pub resolver: &'a dyn MediaResolver,
    /// 범위 선택 모드
    pub range_select_mode: bool,
}

/// 스크러버 컨트롤러
#[derive(Debug, Clone, Default)]
pub struct ScrubberController {
    window: TimeWindow,
    drag: Option<DragGesture>,
    preview_visible: bool,
}

impl ScrubberController {
    /// 구간으로 생성
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            drag: None,
            preview_visible: false,
        }
    }

    /// 현재 구간
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// 새 구간 설치: 진행 중인 제스처는 버린다
    pub fn reset(&mut self, window: TimeWindow) {
        if self.drag.take().is_some() {
            debug!("로드로 인해 드래그 제스처 해제");
        }
        self.window = window;
        self.preview_visible = false;
    }

    /// 드래그 진행 여부
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// 현재 드래그 제스처
    pub fn drag(&self) -> Option<DragGesture> {
        self.drag
    }

    /// 미리보기 표시 여부
    pub fn preview_visible(&self) -> bool {
        self.preview_visible
    }

    /// 트랙 x좌표에서 가장 가까운 인덱스
    pub fn index_at(&self, captures: &[Capture], x: f64, track_width: f64) -> Option<usize> {
        let t = self.window.pixel_to_time(x, track_width).round() as i64;
        nearest_index_by_key(captures, t, |c| c.timestamp)
    }

    /// 포인터 누름: 제스처 획득
    pub fn pointer_down(
        &mut self,
        mut ctx: GestureContext<'_>,
        x: f64,
        track_width: f64,
    ) -> GestureOutcome {
        let Some(index) = self.index_at(ctx.captures, x, track_width) else {
            return GestureOutcome::default();
        };

        let mut selection_changed = false;
        if ctx.range_select_mode {
            selection_changed = match ctx.selector.state() {
                SelectionState::PendingEnd { .. } => ctx.selector.set_end(index),
                _ => ctx.selector.set_start(index),
            };
        }

        self.drag = Some(DragGesture {
            range_select: ctx.range_select_mode,
            last_index: index,
        });
        debug!("드래그 시작: 인덱스 {}", index);

        GestureOutcome {
            preview: Some(self.show(&ctx, index, x, track_width, true)),
            commit_index: None,
            selection_changed,
        }
    }

    /// 포인터 이동: 드래그 중이면 미리보기/선택 갱신, 아니면 호버 미리보기
    pub fn pointer_move(
        &mut self,
        mut ctx: GestureContext<'_>,
        x: f64,
        track_width: f64,
    ) -> GestureOutcome {
        let Some(index) = self.index_at(ctx.captures, x, track_width) else {
            return GestureOutcome::default();
        };

        if self.drag.is_none() {
            // 호버: 커밋 상태는 건드리지 않는다
            return GestureOutcome {
                preview: Some(self.show(&ctx, index, x, track_width, false)),
                ..Default::default()
            };
        }
        let mut range_select = false;
        if let Some(drag) = self.drag.as_mut() {
            drag.last_index = index;
            range_select = drag.range_select;
        }

        let selection_changed = range_select && drag_selection_to(&mut ctx, index);

        GestureOutcome {
            preview: Some(self.show(&ctx, index, x, track_width, true)),
            commit_index: None,
            selection_changed,
        }
    }

    /// 포인터 뗌: 제스처 해제, 일반 모드면 인덱스 커밋
    pub fn pointer_up(
        &mut self,
        mut ctx: GestureContext<'_>,
        x: f64,
        track_width: f64,
    ) -> GestureOutcome {
        let Some(drag) = self.drag.take() else {
            return GestureOutcome::default();
        };
        let index = self
            .index_at(ctx.captures, x, track_width)
            .unwrap_or(drag.last_index);

        // 이동 없이 다른 위치에서 떼도 끝점으로 확정
        let selection_changed = drag.range_select && drag_selection_to(&mut ctx, index);
        debug!("드래그 종료: 인덱스 {}", index);

        GestureOutcome {
            // 포인터는 아직 트랙 위에 있으므로 호버 미리보기로 전환
            preview: Some(self.show(&ctx, index, x, track_width, false)),
            commit_index: (!drag.range_select).then_some(index),
            selection_changed,
        }
    }

    /// 포인터가 트랙을 벗어남: 드래그 중이 아니면 미리보기 숨김
    pub fn pointer_leave(&mut self) -> Option<PreviewEvent> {
        if self.drag.is_some() || !self.preview_visible {
            return None;
        }
        self.preview_visible = false;
        Some(PreviewEvent::Hide)
    }

    /// 제스처 중단 (포인터 캡처 상실 등): 커밋 없이 해제
    pub fn pointer_cancel(&mut self) -> Option<PreviewEvent> {
        let had_drag = self.drag.take().is_some();
        if had_drag {
            debug!("드래그 중단");
        }
        if had_drag || self.preview_visible {
            self.preview_visible = false;
            return Some(PreviewEvent::Hide);
        }
        None
    }

    fn show(
        &mut self,
        ctx: &GestureContext<'_>,
        index: usize,
        x: f64,
        track_width: f64,
        dragging: bool,
    ) -> PreviewEvent {
        self.preview_visible = true;
        let capture = &ctx.captures[index];
        let pointer_time = self.window.pixel_to_time(x, track_width);
        PreviewEvent::Show(ScrubPreview {
            index,
            timestamp: capture.timestamp,
            time_label: capture.time_label(),
            app_name: capture.app_label().to_string(),
            thumbnail_url: ctx.resolver.resolve_media_url(&capture.thumbnail_ref),
            pointer_fraction: self.window.time_to_fraction(pointer_time),
            dragging,
        })
    }
}

/// 범위 모드 드래그가 `index`에 닿았을 때 선택 갱신
fn drag_selection_to(ctx: &mut GestureContext<'_>, index: usize) -> bool {
    match ctx.selector.state() {
        SelectionState::PendingEnd { start } if start != index => ctx.selector.set_end(index),
        SelectionState::Selected { .. } => ctx.selector.extend(index),
        _ => false,
    }
}
