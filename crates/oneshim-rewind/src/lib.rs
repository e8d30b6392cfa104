//! # oneshim-rewind
//!
//! 리와인드 타임라인 스크러버/재생 엔진 크레이트.
//! 캡처 배열 위에서 최근접 탐색, 앱 세그먼트 분할, 드래그 스크럽 미리보기,
//! 두 점 범위 선택, 배속 재생, 방향키 홀드 가속을 담당한다.
//!
//! 엔진은 UI를 그리지 않는다. 호스트는 포인터/키 입력을 넘기고
//! [`events::RewindEvent`] 스트림과 조회 메서드로 화면을 갱신한다.
//!
//! ## 구조
//!
//! - [`engine`]: 컴포지션 루트 ([`engine::RewindEngine`])
//! - [`dataset`] / [`locator`] / [`segments`]: 캡처 배열과 순수 계산
//! - [`selection`] / [`scrubber`]: 범위 선택 상태 머신, 포인터 제스처
//! - [`timer`] / [`playback`] / [`hold`]: 취소 가능한 틱 작업
//! - [`prefetch`]: 인접 원본 이미지 프리페치 (LRU)
//! - [`events`] / [`input`]: 이벤트 버스, 키 입력과 호스트 명령

pub mod dataset;
pub mod engine;
pub mod error;
pub mod events;
pub mod hold;
pub mod input;
pub mod locator;
pub mod playback;
pub mod prefetch;
pub mod scrubber;
pub mod segments;
pub mod selection;
pub mod timer;
