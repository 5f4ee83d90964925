//! 滑卡堆栈状态机
//!
//! Loading -> Ready / Empty / Error；Ready 状态下顶部卡片接受一次滑卡，
//! 进入动画（begin_swipe）后由计时器完成（complete_swipe）并前进一张。

use crate::social::discovery::filters::apply_filters;
use crate::social::discovery::models::{
    DiscoveryFilters, EmptyReason, PendingSwipe, StackStatus, SwipeCandidate, SwipeDirection,
    SwipeHistoryEntry,
};
use chrono::Utc;
use std::collections::VecDeque;

/// 同时渲染的卡片数（顶部 + 2 张预览）
pub const VISIBLE_CARDS: usize = 3;

#[derive(Debug, Clone)]
pub struct SwipeStack {
    base: Vec<SwipeCandidate>,
    filters: DiscoveryFilters,
    filtered: Vec<SwipeCandidate>,
    current_index: usize,
    history: VecDeque<SwipeHistoryEntry>,
    max_history: usize,
    animating: Option<PendingSwipe>,
    exhausted: bool,
    loading: bool,
    error: Option<String>,
}

impl SwipeStack {
    /// `max_history` 为可撤回的步数，至少为 1
    pub fn new(max_history: usize) -> Self {
        Self {
            base: Vec::new(),
            filters: DiscoveryFilters::default(),
            filtered: Vec::new(),
            current_index: 0,
            history: VecDeque::new(),
            max_history: max_history.max(1),
            animating: None,
            exhausted: false,
            loading: true,
            error: None,
        }
    }

    pub fn set_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
        self.animating = None;
    }

    pub fn set_candidates(&mut self, candidates: Vec<SwipeCandidate>) {
        self.loading = false;
        self.error = None;
        self.base = candidates;
        self.refilter();
    }

    pub fn set_filters(&mut self, filters: DiscoveryFilters) {
        self.filters = filters;
        self.refilter();
    }

    /// 重新筛选，并尽量保持在原来的顶部卡片上
    ///
    /// 原顶部卡片不在新列表中时回到第一张；已滑完时如果新列表在最后一张之后
    /// 还有卡片，则从下一张继续。
    fn refilter(&mut self) {
        let anchor = self
            .filtered
            .get(self.current_index)
            .map(|c| c.id.clone());
        let was_exhausted = std::mem::take(&mut self.exhausted);

        self.filtered = apply_filters(&self.base, &self.filters, Utc::now());
        self.animating = None;

        let anchored = anchor
            .as_deref()
            .and_then(|id| self.filtered.iter().position(|c| c.id == id));
        self.current_index = match anchored {
            Some(pos) if was_exhausted => {
                if pos + 1 < self.filtered.len() {
                    pos + 1
                } else {
                    self.exhausted = true;
                    pos
                }
            }
            Some(pos) => pos,
            None => 0,
        };
    }

    pub fn status(&self) -> StackStatus {
        if let Some(err) = &self.error {
            return StackStatus::Error(err.clone());
        }
        if self.loading {
            return StackStatus::Loading;
        }
        if self.filtered.is_empty() {
            return if self.base.is_empty() {
                StackStatus::Empty(EmptyReason::NoCandidates)
            } else {
                StackStatus::Empty(EmptyReason::FiltersTooStrict)
            };
        }
        if self.exhausted {
            return StackStatus::Empty(EmptyReason::Exhausted);
        }
        StackStatus::Ready
    }

    /// 可交互的顶部卡片
    pub fn top(&self) -> Option<&SwipeCandidate> {
        if self.status() != StackStatus::Ready {
            return None;
        }
        self.filtered.get(self.current_index)
    }

    /// 当前渲染的卡片（最多 3 张，第一张为顶部卡片）
    pub fn visible_cards(&self) -> &[SwipeCandidate] {
        if self.status() != StackStatus::Ready {
            return &[];
        }
        let end = (self.current_index + VISIBLE_CARDS).min(self.filtered.len());
        &self.filtered[self.current_index..end]
    }

    pub fn is_animating(&self) -> bool {
        self.animating.is_some()
    }

    /// 开始一次滑卡；不在 Ready 状态或上一张还在动画中时返回 None
    pub fn begin_swipe(&mut self, direction: SwipeDirection) -> Option<PendingSwipe> {
        if self.animating.is_some() {
            return None;
        }
        let candidate = self.top()?.clone();
        let pending = PendingSwipe {
            candidate,
            action: direction.action(),
        };
        self.animating = Some(pending.clone());
        Some(pending)
    }

    /// 动画结束：前进一张并记录历史
    ///
    /// 最后一张滑出后索引不再移动（标记为已滑完），这一步也不进入历史，
    /// 因此撤回总是让索引后退一张并弹出与之对应的记录。
    pub fn complete_swipe(&mut self) -> Option<SwipeHistoryEntry> {
        let pending = self.animating.take()?;
        let entry = SwipeHistoryEntry {
            candidate: pending.candidate,
            action: pending.action,
        };

        if self.current_index + 1 < self.filtered.len() {
            self.current_index += 1;
            self.history.push_back(entry.clone());
            while self.history.len() > self.max_history {
                self.history.pop_front();
            }
        } else {
            self.exhausted = true;
        }
        Some(entry)
    }

    /// 撤回最近一次滑卡（不调用服务端）
    ///
    /// 索引为 0 或没有历史时不做任何事。
    pub fn rewind(&mut self) -> Option<SwipeHistoryEntry> {
        if self.animating.is_some() || self.current_index == 0 {
            return None;
        }
        let entry = self.history.pop_back()?;
        self.current_index -= 1;
        self.exhausted = false;
        Some(entry)
    }

    /// 离开发现页时清空历史
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.animating = None;
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn filters(&self) -> &DiscoveryFilters {
        &self.filters
    }
}
