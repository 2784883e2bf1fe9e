use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Selection,
    Upload,
    Ask,
    PreviewDecode,
    FileDiscovery,
}

#[derive(Debug, Clone, Default)]
pub enum TaskMeta {
    #[default]
    None,
    Upload {
        files: usize,
    },
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
    pub cancel: Option<CancellationToken>,
    pub meta: TaskMeta,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in `TuiState`, mutated only by the reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
    pub meta: TaskMeta,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn on_started(&mut self, started: &TaskStarted) {
        self.active = Some(started.id);
        self.cancel = started.cancel.clone();
        self.meta = started.meta.clone();
    }

    /// Clears the slot if `id` is the task it tracks. A newer task of the
    /// same kind makes older completions report `false`.
    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.clear();
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.cancel = None;
        self.meta = TaskMeta::None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub selection: TaskState,
    pub upload: TaskState,
    pub ask: TaskState,
    pub preview_decode: TaskState,
    pub file_discovery: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::Selection => &self.selection,
            TaskKind::Upload => &self.upload,
            TaskKind::Ask => &self.ask,
            TaskKind::PreviewDecode => &self.preview_decode,
            TaskKind::FileDiscovery => &self.file_discovery,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::Selection => &mut self.selection,
            TaskKind::Upload => &mut self.upload,
            TaskKind::Ask => &mut self.ask,
            TaskKind::PreviewDecode => &mut self.preview_decode,
            TaskKind::FileDiscovery => &mut self.file_discovery,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.selection.is_running()
            || self.upload.is_running()
            || self.ask.is_running()
            || self.preview_decode.is_running()
            || self.file_discovery.is_running()
    }
}
