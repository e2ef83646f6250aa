#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Saving,
    Error,
}

impl ViewStatus {
    pub fn label(self) -> &'static str {
        match self {
            ViewStatus::Idle => "idle",
            ViewStatus::Loading => "loading",
            ViewStatus::Loaded => "loaded",
            ViewStatus::Saving => "saving",
            ViewStatus::Error => "error",
        }
    }
}

/// Results tagged with an older generation are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn bump(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn current(self) -> u64 {
        self.0
    }

    pub fn is_current(self, generation: u64) -> bool {
        self.0 == generation
    }
}

pub fn step_next(selected: usize, total: usize) -> usize {
    if total == 0 { 0 } else { (selected + 1) % total }
}

pub fn step_prev(selected: usize, total: usize) -> usize {
    if total == 0 {
        0
    } else if selected == 0 {
        total - 1
    } else {
        selected - 1
    }
}

pub fn clamp_index(selected: usize, total: usize) -> usize {
    if total == 0 {
        0
    } else {
        selected.min(total - 1)
    }
}

pub fn cycle_option(current: Option<&str>, options: &[String], forward: bool) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let pos = current.and_then(|c| options.iter().position(|o| o == c));
    let next = match (pos, forward) {
        (None, true) => Some(0),
        (None, false) => Some(options.len() - 1),
        (Some(idx), true) if idx + 1 < options.len() => Some(idx + 1),
        (Some(idx), false) if idx > 0 => Some(idx - 1),
        _ => None,
    };
    next.map(|idx| options[idx].clone())
}

pub fn unique_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = values
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    out.sort();
    out.dedup();
    out
}
