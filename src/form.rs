#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Flag,
    Choice(Vec<ChoiceOption>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    /// Only shown (and only submitted) while this flag field is "true".
    pub shown_when: Option<&'static str>,
}

impl FormField {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let value = match kind {
            FieldKind::Flag => "false".to_string(),
            _ => String::new(),
        };
        Self {
            key,
            label,
            kind,
            value,
            shown_when: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn shown_when(mut self, flag: &'static str) -> Self {
        self.shown_when = Some(flag);
        self
    }

    pub fn display_value(&self) -> String {
        match &self.kind {
            FieldKind::Flag => {
                if parse_flag(&self.value) {
                    "Yes".to_string()
                } else {
                    "No".to_string()
                }
            }
            FieldKind::Choice(options) => options
                .iter()
                .find(|o| o.value == self.value)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| self.value.clone()),
            _ => self.value.clone(),
        }
    }

    fn accepts(&self, ch: char) -> bool {
        match self.kind {
            FieldKind::Text => !ch.is_control(),
            FieldKind::Integer => ch.is_ascii_digit() || (ch == '-' && self.value.is_empty()),
            FieldKind::Decimal => {
                ch.is_ascii_digit()
                    || (ch == '-' && self.value.is_empty())
                    || (ch == '.' && !self.value.contains('.'))
            }
            FieldKind::Flag | FieldKind::Choice(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub title: String,
    pub record_id: Option<u32>,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl Form {
    pub fn new(title: impl Into<String>, record_id: Option<u32>, fields: Vec<FormField>) -> Self {
        Self {
            title: title.into(),
            record_id,
            fields,
            focus: 0,
        }
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.key == key) {
            field.value = value.into();
        }
    }

    pub fn is_shown(&self, field: &FormField) -> bool {
        match field.shown_when {
            Some(flag) => parse_flag(self.value(flag)),
            None => true,
        }
    }

    pub fn shown_value(&self, key: &str) -> Option<&str> {
        let field = self.fields.iter().find(|f| f.key == key)?;
        if self.is_shown(field) {
            Some(field.value.as_str())
        } else {
            None
        }
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = (usize, &FormField)> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| self.is_shown(f))
    }

    pub fn focused(&self) -> Option<&FormField> {
        self.fields.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        self.step_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.step_focus(self.fields.len().saturating_sub(1));
    }

    fn step_focus(&mut self, step: usize) {
        let len = self.fields.len();
        if len == 0 {
            return;
        }
        let mut idx = self.focus;
        for _ in 0..len {
            idx = (idx + step) % len;
            if self.is_shown(&self.fields[idx]) {
                self.focus = idx;
                return;
            }
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        if field.accepts(ch) {
            field.value.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if matches!(field.kind, FieldKind::Text | FieldKind::Integer | FieldKind::Decimal) {
                field.value.pop();
            }
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        match &field.kind {
            FieldKind::Flag => {
                field.value = (!parse_flag(&field.value)).to_string();
            }
            FieldKind::Choice(options) if !options.is_empty() => {
                let len = options.len();
                let current = options.iter().position(|o| o.value == field.value);
                let next = match (current, forward) {
                    (None, true) => 0,
                    (None, false) => len - 1,
                    (Some(idx), true) => (idx + 1) % len,
                    (Some(idx), false) => (idx + len - 1) % len,
                };
                field.value = options[next].value.clone();
            }
            _ => {}
        }
    }
}

pub fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

pub fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

pub fn text_or_none(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn fmt_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn fmt_amount(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
