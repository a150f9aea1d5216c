//! Toast notifications
//!
//! The single notification surface every handler reports through. Errors
//! carry a short humanized title as the text and the raw server detail
//! underneath; toasts expire after a fixed number of ticks.

/// How long a toast stays visible, in event-loop ticks (~50ms each).
const TOAST_TTL_TICKS: u16 = 120;

/// Maximum number of toasts kept; older ones are dropped first.
const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastSeverity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub severity: ToastSeverity,
    pub text: String,
    pub detail: Option<String>,
    pub ticks_remaining: u16,
}

impl Toast {
    fn new(severity: ToastSeverity, text: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            severity,
            text: text.into(),
            detail,
            ticks_remaining: TOAST_TTL_TICKS,
        }
    }
}

/// The notification stack shown in the bottom-right corner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastStack {
    toasts: Vec<Toast>,
}

impl ToastStack {
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Toast::new(ToastSeverity::Info, text, None));
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Toast::new(ToastSeverity::Success, text, None));
    }

    /// Error toast: `text` is the humanized title, `detail` the raw message.
    pub fn error(&mut self, text: impl Into<String>, detail: impl Into<String>) {
        let detail = detail.into();
        let detail = (!detail.is_empty()).then_some(detail);
        self.push(Toast::new(ToastSeverity::Error, text, detail));
    }

    fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
        if self.toasts.len() > MAX_TOASTS {
            self.toasts.remove(0);
        }
    }

    /// Advance one event-loop tick, expiring old toasts.
    pub fn tick(&mut self) {
        for toast in &mut self.toasts {
            toast.ticks_remaining = toast.ticks_remaining.saturating_sub(1);
        }
        self.toasts.retain(|t| t.ticks_remaining > 0);
    }

    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Most recent toast, newest wins.
    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }
}

/// Turn a raw error token into a readable notification title:
/// separators become spaces and the first letter is capitalized.
///
/// `"keypair_not_found"` → `"Keypair not found"`.
pub fn relieved_title(raw: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relieved_title() {
        assert_eq!(relieved_title("keypair_not_found"), "Keypair not found");
        assert_eq!(relieved_title("rate-limit-exceeded"), "Rate limit exceeded");
        assert_eq!(relieved_title(""), "");
        assert_eq!(relieved_title("already readable"), "Already readable");
    }

    #[test]
    fn test_toast_expiry() {
        let mut stack = ToastStack::default();
        stack.info("hello");
        assert_eq!(stack.visible().len(), 1);
        for _ in 0..TOAST_TTL_TICKS {
            stack.tick();
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn test_toast_cap() {
        let mut stack = ToastStack::default();
        for i in 0..10 {
            stack.info(format!("toast {i}"));
        }
        assert_eq!(stack.visible().len(), MAX_TOASTS);
        assert_eq!(stack.latest().unwrap().text, "toast 9");
    }

    #[test]
    fn test_error_toast_keeps_detail() {
        let mut stack = ToastStack::default();
        stack.error("Unable to delete keypair", "keypair not found");
        let toast = stack.latest().unwrap();
        assert_eq!(toast.severity, ToastSeverity::Error);
        assert_eq!(toast.detail.as_deref(), Some("keypair not found"));
    }

    #[test]
    fn test_empty_detail_is_dropped() {
        let mut stack = ToastStack::default();
        stack.error("Failed", "");
        assert_eq!(stack.latest().unwrap().detail, None);
    }
}
