// User-visible, non-blocking notices
use super::error::ErrorKind;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// No credential configured, synthetic data is shown by policy.
    DemoData,
    /// The upstream call failed and synthetic data replaced it.
    FallbackData { reason: ErrorKind },
    /// Some targets could not be fetched.
    PartialData { missing: Vec<String> },
    /// A user action failed; the previously loaded data is still shown.
    ActionFailed { reason: ErrorKind },
    /// A user-searched identifier does not exist upstream.
    NotFound { target: String },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::DemoData => "Showing demo data".to_string(),
            Notice::FallbackData { reason } => {
                format!("Failed to fetch ({reason:?}), using mock data")
            }
            Notice::PartialData { missing } => {
                format!("Some data could not be loaded: {}", missing.join(", "))
            }
            Notice::ActionFailed { reason } => {
                format!("Your last action failed ({reason:?}), showing previous data")
            }
            Notice::NotFound { target } => format!("'{target}' was not found"),
        }
    }

    /// True when the data on screen is not live.
    pub fn is_demo(&self) -> bool {
        matches!(self, Notice::DemoData | Notice::FallbackData { .. })
    }
}

/// Dismissable banner slot. A new notice re-opens a dismissed banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banner {
    notice: Option<Notice>,
    dismissed: bool,
}

impl Banner {
    pub fn show(&mut self, notice: Notice) {
        if self.notice.as_ref() != Some(&notice) {
            self.dismissed = false;
        }
        self.notice = Some(notice);
    }

    pub fn clear(&mut self) {
        self.notice = None;
        self.dismissed = false;
    }

    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn visible(&self) -> Option<&Notice> {
        if self.dismissed { None } else { self.notice.as_ref() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_and_action_failed_are_distinct() {
        assert!(Notice::DemoData.is_demo());
        assert!(Notice::FallbackData { reason: ErrorKind::Network }.is_demo());
        assert!(!Notice::ActionFailed { reason: ErrorKind::Network }.is_demo());
        assert_ne!(
            Notice::DemoData.message(),
            Notice::ActionFailed { reason: ErrorKind::Network }.message()
        );
    }

    #[test]
    fn test_banner_dismiss_and_reopen() {
        let mut banner = Banner::default();
        banner.show(Notice::DemoData);
        assert_eq!(banner.visible(), Some(&Notice::DemoData));

        banner.dismiss();
        assert_eq!(banner.visible(), None);
        assert_eq!(banner.notice(), Some(&Notice::DemoData));

        // Same notice stays dismissed
        banner.show(Notice::DemoData);
        assert_eq!(banner.visible(), None);

        let failed = Notice::ActionFailed { reason: ErrorKind::Timeout };
        banner.show(failed.clone());
        assert_eq!(banner.visible(), Some(&failed));
    }
}
