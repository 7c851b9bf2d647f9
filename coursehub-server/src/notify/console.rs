//! Log-only notifier for development

use coursehub_core::Announcement;

use super::Notifier;

pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn send_announcement(
        &self,
        email: &str,
        course_title: &str,
        announcement: &Announcement,
    ) -> Result<(), String> {
        tracing::info!(
            email = %email,
            course = %course_title,
            title = %announcement.title,
            "Announcement notice sent"
        );
        Ok(())
    }
}
