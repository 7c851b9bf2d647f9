//! Outbound notifications

pub mod console;

pub use console::ConsoleNotifier;

use coursehub_core::Announcement;

/// Delivers announcement notices to students.
///
/// Sends are fire-and-forget: callers log failures and carry on.
pub trait Notifier: Send + Sync {
    fn send_announcement(
        &self,
        email: &str,
        course_title: &str,
        announcement: &Announcement,
    ) -> Result<(), String>;
}

impl Notifier for Box<dyn Notifier> {
    fn send_announcement(
        &self,
        email: &str,
        course_title: &str,
        announcement: &Announcement,
    ) -> Result<(), String> {
        (**self).send_announcement(email, course_title, announcement)
    }
}
