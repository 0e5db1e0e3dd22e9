//! Author-facing notifications.
//!
//! Handlers build a [`Notification`] from one of the templates below and hand
//! it to the configured [`Notifier`]. Delivery is pluggable; the default
//! [`LogNotifier`] only records the message in the log.
use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[axum::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[axum::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> Result<()> {
        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            "notification"
        );
        tracing::debug!(body = %notification.body, "notification body");
        Ok(())
    }
}

/// Sends and swallows failures; the primary operation has already succeeded.
pub async fn notify(notifier: &dyn Notifier, notification: Notification) {
    let to = notification.to.clone();
    let subject = notification.subject.clone();
    if let Err(error) = notifier.send(notification).await {
        tracing::warn!(%to, %subject, error = ?error, "notification failed");
    }
}

impl Notification {
    fn new(to: &str, subject: &str, body: String) -> Self {
        Notification {
            to: to.to_string(),
            subject: subject.to_string(),
            body,
        }
    }

    pub fn welcome(to: &str, name: &str) -> Self {
        Self::new(
            to,
            "Welcome to Blogdesk",
            format!(
                "Hello {name},\n\nThank you for joining. You can now start writing and sharing posts."
            ),
        )
    }

    pub fn blog_submitted(to: &str, name: &str, blog_title: &str) -> Self {
        Self::new(
            to,
            "Blog Submitted Successfully",
            format!(
                "Hello {name},\n\nYour blog \"{blog_title}\" has been submitted and is pending review. \
                 We'll notify you once it's approved and published."
            ),
        )
    }

    pub fn blog_approved(to: &str, name: &str, blog_title: &str, blog_url: &str) -> Self {
        Self::new(
            to,
            "Your Blog Has Been Approved",
            format!(
                "Hello {name},\n\nYour blog \"{blog_title}\" has been approved and is now published.\n\
                 View it at {blog_url}"
            ),
        )
    }

    pub fn blog_rejected(to: &str, name: &str, blog_title: &str, reason: &str) -> Self {
        Self::new(
            to,
            "Blog Submission Update",
            format!(
                "Hello {name},\n\nWe've reviewed your blog \"{blog_title}\" and cannot publish it at this time.\n\
                 Reason: {reason}\n\nYou can edit and resubmit it from your dashboard."
            ),
        )
    }

    pub fn blog_deleted(to: &str, name: &str, blog_title: &str) -> Self {
        Self::new(
            to,
            "Your Blog Has Been Deleted",
            format!(
                "Hello {name},\n\nYour blog \"{blog_title}\" has been deleted by an administrator."
            ),
        )
    }

    pub fn new_comment(
        to: &str,
        name: &str,
        blog_title: &str,
        commenter_name: &str,
        blog_url: &str,
    ) -> Self {
        Self::new(
            to,
            "New Comment on Your Blog",
            format!(
                "Hello {name},\n\n{commenter_name} has commented on your blog \"{blog_title}\".\n\
                 Check it out at {blog_url}"
            ),
        )
    }

    pub fn password_reset(to: &str, name: &str, reset_url: &str, minutes: i64) -> Self {
        Self::new(
            to,
            "Password Reset Request",
            format!(
                "Hello {name},\n\nYou requested a password reset. Use the link below to choose a new password:\n\
                 {reset_url}\n\nThis link expires in {minutes} minutes. If you didn't request this, ignore this message."
            ),
        )
    }
}
