//! Blog status workflow.
//!
//! Blogs enter as `pending`. Administrators move them with the three
//! moderation actions; authors can only push a published blog back into the
//! queue by editing its title or content.
//!
//! ```text
//!   pending ──approve──▶ published ──hide──▶ hidden
//!      │                   ▲   │               │
//!    reject                │   └─author edit─▶ pending
//!      ▼                   │
//!   rejected ──approve─────┘◀──────approve─────┘
//! ```
use std::str::FromStr;

use crate::{data_formats::UpdateBlogRequest, errors::RequestError, models::BlogStatus};

pub const DEFAULT_REJECTION_REASON: &str = "Does not meet our content guidelines";
pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject,
    Hide,
}

impl ModerationAction {
    pub fn verb(&self) -> &'static str {
        match self {
            ModerationAction::Approve => "approve",
            ModerationAction::Reject => "reject",
            ModerationAction::Hide => "hide",
        }
    }

    /// States each action may start from.
    pub fn sources(&self) -> &'static [BlogStatus] {
        match self {
            ModerationAction::Approve => &[
                BlogStatus::Pending,
                BlogStatus::Rejected,
                BlogStatus::Hidden,
            ],
            ModerationAction::Reject => &[BlogStatus::Pending],
            ModerationAction::Hide => &[BlogStatus::Published],
        }
    }

    pub fn target(&self) -> BlogStatus {
        match self {
            ModerationAction::Approve => BlogStatus::Published,
            ModerationAction::Reject => BlogStatus::Rejected,
            ModerationAction::Hide => BlogStatus::Hidden,
        }
    }
}

pub fn transition(
    current: BlogStatus,
    action: ModerationAction,
) -> Result<BlogStatus, RequestError> {
    if action.sources().contains(&current) {
        Ok(action.target())
    } else {
        Err(RequestError::validation(format!(
            "Cannot {} a blog that is {}",
            action.verb(),
            current
        )))
    }
}

/// Outcome of checking a blog update against the caller's role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    /// Status to store, when it changes.
    pub status: Option<BlogStatus>,
    pub rejection_reason: Option<String>,
    /// Set when the blog leaves for any status other than `rejected`.
    pub clear_rejection_reason: bool,
}

/// Decides what an update may write.
///
/// Authors may only touch title, content, excerpt, cover image and tags;
/// editing the title or content of a published blog sends it back to
/// `pending`. Administrators may also set the status and rejection reason.
pub fn plan_update(
    current: BlogStatus,
    is_admin: bool,
    request: &UpdateBlogRequest,
) -> Result<UpdatePlan, RequestError> {
    if is_admin {
        let status = request
            .status
            .as_deref()
            .map(BlogStatus::from_str)
            .transpose()
            .map_err(RequestError::ValidationError)?;
        let status = status.filter(|status| *status != current);
        let clear_rejection_reason = status.is_some_and(|status| status != BlogStatus::Rejected);
        let rejection_reason = if clear_rejection_reason {
            None
        } else {
            request.rejection_reason.clone()
        };
        return Ok(UpdatePlan {
            status,
            rejection_reason,
            clear_rejection_reason,
        });
    }

    if request.touches_admin_fields() {
        let message = if current == BlogStatus::Published {
            "Cannot update status of a published blog"
        } else {
            "Only administrators may change the status of a blog"
        };
        return Err(RequestError::validation(message));
    }

    let status = (current == BlogStatus::Published && request.touches_title_or_content())
        .then_some(BlogStatus::Pending);
    Ok(UpdatePlan {
        status,
        rejection_reason: None,
        clear_rejection_reason: status.is_some(),
    })
}

pub fn is_publicly_visible(status: BlogStatus) -> bool {
    status == BlogStatus::Published
}

/// Minutes needed to read `content`, never less than one.
pub fn read_time(content: &str) -> i64 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_reaches_published_from_queue_and_terminal_states() {
        for from in [BlogStatus::Pending, BlogStatus::Rejected, BlogStatus::Hidden] {
            assert_eq!(
                transition(from, ModerationAction::Approve).unwrap(),
                BlogStatus::Published
            );
        }
        assert!(transition(BlogStatus::Published, ModerationAction::Approve).is_err());
        assert!(transition(BlogStatus::Draft, ModerationAction::Approve).is_err());
    }

    #[test]
    fn reject_only_from_pending_and_hide_only_from_published() {
        assert_eq!(
            transition(BlogStatus::Pending, ModerationAction::Reject).unwrap(),
            BlogStatus::Rejected
        );
        assert_eq!(
            transition(BlogStatus::Published, ModerationAction::Hide).unwrap(),
            BlogStatus::Hidden
        );
        for status in BlogStatus::ALL {
            if status != BlogStatus::Pending {
                assert!(transition(status, ModerationAction::Reject).is_err());
            }
            if status != BlogStatus::Published {
                assert!(transition(status, ModerationAction::Hide).is_err());
            }
        }
    }

    #[test]
    fn rejected_transition_error_names_the_state() {
        let error = transition(BlogStatus::Pending, ModerationAction::Hide).unwrap_err();
        assert_eq!(error.to_string(), "Cannot hide a blog that is pending");
    }

    #[test]
    fn author_edit_of_published_title_returns_to_pending() {
        let request = UpdateBlogRequest {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        let plan = plan_update(BlogStatus::Published, false, &request).unwrap();
        assert_eq!(plan.status, Some(BlogStatus::Pending));

        let request = UpdateBlogRequest {
            content: Some("New body".to_string()),
            ..Default::default()
        };
        let plan = plan_update(BlogStatus::Published, false, &request).unwrap();
        assert_eq!(plan.status, Some(BlogStatus::Pending));
    }

    #[test]
    fn author_edit_of_excerpt_or_unpublished_keeps_status() {
        let excerpt = UpdateBlogRequest {
            excerpt: Some("tweak".to_string()),
            tags: Some(vec!["rust".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            plan_update(BlogStatus::Published, false, &excerpt)
                .unwrap()
                .status,
            None
        );

        let title = UpdateBlogRequest {
            title: Some("New".to_string()),
            ..Default::default()
        };
        for status in [BlogStatus::Pending, BlogStatus::Rejected, BlogStatus::Hidden] {
            assert_eq!(plan_update(status, false, &title).unwrap().status, None);
        }
    }

    #[test]
    fn author_cannot_set_status() {
        let request = UpdateBlogRequest {
            status: Some("published".to_string()),
            ..Default::default()
        };
        let error = plan_update(BlogStatus::Published, false, &request).unwrap_err();
        assert_eq!(error.to_string(), "Cannot update status of a published blog");
        assert!(plan_update(BlogStatus::Pending, false, &request).is_err());

        let reason = UpdateBlogRequest {
            rejection_reason: Some("mine".to_string()),
            ..Default::default()
        };
        assert!(plan_update(BlogStatus::Rejected, false, &reason).is_err());
    }

    #[test]
    fn admin_may_set_any_status_but_not_an_unknown_one() {
        let request = UpdateBlogRequest {
            status: Some("draft".to_string()),
            title: Some("Edited by admin".to_string()),
            ..Default::default()
        };
        let plan = plan_update(BlogStatus::Published, true, &request).unwrap();
        assert_eq!(plan.status, Some(BlogStatus::Draft));

        let title_only = UpdateBlogRequest {
            title: Some("Edited by admin".to_string()),
            ..Default::default()
        };
        assert_eq!(
            plan_update(BlogStatus::Published, true, &title_only)
                .unwrap()
                .status,
            None
        );

        let bogus = UpdateBlogRequest {
            status: Some("archived".to_string()),
            ..Default::default()
        };
        assert!(plan_update(BlogStatus::Pending, true, &bogus).is_err());
    }

    #[test]
    fn leaving_for_a_status_other_than_rejected_clears_the_reason() {
        let publish = UpdateBlogRequest {
            status: Some("published".to_string()),
            rejection_reason: Some("ignored".to_string()),
            ..Default::default()
        };
        let plan = plan_update(BlogStatus::Rejected, true, &publish).unwrap();
        assert!(plan.clear_rejection_reason);
        assert_eq!(plan.rejection_reason, None);

        let reject = UpdateBlogRequest {
            status: Some("rejected".to_string()),
            rejection_reason: Some("Off topic".to_string()),
            ..Default::default()
        };
        let plan = plan_update(BlogStatus::Pending, true, &reject).unwrap();
        assert!(!plan.clear_rejection_reason);
        assert_eq!(plan.rejection_reason.as_deref(), Some("Off topic"));

        let reason_only = UpdateBlogRequest {
            rejection_reason: Some("Clarified".to_string()),
            ..Default::default()
        };
        let plan = plan_update(BlogStatus::Rejected, true, &reason_only).unwrap();
        assert!(!plan.clear_rejection_reason);
    }

    #[test]
    fn read_time_rounds_up_at_two_hundred_words() {
        assert_eq!(read_time(""), 1);
        assert_eq!(read_time("one two three"), 1);
        assert_eq!(read_time(&"word ".repeat(200)), 1);
        assert_eq!(read_time(&"word ".repeat(201)), 2);
        assert_eq!(read_time(&"word\n\t".repeat(1000)), 5);
    }
}
