use chrono::{DateTime, Utc};

use crate::models::ReviewStatus;

pub fn review_subject(activity_name: &str, decision: ReviewStatus) -> String {
    format!("Your submission for \"{activity_name}\" has been {decision}")
}

/// Review outcome notice. The comment block only appears when the reviewer
/// left one.
pub fn render_review_notice(
    activity_name: &str,
    decision: ReviewStatus,
    comment: &str,
) -> String {
    let comment_block = if comment.is_empty() {
        String::new()
    } else {
        format!("    <p>Comment: {comment}</p>\n")
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Your submission has been {decision}</h2>
    <p>Activity: {activity_name}</p>
{comment_block}    <p>Thank you for participating.</p>
</body>
</html>"#
    )
}

pub fn activity_subject(activity_name: &str) -> String {
    format!("New activity: {activity_name}")
}

pub fn render_activity_published(
    name: &str,
    description: &str,
    deadline: DateTime<Utc>,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>A new activity is available</h2>
    <p><strong>{name}</strong></p>
    <p>{description}</p>
    <p>Deadline: {}</p>
    <p>Log in to the platform to review it and send your evidence.</p>
</body>
</html>"#,
        deadline.format("%Y-%m-%d")
    )
}
