//! Free-text rewriting: attachment references and task deep links
//!
//! Both transforms are single-pass substitutions whose output never matches
//! their own input pattern, so applying them twice is a no-op.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::CoreError;

/// `![alt](<hex-id>/<filename>)`
static ATTACHMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(([0-9a-f]+)/[^)\s]+\)").expect("attachment pattern is valid")
});

/// The attachment endpoint serves every attachment under this extension
const ATTACHMENT_EXT: &str = "jpg";

/// Rewrites upstream references into vault-local syntax
#[derive(Debug, Clone)]
pub struct ContentRewriter {
    base_url: String,
    link_re: Regex,
}

impl ContentRewriter {
    /// `base_url` is the attachment endpoint, `webapp_host` the host of task
    /// deep links (`https://<host>/webapp/#p/<project>/tasks/<task>`)
    pub fn new(base_url: &str, webapp_host: &str) -> Result<Self, CoreError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !base_url.contains("://") {
            return Err(CoreError::InvalidConfig {
                message: format!("attachment base url must be absolute: {base_url:?}"),
            });
        }

        let host = webapp_host.trim();
        if host.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "webapp host must not be empty".to_string(),
            });
        }

        let pattern = format!(
            r"\[([^\]]+)\]\(https?://{}/webapp/#p/([a-zA-Z0-9]+)/tasks/([a-zA-Z0-9]+)\)",
            regex::escape(host)
        );
        let link_re = Regex::new(&pattern).map_err(|e| CoreError::InvalidConfig {
            message: format!("webapp host {host:?} does not form a valid pattern: {e}"),
        })?;

        Ok(Self {
            base_url: base_url.to_string(),
            link_re,
        })
    }

    /// Apply both transforms to a body owned by `project_id`/`task_id`
    pub fn rewrite(&self, text: &str, project_id: &str, task_id: &str) -> String {
        let text = self.rewrite_attachments(text, project_id, task_id);
        self.rewrite_links(&text)
    }

    /// Point bare attachment references at the attachment endpoint.
    ///
    /// The uploaded file name is dropped: the endpoint addresses attachments
    /// by id alone.
    pub fn rewrite_attachments(&self, text: &str, project_id: &str, task_id: &str) -> String {
        ATTACHMENT_RE
            .replace_all(text, |caps: &Captures| {
                format!(
                    "![{}]({}/{}/{}/{}.{})",
                    &caps[1], self.base_url, project_id, task_id, &caps[2], ATTACHMENT_EXT
                )
            })
            .into_owned()
    }

    /// Turn task deep links into `[[<task-id>|<text>]]`
    pub fn rewrite_links(&self, text: &str) -> String {
        self.link_re
            .replace_all(text, |caps: &Captures| format!("[[{}|{}]]", &caps[3], &caps[1]))
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> ContentRewriter {
        ContentRewriter::new("https://dida365.com/api/v1/attachment/", "dida365.com").unwrap()
    }

    #[test]
    fn test_attachment_rewrite() {
        let out = rewriter().rewrite("see ![image](a1b2c3/photo.jpg) here", "p1", "t1");
        assert_eq!(
            out,
            "see ![image](https://dida365.com/api/v1/attachment/p1/t1/a1b2c3.jpg) here"
        );
    }

    #[test]
    fn test_attachment_extension_is_always_jpg() {
        let r = rewriter();
        for name in ["photo.png", "clip.PDF", "scan", "archive.tar.gz"] {
            let out = r.rewrite_attachments(&format!("![image](ff00/{name})"), "p", "t");
            assert_eq!(out, "![image](https://dida365.com/api/v1/attachment/p/t/ff00.jpg)");
        }
    }

    #[test]
    fn test_non_matching_images_pass_through() {
        let text = "![image](https://example.com/x.png) ![alt](not-hex/x.png)";
        assert_eq!(rewriter().rewrite(text, "p", "t"), text);
    }

    #[test]
    fn test_link_rewrite() {
        let text = "blocked by [Draft outline](https://dida365.com/webapp/#p/abc123/tasks/def456)";
        assert_eq!(rewriter().rewrite_links(text), "blocked by [[def456|Draft outline]]");
    }

    #[test]
    fn test_foreign_host_links_are_kept() {
        let text = "[x](https://other.com/webapp/#p/abc/tasks/def)";
        assert_eq!(rewriter().rewrite_links(text), text);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let r = rewriter();
        let text = "![image](0a/f.jpg) and [t](https://dida365.com/webapp/#p/p9/tasks/t9)\n![](beef/x.gif)";
        let once = r.rewrite(text, "p", "t");
        let twice = r.rewrite(&once, "p", "t");
        assert_eq!(once, twice);
        assert!(once.contains("[[t9|t]]"));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        assert!(ContentRewriter::new("dida365.com/api", "dida365.com").is_err());
        assert!(ContentRewriter::new("https://dida365.com/api", " ").is_err());
    }
}
