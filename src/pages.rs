// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Server-rendered HTML pages.
//!
//! Templates are compiled into the binary. Placeholders look like
//! `{{name}}`; every substituted value is HTML-escaped.

use html_escape::{encode_double_quoted_attribute, encode_text};

const SIGNIN_TEMPLATE: &str = include_str!("../templates/signin.html");
const DASH_TEMPLATE: &str = include_str!("../templates/dash.html");
const SUCCESS_TEMPLATE: &str = include_str!("../templates/success.html");

const SIGN_IN_LINK: &str = r#"<p><a href="/auth/github">Sign in with GitHub</a></p>"#;

/// Landing page. Signed-in users get a link to the dashboard instead.
pub fn signin(username: Option<&str>) -> String {
    let link = match username {
        Some(name) => format!(
            r#"<p>Signed in as {}. <a href="/dash">Go to dashboard</a></p>"#,
            encode_text(name)
        ),
        None => SIGN_IN_LINK.to_string(),
    };
    SIGNIN_TEMPLATE.replace("{{session_link}}", &link)
}

/// Upload form for a signed-in user.
pub fn dashboard(username: &str) -> String {
    DASH_TEMPLATE.replace("{{username}}", &encode_text(username))
}

/// Confirmation after a repository was provisioned.
pub fn success(repo_name: &str, repo_url: &str) -> String {
    SUCCESS_TEMPLATE
        .replace("{{repo_name}}", &encode_text(repo_name))
        .replace("{{repo_href}}", &encode_double_quoted_attribute(repo_url))
        .replace("{{repo_url}}", &encode_text(repo_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signin_offers_login_when_anonymous() {
        let page = signin(None);
        assert!(page.contains(r#"href="/auth/github""#));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn signin_links_dashboard_when_signed_in() {
        let page = signin(Some("octocat"));
        assert!(page.contains("Signed in as octocat"));
        assert!(page.contains(r#"href="/dash""#));
    }

    #[test]
    fn dashboard_has_upload_form_fields() {
        let page = dashboard("octocat");
        assert!(page.contains("Hello, octocat"));
        for field in ["repo_name", "repo_description", "repo_file"] {
            assert!(page.contains(&format!(r#"name="{field}""#)), "missing {field}");
        }
        assert!(page.contains(r#"action="/create-repo""#));
    }

    #[test]
    fn usernames_are_escaped_as_text() {
        assert!(dashboard("<b>o&c</b>").contains("Hello, &lt;b&gt;o&amp;c&lt;/b&gt;"));
        assert!(signin(Some("<i>")).contains("Signed in as &lt;i&gt;."));
    }

    #[test]
    fn success_link_cannot_break_out_of_href() {
        let page = success("demo", r#"https://github.com/o/d" onclick="x"#);
        assert!(page.contains(r#"href="https://github.com/o/d&quot; onclick=&quot;x""#));
        assert!(!page.contains(r#"href="https://github.com/o/d" "#));
    }

    #[test]
    fn success_page_substitutes_and_escapes() {
        let page = success("demo<script>", "https://github.com/octocat/demo");
        assert!(page.contains("demo&lt;script&gt;"));
        assert!(page.contains(r#"href="https://github.com/octocat/demo""#));
        assert!(!page.contains("{{"));
    }
}
