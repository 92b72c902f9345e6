use axum::response::Html;

use crate::{include_res, res, theme::Theme, toast::Toast};

/// The shared page shell: stylesheet, theme toggle and toast slot.
pub struct Page<'a> {
    pub title: &'a str,
    /// Where the theme toggle returns to.
    pub path: &'a str,
    pub theme: Theme,
    pub toast: Option<Toast>,
    pub head: &'a str,
}

impl<'a> Page<'a> {
    pub fn new(title: &'a str, path: &'a str, theme: Theme) -> Self {
        Self { title, path, theme, toast: None, head: "" }
    }

    pub fn with_toast(mut self, toast: Option<Toast>) -> Self {
        self.toast = toast;
        self
    }

    pub fn with_head(mut self, head: &'a str) -> Self {
        self.head = head;
        self
    }

    pub fn render(self, body: &str) -> Html<String> {
        Html(
            include_res!(str, "/pages/layout.html")
                .replace("{title}", &res::escape(self.title))
                .replace("{head}", self.head)
                .replace("{theme}", self.theme.class())
                .replace("{theme_icon}", self.theme.icon())
                .replace("{return_url}", &res::escape(self.path))
                .replace("{toast}", &self.toast.map(|toast| toast.to_html()).unwrap_or_default())
                .replace("{body}", body),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_applies_theme() {
        let Html(html) = Page::new("Dashboard", "/dashboard", Theme { dark: true }).render("<p>hi</p>");

        assert!(html.contains("class=\"dark\""));
        assert!(html.contains("🌙"));
        assert!(html.contains("<p>hi</p>"));
        assert!(html.contains("value=\"/dashboard\""));
    }

    #[test]
    fn test_render_includes_toast_once() {
        let Html(html) = Page::new("Dashboard", "/dashboard", Theme::default())
            .with_toast(Some(Toast::info("Chatroom deleted.")))
            .render("");

        assert_eq!(html.matches("Chatroom deleted.").count(), 1);
    }
}
