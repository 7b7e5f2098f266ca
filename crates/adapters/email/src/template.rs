//! 邮件模板系统
//!
//! 每封邮件由同名的 `{name}.html` 与 `{name}.txt` 两个模板组成。

use shop_errors::{AppError, AppResult};
use tera::Tera;
use tracing::debug;

/// 邮件模板管理器
pub struct EmailTemplate {
    tera: Tera,
}

impl EmailTemplate {
    /// 从模板目录加载
    pub fn new(template_dir: &str) -> AppResult<Self> {
        let pattern = format!("{}/**/*.{{html,txt}}", template_dir);
        let tera = Tera::new(&pattern)
            .map_err(|e| AppError::internal(format!("Failed to load email templates: {}", e)))?;

        debug!(template_dir = %template_dir, "Email templates loaded");

        Ok(Self { tera })
    }

    /// 从内存中的模板字符串创建
    pub fn from_strings<I, K, V>(templates: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut tera = Tera::default();

        for (name, content) in templates {
            let name = name.as_ref();
            tera.add_raw_template(name, content.as_ref()).map_err(|e| {
                AppError::internal(format!("Failed to add template {}: {}", name, e))
            })?;
        }

        Ok(Self { tera })
    }

    /// 用默认模板补齐缺失的模板（已有的同名模板保留）
    pub fn with_defaults(mut self, defaults: &EmailTemplate) -> AppResult<Self> {
        self.tera
            .extend(&defaults.tera)
            .map_err(|e| AppError::internal(format!("Failed to merge email templates: {}", e)))?;
        Ok(self)
    }

    /// 模板是否存在
    pub fn contains(&self, template_name: &str) -> bool {
        self.tera.get_template_names().any(|name| name == template_name)
    }

    /// 渲染单个模板
    pub fn render(&self, template_name: &str, context: &serde_json::Value) -> AppResult<String> {
        let context = tera::Context::from_serialize(context)
            .map_err(|e| AppError::internal(format!("Failed to create template context: {}", e)))?;

        self.tera.render(template_name, &context).map_err(|e| {
            AppError::internal(format!(
                "Failed to render template {}: {}",
                template_name, e
            ))
        })
    }

    /// 渲染 HTML 与纯文本两个版本，返回 `(html, text)`
    pub fn render_pair(
        &self,
        name: &str,
        context: &serde_json::Value,
    ) -> AppResult<(String, String)> {
        let html = self.render(&format!("{}.html", name), context)?;
        let text = self.render(&format!("{}.txt", name), context)?;
        Ok((html, text))
    }
}

impl std::fmt::Debug for EmailTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.tera.get_template_names().collect();
        f.debug_struct("EmailTemplate")
            .field("templates", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_from_strings() {
        let template =
            EmailTemplate::from_strings([("test.html", "<h1>Hello {{ name }}!</h1>")]).unwrap();

        let result = template.render("test.html", &json!({ "name": "World" })).unwrap();
        assert_eq!(result, "<h1>Hello World!</h1>");
    }

    #[test]
    fn test_render_pair() {
        let template = EmailTemplate::from_strings([
            ("welcome.html", "<p>Hi {{ first_name }}</p>"),
            ("welcome.txt", "Hi {{ first_name }}"),
        ])
        .unwrap();

        let (html, text) = template
            .render_pair("welcome", &json!({ "first_name": "Ada" }))
            .unwrap();
        assert_eq!(html, "<p>Hi Ada</p>");
        assert_eq!(text, "Hi Ada");
        assert!(template.contains("welcome.txt"));
    }

    #[test]
    fn test_custom_templates_override_defaults() {
        let defaults = EmailTemplate::from_strings([
            ("greet.html", "default html"),
            ("greet.txt", "default text"),
        ])
        .unwrap();
        let custom = EmailTemplate::from_strings([("greet.html", "custom html")])
            .unwrap()
            .with_defaults(&defaults)
            .unwrap();

        let (html, text) = custom.render_pair("greet", &json!({})).unwrap();
        assert_eq!(html, "custom html");
        assert_eq!(text, "default text");
    }

    #[test]
    fn test_missing_template_is_error() {
        let template = EmailTemplate::from_strings([("a.html", "a")]).unwrap();
        assert!(template.render_pair("a", &json!({})).is_err());
    }
}
