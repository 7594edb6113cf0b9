//! Templates command handler

use super::{load_app_config, print_json};
use crate::commands::{TemplatesAction, TemplatesArgs};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::OutputFormat;
use quizvid::{Template, TemplateRegistry};

/// Execute the templates command
pub fn execute_templates(config: &CliConfig, args: &TemplatesArgs) -> CliResult<()> {
    let app = load_app_config(config)?;
    let registry = TemplateRegistry::load(app.templates_dir.as_deref())?;

    match &args.action {
        TemplatesAction::List => match args.format {
            OutputFormat::Json => print_json(&registry.iter().collect::<Vec<_>>()),
            OutputFormat::Text => {
                print!("{}", render_template_list(&registry, app.template_name()));
                Ok(())
            }
        },
        TemplatesAction::Show { name } => {
            let template = registry.get(name)?;
            match args.format {
                OutputFormat::Json => print_json(template),
                OutputFormat::Text => {
                    print!("{}", render_template(template));
                    Ok(())
                }
            }
        }
    }
}

/// Name column plus description; the configured template is starred
#[must_use]
pub fn render_template_list(registry: &TemplateRegistry, current: &str) -> String {
    let width = registry.names().iter().map(|n| n.len()).max().unwrap_or(0);
    let mut out = String::new();
    for template in registry.iter() {
        let marker = if template.name == current { '*' } else { ' ' };
        out.push_str(&format!(
            "{marker} {:<width$}  {}\n",
            template.name, template.description
        ));
    }
    out
}

/// Every field of one template
#[must_use]
pub fn render_template(template: &Template) -> String {
    format!(
        "Template: {}\n\
         Description: {}\n\
         Background: {}\n\
         Text: {}\n\
         Accent: {}\n\
         Correct answer: {}\n\
         Font: {} {}pt\n",
        template.name,
        template.description,
        template.background_color,
        template.text_color,
        template.accent_color,
        template.correct_color,
        template.font_family,
        template.font_size
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use quizvid::DEFAULT_TEMPLATE;

    #[test]
    fn test_list_marks_current() {
        let registry = TemplateRegistry::with_builtins();
        let text = render_template_list(&registry, DEFAULT_TEMPLATE);
        assert_eq!(text.lines().count(), registry.len());
        let current: Vec<&str> = text.lines().filter(|l| l.starts_with('*')).collect();
        assert_eq!(current.len(), 1);
        assert!(current[0].contains(DEFAULT_TEMPLATE));
    }

    #[test]
    fn test_render_template() {
        let registry = TemplateRegistry::with_builtins();
        let text = render_template(registry.get(DEFAULT_TEMPLATE).unwrap());
        assert!(text.starts_with("Template: default\n"));
        assert!(text.contains("Background: #1a1a1a"));
        assert!(text.contains("Font: Arial 24pt"));
    }
}
