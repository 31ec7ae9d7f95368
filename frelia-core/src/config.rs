use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::page::Page;
use crate::template::{TemplateError, TemplateRenderer};
use crate::transform::{LiftPage, Transform, TransformGroup};
use crate::transforms::{
    DEFAULT_TEMPLATE, RebasePagePath, RenderInlineTemplate, RenderTemplate, SetDateFromPath,
    render_markdown, strip_extension,
};

/// Pipeline settings, usually the top level of `frelia.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Template for documents without a `template` field.
    pub default_template: String,
    /// Escape HTML in template variables. Bodies are trusted markup, so off by default.
    pub autoescape: bool,
    /// Transforms in the order they run. Empty means [`default_pipeline`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<TransformSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_template: DEFAULT_TEMPLATE.to_string(),
            autoescape: false,
            transforms: Vec::new(),
        }
    }
}

impl Config {
    /// Configured transforms, or the default pipeline if none are.
    pub fn transform_specs(&self) -> Vec<TransformSpec> {
        if self.transforms.is_empty() {
            default_pipeline()
        } else {
            self.transforms.clone()
        }
    }

    pub fn pipeline(&self, renderer: &Arc<TemplateRenderer>) -> Result<TransformGroup<Page>, TemplateError> {
        let transforms = self
            .transform_specs()
            .iter()
            .map(|spec| spec.build(self, renderer))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TransformGroup::new(transforms))
    }
}

/// One `[[transforms]]` entry, selected by its `kind`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformSpec {
    SetDateFromPath {
        #[serde(default = "default_date_key")]
        key: String,
    },
    RenderTemplate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_template: Option<String>,
    },
    RenderInlineTemplate {
        source: String,
    },
    RenderMarkdown,
    RebasePagePath {
        prefix: String,
    },
    StripExtension,
}

fn default_date_key() -> String {
    "published".to_string()
}

/// Date from path, then the page template, then extensionless paths.
pub fn default_pipeline() -> Vec<TransformSpec> {
    vec![
        TransformSpec::SetDateFromPath {
            key: default_date_key(),
        },
        TransformSpec::RenderTemplate {
            default_template: None,
        },
        TransformSpec::StripExtension,
    ]
}

impl TransformSpec {
    pub fn build(
        &self,
        config: &Config,
        renderer: &Arc<TemplateRenderer>,
    ) -> Result<Box<dyn Transform<Page>>, TemplateError> {
        let transform: Box<dyn Transform<Page>> = match self {
            TransformSpec::SetDateFromPath { key } => Box::new(SetDateFromPath::new(key.as_str())),
            TransformSpec::RenderTemplate { default_template } => {
                let name = default_template.as_deref().unwrap_or(config.default_template.as_str());
                let render = RenderTemplate::new(Arc::clone(renderer)).with_default_template(name);
                Box::new(LiftPage::new(render))
            }
            TransformSpec::RenderInlineTemplate { source } => {
                Box::new(LiftPage::new(RenderInlineTemplate::new(renderer, source)?))
            }
            TransformSpec::RenderMarkdown => Box::new(LiftPage::new(render_markdown)),
            TransformSpec::RebasePagePath { prefix } => Box::new(RebasePagePath::new(prefix.as_str())),
            TransformSpec::StripExtension => Box::new(strip_extension),
        };
        Ok(transform)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.transform_specs(), default_pipeline());
    }

    #[test]
    fn test_parse_transforms() {
        let config: Config = toml::from_str(
            r#"
            default_template = "page.html"

            [[transforms]]
            kind = "rebase_page_path"
            prefix = "content"

            [[transforms]]
            kind = "set_date_from_path"

            [[transforms]]
            kind = "render_markdown"

            [[transforms]]
            kind = "render_template"
            default_template = "post.html"

            [[transforms]]
            kind = "render_inline_template"
            source = "{{ content }}"

            [[transforms]]
            kind = "strip_extension"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_template, "page.html");
        assert_eq!(
            config.transforms,
            [
                TransformSpec::RebasePagePath {
                    prefix: "content".into()
                },
                TransformSpec::SetDateFromPath {
                    key: "published".into()
                },
                TransformSpec::RenderMarkdown,
                TransformSpec::RenderTemplate {
                    default_template: Some("post.html".into())
                },
                TransformSpec::RenderInlineTemplate {
                    source: "{{ content }}".into()
                },
                TransformSpec::StripExtension,
            ]
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[[transforms]]\nkind = \"minify\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_pipeline_builds_every_transform() {
        let renderer = Arc::new(TemplateRenderer::from_tera(tera::Tera::default()));
        let config = Config {
            transforms: vec![
                TransformSpec::RenderMarkdown,
                TransformSpec::RenderInlineTemplate {
                    source: "{{ content }}".into(),
                },
            ],
            ..Config::default()
        };
        assert_eq!(config.pipeline(&renderer).unwrap().len(), 2);
        assert_eq!(Config::default().pipeline(&renderer).unwrap().len(), 3);
    }

    #[test]
    fn test_pipeline_reports_bad_inline_template() {
        let renderer = Arc::new(TemplateRenderer::from_tera(tera::Tera::default()));
        let config = Config {
            transforms: vec![TransformSpec::RenderInlineTemplate {
                source: "{% endif %}".into(),
            }],
            ..Config::default()
        };
        assert!(config.pipeline(&renderer).is_err());
    }
}
