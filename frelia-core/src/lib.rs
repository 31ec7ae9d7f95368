pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod loader;
pub mod page;
pub mod renderer;
pub mod template;
pub mod transform;
pub mod transforms;
pub mod writer;

// Re-export main types
pub use builder::{BuildError, Site, SiteBuilder, build_site};
pub use document::{Document, DocumentError, Metadata};
pub use error::PipelineError;
pub use loader::PageLoader;
pub use page::{Page, RenderedPage};
pub use renderer::{BodyRenderer, DocumentRenderer, PageRenderer};
pub use template::{TemplateError, TemplateRenderer};
pub use transform::{LiftPage, Stream, Transform, TransformGroup, stream};
pub use transforms::{
    RebasePagePath, RenderInlineTemplate, RenderTemplate, SetDateFromPath, render_markdown,
    strip_extension,
};
pub use writer::PageWriter;
